use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacklightError {
    #[error("{0}")]
    Usage(String),

    #[error("error reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("error opening brightness file {}: {source}", .path.display())]
    Open { path: PathBuf, source: std::io::Error },

    #[error("error writing brightness value to {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("error parsing brightness value {value:?} from {}: {source}", .path.display())]
    ParseDevice {
        path: PathBuf,
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("error parsing brightness value ({value:?}): {source}")]
    ParseValue {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("device file {} reports a negative brightness ({value})", .path.display())]
    NegativeReading { path: PathBuf, value: i64 },

    #[error("could not read config {}: {source}", .path.display())]
    ConfigRead { path: PathBuf, source: std::io::Error },

    #[error("could not parse config {}: {}", .path.display(), .source.message())]
    ConfigParse { path: PathBuf, source: toml::de::Error },

    #[error("could not open log file {}: {source}", .path.display())]
    LogFile { path: PathBuf, source: std::io::Error },
}

impl BacklightError {
    /// Usage errors are reported together with the full usage text
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
