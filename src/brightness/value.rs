use std::{
    fmt,
    path::{Path, PathBuf},
};

use clap::ValueEnum;

use crate::error::BacklightError;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// Keyboard backlight
    Kbd,
    /// Screen backlight
    Screen,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Kbd => "kbd",
            Self::Screen => "screen",
        })
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Print the current brightness
    Get,
    /// Print the maximum brightness
    Max,
    /// Set the brightness to an absolute value
    Set,
    /// Raise the brightness by one step
    Up,
    /// Lower the brightness by one step
    Down,
}

/// A single device file, trimmed and parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub path: PathBuf,
    pub raw: String,
    pub value: i64,
}

impl Reading {
    /// # Errors
    /// Returns an error if the trimmed contents are not a base-10 integer
    pub fn parse(path: &Path, contents: &str) -> Result<Self, BacklightError> {
        let raw = contents.trim();

        let value = raw.parse::<i64>().map_err(|source| BacklightError::ParseDevice {
            path: path.to_path_buf(),
            value: raw.to_string(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            raw: raw.to_string(),
            value,
        })
    }

    /// # Errors
    /// Returns an error if the device reported a negative value
    pub fn non_negative(&self) -> Result<i64, BacklightError> {
        if self.value < 0 {
            return Err(BacklightError::NegativeReading {
                path: self.path.clone(),
                value: self.value,
            });
        }

        Ok(self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to be printed on stdout
    Print(String),
    /// The value written to the current-value file
    Written(i64),
}

#[must_use]
pub fn step_up(current: i64, step: u32, max: i64) -> i64 {
    let raised = current.saturating_add(i64::from(step));

    if raised > max { max } else { raised }
}

#[must_use]
pub fn step_down(current: i64, step: u32) -> i64 {
    let lowered = current.saturating_sub(i64::from(step));

    if lowered < 0 { 0 } else { lowered }
}

/// Clamps into `[0, max]`, `max` must not be negative
#[must_use]
pub fn clamp_to_range(value: i64, max: i64) -> i64 {
    value.clamp(0, max)
}
