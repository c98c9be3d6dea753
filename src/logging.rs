use std::{
    fs::OpenOptions,
    io::IsTerminal,
    sync::Mutex,
};

use time::macros::format_description;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt::time::LocalTime, fmt::writer::BoxMakeWriter};

use crate::{config::Config, error::BacklightError};

/// # Errors
/// Returns an error if the configured log file can't be opened or created
pub fn init_logging(config: &Config) -> Result<(), BacklightError> {
    // Set panic hook
    std::panic::set_hook(Box::new(|info| {
        error!("Panic: {info}");
    }));

    // Filter the logs to the specified level (warnings only by default, so stderr stays quiet)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let ansi = use_ansi(config, std::io::stderr().is_terminal());

    // Logs go to the configured file, or to stderr
    let writer = match &config.log_file {
        Some(path) => {
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| BacklightError::LogFile {
                    path: path.clone(),
                    source,
                })?;

            BoxMakeWriter::new(Mutex::new(log_file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_env_filter(filter)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        // Custom Time format
        .with_timer(LocalTime::new(format_description!(
            "[day]-[month repr:short]-[year] [hour]:[minute]:[second].[subsecond digits:9] [offset_hour]:[offset_minute]"
        )))
        .init();

    Ok(())
}

// Colours only when logging straight to a terminal
const fn use_ansi(config: &Config, stderr_is_terminal: bool) -> bool {
    config.log_file.is_none() && stderr_is_terminal
}
