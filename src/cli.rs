use std::{ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser};
use tracing::{debug, instrument};

use crate::{
    brightness::{self, Operation, Outcome, Subsystem, SysfsBacklight},
    config::Config,
    error::BacklightError,
    logging::init_logging,
};

#[derive(Parser, Debug)]
#[command(name = "mbbacklight", version, about = "Get or change keyboard and screen backlight brightness", long_about = None)]
pub struct Cli {
    /// Step value for up/down (0 uses the configured default)
    #[arg(long, value_name = "INT")]
    pub step: Option<u32>,

    /// Read configuration from this file instead of the default locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[arg(value_enum)]
    pub system: Subsystem,

    #[arg(value_enum)]
    pub operation: Operation,

    /// Brightness for `set`
    #[arg(allow_negative_numbers = true)]
    pub value: Option<String>,
}

/// # Errors
/// Returns a usage error if the arguments don't describe a command
pub fn parse_cli<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Parses the process arguments, runs the command and reports any error on stderr
#[must_use]
pub fn evaluate_cli() -> ExitCode {
    ExitCode::from(evaluate_args(std::env::args_os()))
}

/// Exit status of one invocation: 0 on success, 1 on any error
pub fn evaluate_args<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_cli(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            return match e.print() {
                Ok(()) => 0,
                Err(_print_error) => 1,
            };
        }
        Err(e) => {
            eprint!("{}", render_report(&usage_error(&e)));
            return 1;
        }
    };

    match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprint!("{}", render_report(&e));
            1
        }
    }
}

/// # Errors
/// Returns an error if the configuration can't be loaded, or the brightness command fails
#[instrument]
pub fn run(cli: &Cli) -> Result<(), BacklightError> {
    let config = Config::load(cli.config.as_deref())?;
    init_logging(&config)?;

    let device = config.device(cli.system);
    let step = device.step_or_default(cli.step);
    let source = SysfsBacklight::from_config(device);

    debug!("{} {:?} with step {step}", cli.system, cli.operation);

    if let Outcome::Print(value) = brightness::execute(&source, cli.operation, cli.value.as_deref(), step)? {
        println!("{value}");
    }

    Ok(())
}

fn usage_error(e: &clap::Error) -> BacklightError {
    // Everything before the usage block or the help hint, on one line
    let rendered = e.to_string();
    let reason = rendered
        .lines()
        .take_while(|line| !line.starts_with("Usage:") && !line.starts_with("For more information"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let reason = reason.trim_start_matches("error: ");

    BacklightError::Usage(if reason.is_empty() {
        String::from("invalid arguments")
    } else {
        reason.to_string()
    })
}

/// The diagnostic line, followed by the full usage text for usage errors
#[must_use]
pub fn render_report(e: &BacklightError) -> String {
    if e.is_usage() {
        format!("{e}\n\n{}\n", Cli::command().render_help())
    } else {
        format!("{e}\n")
    }
}
