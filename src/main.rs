#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::similar_names)]

use std::process::ExitCode;

use crate::cli::evaluate_cli;

pub mod brightness;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

fn main() -> ExitCode {
    // Parse the arguments, run the command, report errors and exit 1 on failure
    evaluate_cli()
}
