//! Binary entry point: parse arguments, run one search, exit with a code the
//! caller can branch on.
use std::process::ExitCode;

use idiomas_search::cli;

fn main() -> ExitCode {
    ExitCode::from(cli::exit_status(std::env::args_os()))
}
