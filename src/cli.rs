//! Command-line surface: argument parsing, wiring config → connection →
//! repository → service, and mapping outcomes to exit codes.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::db::ConnectionProvider;
use crate::error::Error;
use crate::logging::init_tracing;
use crate::repository::{validate_term, ResourceRepository};
use crate::service::SearchService;

pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for bad arguments, invalid terms and configuration problems.
pub const EXIT_USAGE: u8 = 1;
/// Exit code for anything outside the known error kinds.
pub const EXIT_UNEXPECTED: u8 = 3;

const AFTER_HELP: &str = "\
Requirements:
  The search term must have at least SEARCH_MIN_LENGTH characters (default 3).

Configuration (environment or .env file):
  DB_CONNECTION  sqlite | mysql (default sqlite)
  DB_NAME        database name, or SQLite file path / :memory:
  DB_HOST DB_PORT DB_USER DB_PASS DB_CHARSET DB_COLLATION
  SEARCH_MIN_LENGTH

Exit codes:
  0  success (including no results)   1  argument or validation error
  2  database error                   3  unexpected error

Examples:
  idiomas-search search english
  idiomas-search --help";

#[derive(Debug, Parser)]
#[command(
    name = "idiomas-search",
    version,
    about = "Search language classes and exams by name",
    arg_required_else_help = true,
    after_help = AFTER_HELP
)]
pub struct Cli {
    /// Key-value env file to load instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find classes and exams whose name contains TERM
    Search {
        /// Part of the resource name
        #[arg(allow_hyphen_values = true)]
        term: String,
    },
}

/// Run the CLI and report anything outside the known error kinds as
/// `EXIT_UNEXPECTED`. Returns the process exit code.
pub fn exit_status<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("unexpected error: {err:#}");
            EXIT_UNEXPECTED
        }
    }
}

/// Parse `args` and run the requested command. Known failures are reported
/// here and turned into exit codes; the `Err` path is for anything else.
/// Logging is initialized once per process, so a second call fails.
pub fn run<I, T>(args: I) -> Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => return Ok(report_usage(&err)),
    };

    init_tracing(cli.verbose).context("failed to initialize logging")?;

    match cli.command {
        Command::Search { term } => search(&term, cli.env_file.as_deref()),
    }
}

/// Help and version requests succeed; every other parse failure is a usage
/// error. Usage shown for a bare invocation goes to stdout like `--help`.
fn report_usage(err: &clap::Error) -> u8 {
    // Nothing sensible is left to do if the terminal is gone.
    match err.kind() {
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = write!(io::stdout().lock(), "{}", err.render());
            EXIT_SUCCESS
        }
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = err.print();
            EXIT_USAGE
        }
    }
}

fn search(term: &str, env_file: Option<&Path>) -> Result<u8> {
    let term = term.trim();

    let lines = match find_lines(term, env_file) {
        Ok(lines) => lines,
        Err(err) => {
            eprintln!("{}: {err}", error_label(&err));
            return Ok(err.exit_code());
        }
    };

    let mut stdout = io::stdout().lock();
    if lines.is_empty() {
        writeln!(stdout, "No results found for '{term}'").context("failed to write results")?;
    } else {
        for line in &lines {
            writeln!(stdout, "{line}").context("failed to write results")?;
        }
    }
    stdout.flush().context("failed to flush results")?;

    Ok(EXIT_SUCCESS)
}

/// Validate the term before any connection is opened, then run the search.
fn find_lines(term: &str, env_file: Option<&Path>) -> crate::Result<Vec<String>> {
    let config = Config::load(env_file)?;
    validate_term(term, config.min_search_length)?;

    let provider = ConnectionProvider::new(config.database);
    let repository = ResourceRepository::new(provider.handle()?, config.min_search_length);
    let lines = SearchService::new(repository).search_and_display(term)?;

    debug!(term, matches = lines.len(), "search complete");
    Ok(lines)
}

fn error_label(err: &Error) -> &'static str {
    match err {
        Error::Validation(_) => "error",
        Error::Configuration(_) => "configuration error",
        Error::Storage { .. } => "database error",
    }
}
