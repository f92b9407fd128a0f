//! CLI module for chemspider
//!
//! Thin command-line front end over [`crate::ChemSpider`]. Every command
//! prints one JSON object on stdout.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{connect, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_file, write_response};
