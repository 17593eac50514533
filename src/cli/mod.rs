//! CLI module for courseql
//!
//! Provides command-line interface for:
//! - query: One-shot query execution
//! - explain: One-shot explain
//! - add / remove / list: Dataset management
//! - serve: JSON request loop over stdin/stdout

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    add, execute, explain, list, open_handler, query, remove, run, run_command, serve,
    serve_requests, Config,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_line, write_response};
