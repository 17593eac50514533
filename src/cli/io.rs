//! Line-oriented I/O for the CLI
//!
//! - Input: one JSON request per stdin line (serve)
//! - Output: one JSON response per stdout line
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use crate::api::Response;

use super::errors::{CliError, CliResult};

/// Iterates over non-blank stdin lines
pub fn read_requests() -> impl Iterator<Item = CliResult<String>> {
    io::stdin()
        .lock()
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
}

/// Write a response envelope to stdout
pub fn write_response(response: &Response) -> CliResult<()> {
    write_line(&mut io::stdout(), &response.to_json())
}

/// Write a single line and flush
pub fn write_line<W: Write>(out: &mut W, line: &str) -> CliResult<()> {
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}
