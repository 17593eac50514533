//! CLI command implementations
//!
//! Every command follows the same sequence:
//!
//! 1. Configuration load and validation
//! 2. Logger threshold set from `log_level`
//! 3. Dataset store opened under `data_dir`
//! 4. One response line written to stdout (one per request for `serve`)
//!
//! Request failures are reported inside the response envelope. Only
//! configuration, store and I/O failures surface as `CliError`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, ApiHandler, QueryFacade, Response};
use crate::observability::{log_event, log_event_with_fields, Event, Logger, Severity};
use crate::storage::{DatasetKind, DiskStore};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_line, write_response};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (required)
    pub data_dir: PathBuf,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if Severity::from_level(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected one of trace, info, warn, error, fatal.",
                self.log_level
            )));
        }

        Ok(())
    }

    /// Threshold for the process-wide logger
    pub fn severity(&self) -> Severity {
        Severity::from_level(&self.log_level).unwrap_or(Severity::Info)
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args())
}

/// Run the command named by the CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = Config::load(&cli.config)?;
    Logger::set_min_severity(config.severity());

    let data_dir = config.data_dir.display().to_string();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_dir", data_dir.as_str()),
            ("log_level", config.log_level.as_str()),
        ],
    );

    let mut handler = open_handler(&config)?;

    match cli.command {
        Command::Serve => serve(&mut handler),
        command => write_response(&execute(&mut handler, command)?),
    }
}

/// Opens the disk store named by the config and wraps it in a handler
pub fn open_handler(config: &Config) -> CliResult<ApiHandler<DiskStore>> {
    let store = DiskStore::open(&config.data_dir)?;
    Ok(ApiHandler::new(QueryFacade::new(store)))
}

/// Runs a one-shot command, returning its response
///
/// `serve` is not one-shot and yields an error here.
pub fn execute(handler: &mut ApiHandler<DiskStore>, command: Command) -> CliResult<Response> {
    let response = match command {
        Command::Query { text } => query(handler, &text),
        Command::Explain { text } => explain(handler, &text),
        Command::Add { id, archive, kind } => add(handler, &id, &archive, &kind)?,
        Command::Remove { id } => remove(handler, &id),
        Command::List => list(handler),
        Command::Serve => {
            return Err(CliError::io_error("serve is not a one-shot command"));
        }
    };
    Ok(response)
}

/// Execute a single query
pub fn query(handler: &ApiHandler<DiskStore>, text: &str) -> Response {
    let result = handler.facade().perform_query(text);
    match result {
        Ok(records) => Response::result(&records),
        Err(e) => Response::error(&e),
    }
}

/// Explain a single query
pub fn explain(handler: &ApiHandler<DiskStore>, text: &str) -> Response {
    Response::result(&handler.facade().explain_query(text))
}

/// Import an archive file as a dataset
pub fn add(
    handler: &mut ApiHandler<DiskStore>,
    id: &str,
    archive: &Path,
    kind: &str,
) -> CliResult<Response> {
    let bytes = fs::read(archive).map_err(|e| {
        CliError::io_error(format!("Failed to read archive {:?}: {}", archive, e))
    })?;

    let result = DatasetKind::parse(kind)
        .map_err(ApiError::from)
        .and_then(|kind| handler.facade_mut().add_dataset(id, &bytes, kind));

    Ok(match result {
        Ok(_) => Response::no_content(),
        Err(e) => Response::error(&e),
    })
}

/// Remove a stored dataset
pub fn remove(handler: &mut ApiHandler<DiskStore>, id: &str) -> Response {
    match handler.facade_mut().remove_dataset(id) {
        Ok(()) => Response::no_content(),
        Err(e) => Response::error(&e),
    }
}

/// List stored datasets
pub fn list(handler: &ApiHandler<DiskStore>) -> Response {
    match handler.facade().list_datasets() {
        Ok(infos) => Response::result(&infos),
        Err(e) => Response::error(&e),
    }
}

/// Enter the serving loop on stdin/stdout
pub fn serve(handler: &mut ApiHandler<DiskStore>) -> CliResult<()> {
    log_event(Event::Serving);
    serve_requests(handler, read_requests(), &mut std::io::stdout())
}

/// Answers each request line with one response line
pub fn serve_requests<I, W>(
    handler: &mut ApiHandler<DiskStore>,
    requests: I,
    out: &mut W,
) -> CliResult<()>
where
    I: IntoIterator<Item = CliResult<String>>,
    W: Write,
{
    for request in requests {
        let request = request?;
        let response = handler.handle(&request);
        write_line(out, &response.to_json())?;
    }
    Ok(())
}
