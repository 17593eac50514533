//! Observability events for courseql
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events in courseql
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Query operations
    /// Query text received
    QueryReceived,
    /// Query passed grammar validation
    QueryParsed,
    /// Query executed, results produced
    QueryExecuted,
    /// Query rejected (grammar, missing dataset, or execution)
    QueryRejected,

    // Dataset operations
    /// Records loaded from the store
    DatasetLoaded,
    /// Dataset removed from the store
    DatasetRemoved,
    /// Archive row skipped during import
    ImportRowSkipped,
    /// Dataset manifest could not be read; dataset left out of listings
    DatasetUnreadable,

    // Server operations
    /// Request loop ready
    Serving,
}

impl Event {
    /// Returns the event name as written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::QueryReceived => "QUERY_BEGIN",
            Event::QueryParsed => "QUERY_PARSED",
            Event::QueryExecuted => "QUERY_COMPLETE",
            Event::QueryRejected => "QUERY_REJECTED",

            Event::DatasetLoaded => "DATASET_LOADED",
            Event::DatasetRemoved => "DATASET_REMOVED",
            Event::ImportRowSkipped => "IMPORT_ROW_SKIPPED",
            Event::DatasetUnreadable => "DATASET_UNREADABLE",

            Event::Serving => "COURSEQL_SERVING",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryParsed | Event::DatasetLoaded => Severity::Trace,
            Event::QueryRejected | Event::ImportRowSkipped | Event::DatasetUnreadable => {
                Severity::Warn
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
