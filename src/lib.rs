//! courseql - A strict, deterministic query engine for course datasets
//!
//! Answers English-sentence-shaped queries against named record sets:
//! parse, filter, sort, project.

pub mod api;
pub mod cli;
pub mod executor;
pub mod observability;
pub mod parser;
pub mod schema;
pub mod storage;
