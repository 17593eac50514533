//! API layer for courseql
//!
//! The facade runs queries and dataset operations; the handler wraps it in
//! the JSON request/response envelope.
//!
//! # Supported Operations
//!
//! - query
//! - explain
//! - add
//! - remove
//! - list

mod errors;
mod facade;
mod handler;
mod request;
mod response;

pub use errors::{ApiError, ApiErrorCode, ApiResult, Severity};
pub use facade::QueryFacade;
pub use handler::ApiHandler;
pub use request::{decode_content, encode_content, Request};
pub use response::Response;
