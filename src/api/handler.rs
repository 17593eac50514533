//! API handler for courseql
//!
//! Turns JSON request lines into responses. Every request produces exactly
//! one response, errors included.

use crate::storage::{DatasetKind, RecordStore};

use super::errors::ApiResult;
use super::facade::QueryFacade;
use super::request::{decode_content, Request};
use super::response::Response;

/// Request dispatcher over a query facade
pub struct ApiHandler<S: RecordStore> {
    facade: QueryFacade<S>,
}

impl<S: RecordStore> ApiHandler<S> {
    /// Create a new API handler
    pub fn new(facade: QueryFacade<S>) -> Self {
        Self { facade }
    }

    /// Returns the wrapped facade
    pub fn facade(&self) -> &QueryFacade<S> {
        &self.facade
    }

    /// Returns the wrapped facade mutably
    pub fn facade_mut(&mut self) -> &mut QueryFacade<S> {
        &mut self.facade
    }

    /// Handle a raw JSON request string
    pub fn handle(&mut self, json_request: &str) -> Response {
        match Request::parse(json_request) {
            Ok(request) => self.dispatch(request),
            Err(e) => Response::error(&e),
        }
    }

    /// Handle a parsed request
    pub fn dispatch(&mut self, request: Request) -> Response {
        let result = match request {
            Request::Query { query } => self
                .facade
                .perform_query(&query)
                .map(|records| Response::result(&records)),
            Request::Explain { query } => Ok(Response::result(&self.facade.explain_query(&query))),
            Request::Add { id, kind, content } => self.handle_add(&id, &kind, &content),
            Request::Remove { id } => self
                .facade
                .remove_dataset(&id)
                .map(|()| Response::no_content()),
            Request::List => self
                .facade
                .list_datasets()
                .map(|infos| Response::result(&infos)),
        };

        match result {
            Ok(response) => response,
            Err(e) => Response::error(&e),
        }
    }

    fn handle_add(&mut self, id: &str, kind: &str, content: &str) -> ApiResult<Response> {
        let kind = DatasetKind::parse(kind)?;
        let archive = decode_content(content)?;
        self.facade.add_dataset(id, &archive, kind)?;
        Ok(Response::no_content())
    }
}
