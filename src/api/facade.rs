//! Query facade for courseql
//!
//! Orchestrates the pipeline for one request:
//!
//! ```text
//! parse -> load records -> filter -> sort -> project
//! ```
//!
//! Any stage failing aborts the request with a single error kind. Dataset
//! management passes through to the store.

use crate::executor::QueryExecutor;
use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::parser::{ExplainQuery, QueryParser};
use crate::schema::Record;
use crate::storage::{DatasetInfo, DatasetKind, RecordStore};

use super::errors::{ApiError, ApiResult};

/// Entry point for queries and dataset management
pub struct QueryFacade<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> QueryFacade<S> {
    /// Create a facade over a record store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parses and runs a query, returning the projected records.
    pub fn perform_query(&self, text: &str) -> ApiResult<Vec<Record>> {
        let length = text.len().to_string();
        log_event_with_fields(Event::QueryReceived, &[("length", length.as_str())]);

        let query = QueryParser::parse(text).map_err(|err| {
            log_event_with_fields(
                Event::QueryRejected,
                &[
                    ("clause", err.clause().as_str()),
                    ("code", err.code().code()),
                    ("reason", err.message()),
                ],
            );
            ApiError::from_parse_error(err)
        })?;

        log_event_with_fields(Event::QueryParsed, &[("dataset", query.dataset_id())]);

        let records = self
            .store
            .load_records(query.dataset_id())
            .map_err(|err| self.reject(query.dataset_id(), err.into()))?;

        let rows = records.len().to_string();
        log_event_with_fields(
            Event::DatasetLoaded,
            &[("dataset", query.dataset_id()), ("rows", rows.as_str())],
        );

        let result = QueryExecutor::new(&records)
            .execute(&query)
            .map_err(|err| self.reject(query.dataset_id(), err.into()))?;

        let returned = result.returned_count.to_string();
        let scanned = result.scanned_count.to_string();
        log_event_with_fields(
            Event::QueryExecuted,
            &[
                ("dataset", query.dataset_id()),
                ("returned", returned.as_str()),
                ("scanned", scanned.as_str()),
            ],
        );

        Ok(result.into_records())
    }

    fn reject(&self, dataset: &str, err: ApiError) -> ApiError {
        log_event_with_fields(
            Event::QueryRejected,
            &[
                ("code", err.code().code()),
                ("dataset", dataset),
                ("reason", err.message()),
            ],
        );
        err
    }

    /// Imports an archive under `id`.
    pub fn add_dataset(
        &mut self,
        id: &str,
        archive: &[u8],
        kind: DatasetKind,
    ) -> ApiResult<DatasetInfo> {
        let scope = ObservationScope::with_fields("IMPORT", &[("dataset", id)]);

        match self.store.import_records(id, archive, kind) {
            Ok(info) => {
                let rows = info.num_rows.to_string();
                scope.complete_with_fields(&[("rows", rows.as_str())]);
                Ok(info)
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(err.into())
            }
        }
    }

    /// Removes the dataset stored under `id`.
    pub fn remove_dataset(&mut self, id: &str) -> ApiResult<()> {
        self.store.delete_records(id)?;
        log_event_with_fields(Event::DatasetRemoved, &[("dataset", id)]);
        Ok(())
    }

    /// Lists stored datasets, ordered by id.
    pub fn list_datasets(&self) -> ApiResult<Vec<DatasetInfo>> {
        Ok(self.store.list_datasets()?)
    }

    /// Describes how a query parses, without touching the store.
    pub fn explain_query(&self, text: &str) -> ExplainQuery {
        match QueryParser::parse(text) {
            Ok(query) => ExplainQuery::from_query(&query),
            Err(err) => ExplainQuery::from_error(&err),
        }
    }
}
