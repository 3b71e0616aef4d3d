//! Search backend trait definition.
//!
//! This module defines the raw capability the document store is built on: one
//! method per engine API call, each returning the backend's HTTP status and
//! body untouched. Interpreting those responses is the job of the document
//! store, not of the backend.

use async_trait::async_trait;
use document_store_shared::{RefreshPolicy, RefreshTarget};
use serde_json::value::RawValue;
use serde_json::Value;

use crate::errors::BackendError;

/// An HTTP response as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Create a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the backend reported an error (status 400 or above).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// Raw access to the search engine's HTTP API.
///
/// Implementations perform exactly one request per call and never retry.
/// A returned `Err` means no response was obtained; any response, including
/// 4xx and 5xx ones, is returned as `Ok`.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`; a single backend handle is
/// shared by every caller of a `DocumentStore`.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Liveness probe (`HEAD /`).
    async fn ping(&self) -> Result<RawResponse, BackendError>;

    /// Create or replace a composable index template (`PUT /_index_template/{name}`).
    async fn put_index_template(
        &self,
        name: &str,
        template: &RawValue,
    ) -> Result<RawResponse, BackendError>;

    /// Write a full document (`PUT /{index}/_doc/{id}`, or `POST /{index}/_doc` when
    /// `id` is empty).
    async fn index(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        refresh: RefreshPolicy,
    ) -> Result<RawResponse, BackendError>;

    /// Partially update a document (`POST /{index}/_update/{id}`). `body` is the
    /// complete update request, e.g. `{"doc": {...}}`.
    async fn update(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        refresh: RefreshPolicy,
    ) -> Result<RawResponse, BackendError>;

    /// Delete a document (`DELETE /{index}/_doc/{id}`).
    async fn delete(&self, index: &str, id: &str) -> Result<RawResponse, BackendError>;

    /// Run a search (`POST /{index}/_search`).
    async fn search(
        &self,
        index: &str,
        query: &RawValue,
        track_total_hits: bool,
    ) -> Result<RawResponse, BackendError>;

    /// Count matching documents (`POST /{index}/_count`).
    async fn count(&self, index: &str, query: &RawValue) -> Result<RawResponse, BackendError>;

    /// Fetch only the stored source of a document (`GET /{index}/_source/{id}`).
    async fn get_source(&self, index: &str, id: &str) -> Result<RawResponse, BackendError>;

    /// Refresh indices (`POST /_refresh` or `POST /{indices}/_refresh`).
    async fn refresh(&self, target: &RefreshTarget) -> Result<RawResponse, BackendError>;

    /// Delete indices (`DELETE /{indices}`).
    async fn delete_indices(&self, indices: &[String]) -> Result<RawResponse, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_is_error() {
        assert!(!RawResponse::new(200, "{}").is_error());
        assert!(!RawResponse::new(201, "{}").is_error());
        assert!(!RawResponse::new(399, "").is_error());
        assert!(RawResponse::new(400, "").is_error());
        assert!(RawResponse::new(404, "").is_error());
        assert!(RawResponse::new(503, "").is_error());
    }
}
