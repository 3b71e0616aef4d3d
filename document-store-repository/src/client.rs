//! Document store client implementation.
//!
//! This module provides the main client for interacting with the document
//! store. Application code uses this to write, fetch, search, and count
//! documents and to manage indices. Every operation is a single round trip
//! whose outcome is normalized into a `StatusCode`.

use std::sync::Arc;

use document_store_shared::{
    Document, RefreshTarget, SearchResult, SourceLookup, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use crate::config::DocumentStoreConfig;
use crate::errors::{StoreError, StoreResult};
use crate::interfaces::SearchBackend;
use crate::normalizer::{normalize, Operation};
use crate::opensearch::OpenSearchBackend;
use crate::response::{decode_count, decode_search, decode_source, decode_write_ack};

/// The main client for interacting with the document store.
///
/// Holds nothing but the shared backend handle, so clones are cheap and can
/// be used from any number of tasks at once.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn SearchBackend>,
}

impl DocumentStore {
    /// Create a new DocumentStore on top of an existing backend.
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Create a new DocumentStore connected to OpenSearch.
    ///
    /// No request is made; use `ping` to verify the backend is reachable.
    pub fn from_config(config: &DocumentStoreConfig) -> StoreResult<Self> {
        let backend = OpenSearchBackend::new(config)?;
        Ok(Self::new(Arc::new(backend)))
    }

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Check that the backend answers.
    ///
    /// Any response counts as alive; only a transport failure is an error.
    pub async fn ping(&self) -> StoreResult<StatusCode> {
        match self.backend.ping().await {
            Ok(response) => {
                debug!(http_status = response.status, "Ping answered");
                Ok(StatusCode::Success)
            }
            Err(e) => normalize(Operation::Ping, Err(e)).map(|_| StatusCode::Success),
        }
    }

    /// Create or replace an index template.
    ///
    /// `template` is passed to the backend as is; it only has to be valid JSON.
    #[instrument(skip(self, template))]
    pub async fn create_index_template(
        &self,
        name: &str,
        template: &str,
    ) -> StoreResult<StatusCode> {
        if name.trim().is_empty() {
            return Err(StoreError::invalid_request("template name is required"));
        }
        let template = raw_json(template, "index template")?;

        let outcome = self.backend.put_index_template(name, &template).await;
        normalize(Operation::PutIndexTemplate, outcome)?;

        info!(name = %name, "Index template stored");
        Ok(StatusCode::Success)
    }

    /// Refresh indices so that recent writes become visible to searches.
    ///
    /// `RefreshTarget::All` refreshes every index. An explicit empty list
    /// names nothing and succeeds without contacting the backend.
    pub async fn refresh(&self, target: &RefreshTarget) -> StoreResult<StatusCode> {
        if let RefreshTarget::Indices(indices) = target {
            if indices.is_empty() {
                debug!("Refresh with no indices, nothing to do");
                return Ok(StatusCode::Success);
            }
            if indices.iter().any(|i| i.trim().is_empty()) {
                return Err(StoreError::invalid_request("index name must not be blank"));
            }
        }

        debug!(target = ?target, "Refreshing");
        let outcome = self.backend.refresh(target).await;
        normalize(Operation::Refresh, outcome)?;
        Ok(StatusCode::Success)
    }

    /// Delete the given indices.
    ///
    /// The request either succeeds for all of them or fails as a whole. An
    /// empty list succeeds without contacting the backend.
    pub async fn delete_indices<S: AsRef<str>>(&self, indices: &[S]) -> StoreResult<StatusCode> {
        if indices.is_empty() {
            debug!("Delete with no indices, nothing to do");
            return Ok(StatusCode::Success);
        }

        let indices: Vec<String> = indices.iter().map(|i| i.as_ref().to_string()).collect();
        if indices.iter().any(|i| i.trim().is_empty()) {
            return Err(StoreError::invalid_request("index name must not be blank"));
        }

        let outcome = self.backend.delete_indices(&indices).await;
        normalize(Operation::DeleteIndices, outcome)?;

        info!(indices = ?indices, "Indices deleted");
        Ok(StatusCode::Success)
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Write a whole document, replacing any document with the same id.
    ///
    /// An empty id lets the backend assign one.
    ///
    /// # Returns
    ///
    /// * `Ok(StatusCode::Created)` - The document was written
    /// * `Err(StoreError)` - `InternalError` for a missing body, `BadRequest`
    ///   for a body that is not a JSON object or a rejected request,
    ///   `UnexpectedError` when the write acknowledgement is unreadable
    pub async fn create_document<B: Serialize>(&self, doc: &Document<B>) -> StoreResult<StatusCode> {
        let body = encode_body(doc)?;
        require_index(&doc.index)?;

        debug!(index = %doc.index, id = %doc.id, refresh = %doc.refresh, "Indexing document");
        let outcome = self
            .backend
            .index(&doc.index, &doc.id, &body, doc.refresh)
            .await;
        let response = normalize(Operation::Index, outcome)?;

        let ack = decode_write_ack(&response.body).map_err(|e| {
            warn!(index = %doc.index, id = %doc.id, error = %e, "Unreadable write acknowledgement");
            e
        })?;
        info!(
            index = %doc.index,
            id = ?ack.id,
            result = ?ack.result,
            version = ?ack.version,
            "Document indexed"
        );

        Ok(StatusCode::Created)
    }

    /// Merge the document body into the stored document.
    ///
    /// Fields absent from the body keep their stored values.
    pub async fn update_document<B: Serialize>(&self, doc: &Document<B>) -> StoreResult<StatusCode> {
        let body = encode_body(doc)?;
        require_index(&doc.index)?;
        require_id(&doc.id)?;

        debug!(index = %doc.index, id = %doc.id, refresh = %doc.refresh, "Updating document");
        let outcome = self
            .backend
            .update(&doc.index, &doc.id, &json!({ "doc": body }), doc.refresh)
            .await;
        let response = normalize(Operation::Update, outcome)?;

        let ack = decode_write_ack(&response.body).map_err(|e| {
            warn!(index = %doc.index, id = %doc.id, error = %e, "Unreadable update acknowledgement");
            e
        })?;
        info!(
            index = %doc.index,
            id = %doc.id,
            result = ?ack.result,
            version = ?ack.version,
            "Document updated"
        );

        Ok(StatusCode::Success)
    }

    /// Delete a document.
    ///
    /// A missing document is an error here, reported as `NotFound`.
    pub async fn remove_document(&self, index: &str, id: &str) -> StoreResult<StatusCode> {
        require_index(index)?;
        require_id(id)?;

        debug!(index = %index, id = %id, "Deleting document");
        let outcome = self.backend.delete(index, id).await;
        let response = normalize(Operation::Delete, outcome)?;

        decode_write_ack(&response.body).map_err(|e| {
            warn!(index = %index, id = %id, error = %e, "Unreadable delete acknowledgement");
            e
        })?;
        debug!(index = %index, id = %id, "Document deleted");

        Ok(StatusCode::Success)
    }

    /// Fetch only the stored body of a document.
    ///
    /// A missing document is not an error: it comes back as
    /// `SourceLookup { status: NotFound, document: None }`.
    pub async fn get_source<T: DeserializeOwned>(
        &self,
        index: &str,
        id: &str,
    ) -> StoreResult<SourceLookup<T>> {
        require_index(index)?;
        require_id(id)?;

        let outcome = self.backend.get_source(index, id).await;
        if matches!(&outcome, Ok(response) if response.status == 404) {
            debug!(index = %index, id = %id, "Document source not found");
            return Ok(SourceLookup::not_found());
        }
        let response = normalize(Operation::GetSource, outcome)?;

        let document = decode_source(&response.body).map_err(|e| {
            warn!(index = %index, id = %id, error = %e, "Undecodable document source");
            e
        })?;
        Ok(SourceLookup::found(document))
    }

    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Run a query and decode every hit's source into `T`.
    ///
    /// The query is sent verbatim with exact total-hit tracking. The returned
    /// hits and documents are in backend order, which is the query's sort
    /// order, and `total` counts every match, not just this page.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - `Success`, or `NoContent` when the response has
    ///   no hits section
    /// * `Err(StoreError)` - `ParseError` when the response or any hit source
    ///   cannot be decoded
    #[instrument(skip(self, query))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        index: &str,
        query: &str,
    ) -> StoreResult<SearchResult<T>> {
        require_index(index)?;
        let query = raw_json(query, "query")?;

        let outcome = self.backend.search(index, &query, true).await;
        let response = normalize(Operation::Search, outcome)?;

        let result = decode_search::<T>(&response.body).map_err(|e| {
            warn!(index = %index, error = %e, "Undecodable search response");
            e
        })?;
        debug!(
            index = %index,
            status = %result.status,
            hits = result.hits.len(),
            total = result.total,
            "Search completed"
        );

        Ok(result)
    }

    /// Count the documents matching a query.
    #[instrument(skip(self, query))]
    pub async fn count(&self, index: &str, query: &str) -> StoreResult<u64> {
        require_index(index)?;
        let query = raw_json(query, "query")?;

        let outcome = self.backend.count(index, &query).await;
        let response = normalize(Operation::Count, outcome)?;

        let count = decode_count(&response.body).map_err(|e| {
            warn!(index = %index, error = %e, "Undecodable count response");
            e
        })?;
        debug!(index = %index, count = count, "Count completed");

        Ok(count)
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore").finish_non_exhaustive()
    }
}

/// Encode a document body, which must be present and serialize to a JSON object.
fn encode_body<B: Serialize>(doc: &Document<B>) -> StoreResult<Value> {
    let body = doc.body.as_ref().ok_or_else(StoreError::missing_body)?;

    let value = serde_json::to_value(body)
        .map_err(|e| StoreError::invalid_document(format!("error encoding document body: {}", e)))?;
    if !value.is_object() {
        return Err(StoreError::invalid_document(
            "document body must encode to a JSON object",
        ));
    }

    Ok(value)
}

fn require_index(index: &str) -> StoreResult<()> {
    if index.trim().is_empty() {
        return Err(StoreError::invalid_request("index is required"));
    }
    Ok(())
}

fn require_id(id: &str) -> StoreResult<()> {
    if id.trim().is_empty() {
        return Err(StoreError::invalid_request("document id is required"));
    }
    Ok(())
}

/// Wrap caller-supplied JSON text so it is sent byte for byte.
fn raw_json(text: &str, what: &str) -> StoreResult<Box<RawValue>> {
    RawValue::from_string(text.to_string())
        .map_err(|e| StoreError::invalid_request(format!("{} is not valid JSON: {}", what, e)))
}
