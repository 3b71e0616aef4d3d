//! OpenSearch backend implementation.
//!
//! This module provides the concrete implementation of `SearchBackend` using
//! the OpenSearch Rust client. It only moves bytes: responses are returned
//! with their status and body untouched for the document store to interpret.

use async_trait::async_trait;
use document_store_shared::{RefreshPolicy, RefreshTarget};
use opensearch::{
    http::headers::{HeaderValue, AUTHORIZATION},
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesDeleteParts, IndicesPutIndexTemplateParts, IndicesRefreshParts},
    params::Refresh,
    CountParts, DeleteParts, GetSourceParts, IndexParts, OpenSearch, SearchParts, UpdateParts,
};
use serde_json::value::RawValue;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::DocumentStoreConfig;
use crate::errors::{BackendError, StoreError};
use crate::interfaces::{RawResponse, SearchBackend};

/// OpenSearch backend implementation.
///
/// # Example
///
/// ```ignore
/// use document_store_repository::{DocumentStoreConfig, OpenSearchBackend};
///
/// let config = DocumentStoreConfig::new("http://localhost:9200");
/// let backend = OpenSearchBackend::new(&config)?;
/// let response = backend.ping().await?;
/// ```
pub struct OpenSearchBackend {
    client: OpenSearch,
}

impl OpenSearchBackend {
    /// Create a new OpenSearch backend from the given configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchBackend)` - A new backend instance
    /// * `Err(StoreError)` - If the address, cloud id or API key is unusable
    pub fn new(config: &DocumentStoreConfig) -> Result<Self, StoreError> {
        let url = config.endpoint()?;

        if config.cloud_id.is_none() && config.addresses.len() > 1 {
            warn!(
                using = %url,
                ignored = ?&config.addresses[1..],
                "Only the first address is used"
            );
        }

        let conn_pool = SingleNodeConnectionPool::new(url.clone());
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if let Some(api_key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("ApiKey {}", api_key))
                .map_err(|e| StoreError::configuration(format!("invalid API key: {}", e)))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        let transport = builder
            .build()
            .map_err(|e| BackendError::connection(e.to_string()))?;

        info!(
            url = %url,
            cloud = config.cloud_id.is_some(),
            api_key = config.api_key.is_some(),
            "Created OpenSearch backend"
        );

        Ok(Self::from_client(OpenSearch::new(transport)))
    }

    /// Wrap an already configured OpenSearch client.
    pub fn from_client(client: OpenSearch) -> Self {
        Self { client }
    }

    /// Read status and body from a response.
    async fn read(response: Response) -> Result<RawResponse, BackendError> {
        let status = response.status_code().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::body(e.to_string()))?;

        debug!(status = status, bytes = body.len(), "Received response");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn refresh_param(refresh: RefreshPolicy) -> Refresh {
    match refresh {
        RefreshPolicy::True => Refresh::True,
        RefreshPolicy::False => Refresh::False,
        RefreshPolicy::WaitFor => Refresh::WaitFor,
    }
}

#[async_trait]
impl SearchBackend for OpenSearchBackend {
    async fn ping(&self) -> Result<RawResponse, BackendError> {
        let response = self.client.ping().send().await?;
        Self::read(response).await
    }

    #[instrument(skip(self, template))]
    async fn put_index_template(
        &self,
        name: &str,
        template: &RawValue,
    ) -> Result<RawResponse, BackendError> {
        let response = self
            .client
            .indices()
            .put_index_template(IndicesPutIndexTemplateParts::Name(name))
            .body(template)
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self, body))]
    async fn index(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        refresh: RefreshPolicy,
    ) -> Result<RawResponse, BackendError> {
        let parts = if id.is_empty() {
            IndexParts::Index(index)
        } else {
            IndexParts::IndexId(index, id)
        };

        let response = self
            .client
            .index(parts)
            .refresh(refresh_param(refresh))
            .body(body)
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self, body))]
    async fn update(
        &self,
        index: &str,
        id: &str,
        body: &Value,
        refresh: RefreshPolicy,
    ) -> Result<RawResponse, BackendError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(index, id))
            .refresh(refresh_param(refresh))
            .body(body)
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, index: &str, id: &str) -> Result<RawResponse, BackendError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        index: &str,
        query: &RawValue,
        track_total_hits: bool,
    ) -> Result<RawResponse, BackendError> {
        let indices = [index];
        let response = self
            .client
            .search(SearchParts::Index(&indices))
            .track_total_hits(track_total_hits)
            .body(query)
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self, query))]
    async fn count(&self, index: &str, query: &RawValue) -> Result<RawResponse, BackendError> {
        let indices = [index];
        let response = self
            .client
            .count(CountParts::Index(&indices))
            .body(query)
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn get_source(&self, index: &str, id: &str) -> Result<RawResponse, BackendError> {
        let response = self
            .client
            .get_source(GetSourceParts::IndexId(index, id))
            .send()
            .await?;

        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn refresh(&self, target: &RefreshTarget) -> Result<RawResponse, BackendError> {
        let response = match target {
            RefreshTarget::All => {
                self.client
                    .indices()
                    .refresh(IndicesRefreshParts::None)
                    .send()
                    .await?
            }
            RefreshTarget::Indices(indices) => {
                let indices: Vec<&str> = indices.iter().map(String::as_str).collect();
                self.client
                    .indices()
                    .refresh(IndicesRefreshParts::Index(&indices))
                    .send()
                    .await?
            }
        };

        Self::read(response).await
    }

    #[instrument(skip(self))]
    async fn delete_indices(&self, indices: &[String]) -> Result<RawResponse, BackendError> {
        let indices: Vec<&str> = indices.iter().map(String::as_str).collect();
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&indices))
            .send()
            .await?;

        Self::read(response).await
    }
}
