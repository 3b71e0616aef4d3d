//! Configuration types for the DocumentStore.

use std::env;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::errors::{StoreError, StoreResult};

/// Default backend address.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// Environment variable holding comma-separated backend addresses.
pub const ADDRESSES_VAR: &str = "DOCUMENT_STORE_ADDRESSES";

/// Environment variable holding the cloud id.
pub const CLOUD_ID_VAR: &str = "DOCUMENT_STORE_CLOUD_ID";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "DOCUMENT_STORE_API_KEY";

/// Connection settings for the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStoreConfig {
    /// Backend node URLs. Only the first one is used.
    pub addresses: Vec<String>,
    /// Cloud deployment id. Takes precedence over `addresses` when set.
    pub cloud_id: Option<String>,
    /// Base64-encoded API key, sent as `Authorization: ApiKey <key>`.
    pub api_key: Option<String>,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

impl DocumentStoreConfig {
    /// Create a configuration for a single node.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            addresses: vec![address.into()],
            cloud_id: None,
            api_key: None,
        }
    }

    /// Create a configuration listing several nodes.
    pub fn cluster(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            ..Self::new("")
        }
    }

    /// Set the cloud id.
    pub fn with_cloud_id(mut self, cloud_id: impl Into<String>) -> Self {
        self.cloud_id = Some(cloud_id.into());
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Load the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DOCUMENT_STORE_ADDRESSES`: comma-separated node URLs (default: http://localhost:9200)
    /// - `DOCUMENT_STORE_CLOUD_ID`: cloud deployment id (optional)
    /// - `DOCUMENT_STORE_API_KEY`: API key (optional)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let addresses: Vec<String> = non_empty(ADDRESSES_VAR)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            addresses: if addresses.is_empty() {
                vec![DEFAULT_ADDRESS.to_string()]
            } else {
                addresses
            },
            cloud_id: non_empty(CLOUD_ID_VAR),
            api_key: non_empty(API_KEY_VAR),
        }
    }

    /// The URL requests are sent to.
    pub fn endpoint(&self) -> StoreResult<Url> {
        if let Some(cloud_id) = &self.cloud_id {
            return decode_cloud_id(cloud_id);
        }

        let address = self
            .addresses
            .first()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| StoreError::configuration("no backend address configured"))?;

        Url::parse(address)
            .map_err(|e| StoreError::configuration(format!("invalid address {}: {}", address, e)))
    }
}

/// Resolve a cloud id of the form `<name>:<base64(host$es_uuid$kibana_uuid)>`
/// to `https://<es_uuid>.<host>`.
pub fn decode_cloud_id(cloud_id: &str) -> StoreResult<Url> {
    let (_, encoded) = cloud_id
        .rsplit_once(':')
        .ok_or_else(|| StoreError::configuration("cloud id must have the form <name>:<data>"))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| StoreError::configuration(format!("invalid cloud id encoding: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| StoreError::configuration(format!("invalid cloud id encoding: {}", e)))?;

    let mut parts = decoded.split('$');
    let host = parts.next().unwrap_or_default();
    let uuid = parts.next().unwrap_or_default();
    if host.is_empty() || uuid.is_empty() {
        return Err(StoreError::configuration(
            "cloud id does not name a host and deployment",
        ));
    }

    Url::parse(&format!("https://{}.{}", uuid, host))
        .map_err(|e| StoreError::configuration(format!("invalid cloud id host: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use document_store_shared::StatusCode;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn cloud_id(name: &str, data: &str) -> String {
        format!("{}:{}", name, STANDARD.encode(data))
    }

    #[test]
    fn test_default_config() {
        let config = DocumentStoreConfig::default();
        assert_eq!(config.addresses, vec![DEFAULT_ADDRESS.to_string()]);
        assert!(config.cloud_id.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(config.endpoint().unwrap().as_str(), "http://localhost:9200/");
    }

    #[test]
    fn test_from_lookup() {
        let config = DocumentStoreConfig::from_lookup(lookup(&[
            (ADDRESSES_VAR, "http://a:9200, http://b:9200,"),
            (API_KEY_VAR, "c2VjcmV0"),
            (CLOUD_ID_VAR, "  "),
        ]));

        assert_eq!(
            config.addresses,
            vec!["http://a:9200".to_string(), "http://b:9200".to_string()]
        );
        assert_eq!(config.api_key.as_deref(), Some("c2VjcmV0"));
        assert!(config.cloud_id.is_none());
        assert_eq!(config.endpoint().unwrap().host_str(), Some("a"));
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = DocumentStoreConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DocumentStoreConfig::default());
    }

    #[test]
    fn test_cloud_id_takes_precedence() {
        let config = DocumentStoreConfig::new("http://localhost:9200")
            .with_cloud_id(cloud_id("my-deployment", "us-east-1.aws.found.io$abc123$def456"));

        assert_eq!(
            config.endpoint().unwrap().as_str(),
            "https://abc123.us-east-1.aws.found.io/"
        );
    }

    #[test]
    fn test_cloud_id_with_port() {
        let url = decode_cloud_id(&cloud_id("name", "example.com:9243$abc$def")).unwrap();
        assert_eq!(url.host_str(), Some("abc.example.com"));
        assert_eq!(url.port(), Some(9243));
    }

    #[test]
    fn test_invalid_cloud_ids() {
        for bad in [
            "no-separator".to_string(),
            "name:!!!not-base64!!!".to_string(),
            cloud_id("name", "only-host"),
            cloud_id("name", "$abc"),
        ] {
            let err = decode_cloud_id(&bad).unwrap_err();
            assert_eq!(err.status(), StatusCode::InternalError, "cloud id {}", bad);
        }
    }

    #[test]
    fn test_invalid_addresses() {
        let err = DocumentStoreConfig::new("not a url").endpoint().unwrap_err();
        assert!(matches!(err, StoreError::ConfigurationError(_)));

        let err = DocumentStoreConfig::cluster(vec![]).endpoint().unwrap_err();
        assert!(matches!(err, StoreError::ConfigurationError(_)));
    }
}
