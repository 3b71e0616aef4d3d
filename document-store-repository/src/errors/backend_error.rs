//! Backend transport error types.
//!
//! These are raised by `SearchBackend` implementations when no usable response
//! could be obtained. Backend-reported failures (4xx/5xx) are not errors at
//! this level; they travel back as ordinary responses.

use thiserror::Error;

/// Errors that prevent a backend call from producing a response.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Failed to set up the connection to the backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or no response arrived.
    #[error("Request error: {0}")]
    RequestError(String),

    /// A response arrived but its body could not be read.
    #[error("Response body error: {0}")]
    BodyError(String),
}

impl BackendError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        Self::RequestError(msg.into())
    }

    /// Create a response body error.
    pub fn body(msg: impl Into<String>) -> Self {
        Self::BodyError(msg.into())
    }
}

impl From<opensearch::Error> for BackendError {
    fn from(err: opensearch::Error) -> Self {
        Self::RequestError(err.to_string())
    }
}
