//! Document store error types.
//!
//! Every failed operation returns one of these. Each variant maps to exactly
//! one `StatusCode`, so callers that only care about the code can use
//! `StoreError::status` and ignore the rest.

use document_store_shared::StatusCode;
use thiserror::Error;

use crate::errors::BackendError;

/// Result type returned by document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during document store operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A write was attempted without a document body.
    #[error("Missing body: {0}")]
    MissingBody(String),

    /// The document body could not be encoded as a JSON object.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The request was rejected before it was sent (blank index, malformed query).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No response was obtained from the backend.
    #[error("Request error: {0}")]
    Transport(String),

    /// The backend answered with an error status.
    #[error("Backend error: {reason}")]
    Backend {
        /// Normalized status.
        status: StatusCode,
        /// HTTP status returned by the backend.
        http_status: u16,
        /// Reason extracted from the error body.
        reason: String,
    },

    /// A write succeeded but its acknowledgement could not be decoded.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A read succeeded but its payload could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The client could not be configured.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl StoreError {
    /// Create a missing body error.
    pub fn missing_body() -> Self {
        Self::MissingBody("document body is required".to_string())
    }

    /// Create an invalid document error.
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a backend error.
    pub fn backend(status: StatusCode, http_status: u16, reason: impl Into<String>) -> Self {
        Self::Backend {
            status,
            http_status,
            reason: reason.into(),
        }
    }

    /// Create an unexpected response error.
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// The status code this error is reported as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingBody(_) => StatusCode::InternalError,
            Self::InvalidDocument(_) => StatusCode::BadRequest,
            Self::InvalidRequest(_) => StatusCode::BadRequest,
            Self::Transport(_) => StatusCode::RequestError,
            Self::Backend { status, .. } => *status,
            Self::UnexpectedResponse(_) => StatusCode::UnexpectedError,
            Self::ParseError(_) => StatusCode::ParseError,
            Self::ConfigurationError(_) => StatusCode::InternalError,
        }
    }

    /// Whether the backend reported the addressed document or index as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == StatusCode::NotFound
    }
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::ConnectionError(msg) => Self::ConfigurationError(msg),
            BackendError::RequestError(msg) | BackendError::BodyError(msg) => Self::Transport(msg),
        }
    }
}
