//! Status normalization.
//!
//! Turns the outcome of a backend call into either a usable response or a
//! `StoreError` carrying exactly one `StatusCode`:
//!
//! 1. no response obtained ⇒ `RequestError`
//! 2. HTTP status ≥ 400 ⇒ `BadRequest` (400), `NotFound` (404, lookup-style
//!    operations only) or `Error`
//! 3. anything else is handed back for operation-specific decoding

use std::fmt;

use document_store_shared::StatusCode;
use serde_json::Value;
use tracing::{error, warn};

use crate::errors::{BackendError, StoreError, StoreResult};
use crate::interfaces::RawResponse;

/// The backend calls a `DocumentStore` makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ping,
    PutIndexTemplate,
    Index,
    Update,
    Delete,
    Search,
    Count,
    GetSource,
    Refresh,
    DeleteIndices,
}

impl Operation {
    /// Name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::PutIndexTemplate => "put_index_template",
            Self::Index => "index",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Count => "count",
            Self::GetSource => "get_source",
            Self::Refresh => "refresh",
            Self::DeleteIndices => "delete_indices",
        }
    }

    /// Whether a 404 from this call means "the addressed document is absent"
    /// rather than a generic failure.
    pub fn reports_not_found(self) -> bool {
        matches!(self, Self::Delete | Self::GetSource)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply the transport and HTTP rules to a backend call outcome.
///
/// Returns the response when the backend answered with a non-error status.
pub fn normalize(
    operation: Operation,
    outcome: Result<RawResponse, BackendError>,
) -> StoreResult<RawResponse> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!(operation = %operation, error = %e, "Backend request failed");
            return Err(StoreError::from(e));
        }
    };

    if response.is_error() {
        let err = backend_error(operation, &response);
        warn!(
            operation = %operation,
            http_status = response.status,
            status = %err.status(),
            error = %err,
            "Backend reported an error"
        );
        return Err(err);
    }

    Ok(response)
}

/// Map an HTTP error status to a `StatusCode`.
pub fn classify(operation: Operation, http_status: u16) -> StatusCode {
    match http_status {
        400 => StatusCode::BadRequest,
        404 if operation.reports_not_found() => StatusCode::NotFound,
        _ => StatusCode::Error,
    }
}

/// Build the error for a response with an error status.
pub fn backend_error(operation: Operation, response: &RawResponse) -> StoreError {
    StoreError::backend(
        classify(operation, response.status),
        response.status,
        error_reason(response.status, &response.body),
    )
}

/// Human-readable reason for an error response.
///
/// Uses the structured `error.type` / `error.reason` pair when the body has
/// one, and falls back to whatever the body does say.
pub fn error_reason(http_status: u16, body: &[u8]) -> String {
    if body.is_empty() {
        return format!("[{}] empty response body", http_status);
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            return format!("[{}] error parsing the response body: {}", http_status, e);
        }
    };

    match value.get("error") {
        Some(Value::Object(error)) => {
            let kind = error.get("type").and_then(Value::as_str).unwrap_or("unknown");
            let reason = error
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            format!("[{}] {}: {}", http_status, kind, reason)
        }
        Some(Value::String(message)) => format!("[{}] {}", http_status, message),
        _ => match value.get("result").and_then(Value::as_str) {
            // Document APIs report a missing id as `{"result": "not_found", ...}`
            Some(result) => format!("[{}] {}", http_status, result),
            None => format!("[{}] {}", http_status, value),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_failure_is_request_error() {
        let err = normalize(
            Operation::Search,
            Err(BackendError::request("connection refused")),
        )
        .unwrap_err();

        assert_eq!(err.status(), StatusCode::RequestError);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_ping_failure_is_request_error() {
        let err = normalize(Operation::Ping, Err(BackendError::body("stream closed"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::RequestError);
        assert_eq!(Operation::Ping.to_string(), "ping");
        assert!(!Operation::Ping.reports_not_found());
    }

    #[test]
    fn test_success_passes_through() {
        let response = RawResponse::new(200, r#"{"acknowledged":true}"#);
        let normalized = normalize(Operation::PutIndexTemplate, Ok(response.clone())).unwrap();
        assert_eq!(normalized, response);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(Operation::Index, 400), StatusCode::BadRequest);
        assert_eq!(classify(Operation::Delete, 400), StatusCode::BadRequest);
        assert_eq!(classify(Operation::Delete, 404), StatusCode::NotFound);
        assert_eq!(classify(Operation::GetSource, 404), StatusCode::NotFound);
        assert_eq!(classify(Operation::Index, 404), StatusCode::Error);
        assert_eq!(classify(Operation::Search, 404), StatusCode::Error);
        assert_eq!(classify(Operation::Search, 409), StatusCode::Error);
        assert_eq!(classify(Operation::Count, 500), StatusCode::Error);
        assert_eq!(classify(Operation::Count, 503), StatusCode::Error);
    }

    #[test]
    fn test_error_reason_structured() {
        let body = br#"{"error":{"type":"parsing_exception","reason":"unknown query [nope]"},"status":400}"#;
        assert_eq!(
            error_reason(400, body),
            "[400] parsing_exception: unknown query [nope]"
        );
    }

    #[test]
    fn test_error_reason_string_error() {
        let body = br#"{"error":"Incorrect HTTP method","status":405}"#;
        assert_eq!(error_reason(405, body), "[405] Incorrect HTTP method");
    }

    #[test]
    fn test_error_reason_not_found_result() {
        let body = br#"{"_index":"docs","_id":"1","result":"not_found"}"#;
        assert_eq!(error_reason(404, body), "[404] not_found");
    }

    #[test]
    fn test_error_reason_undecodable() {
        let reason = error_reason(502, b"<html>Bad Gateway</html>");
        assert!(reason.starts_with("[502] error parsing the response body:"));
    }

    #[test]
    fn test_error_reason_empty() {
        assert_eq!(error_reason(404, b""), "[404] empty response body");
    }

    #[test]
    fn test_backend_error_for_delete_not_found() {
        let response = RawResponse::new(404, r#"{"result":"not_found"}"#);
        let err = normalize(Operation::Delete, Ok(response)).unwrap_err();

        assert_eq!(err.status(), StatusCode::NotFound);
        assert_eq!(
            err,
            StoreError::backend(StatusCode::NotFound, 404, "[404] not_found")
        );
    }

    #[test]
    fn test_backend_error_for_index_not_found_is_generic() {
        let response = RawResponse::new(
            404,
            r#"{"error":{"type":"index_not_found_exception","reason":"no such index [x]"}}"#,
        );
        let err = normalize(Operation::Search, Ok(response)).unwrap_err();
        assert_eq!(err.status(), StatusCode::Error);
    }
}
