//! Status codes reported by document store operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single document store call.
///
/// Every operation reports exactly one of these. The numeric values follow
/// HTTP conventions where one exists; the 49x/5xx extensions distinguish
/// failures that happen on this side of the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum StatusCode {
    /// The call succeeded.
    Success,
    /// A document was written.
    Created,
    /// The backend answered without the expected payload (e.g. no `hits`).
    NoContent,
    /// The request was rejected, either locally before sending or by the backend.
    BadRequest,
    /// The addressed document or index does not exist.
    NotFound,
    /// No response was obtained from the backend.
    RequestError,
    /// The caller misused the API (e.g. a write without a body).
    InternalError,
    /// A successful write returned an acknowledgement that could not be decoded.
    UnexpectedError,
    /// A successful read returned a payload that could not be decoded.
    ParseError,
    /// Any other backend-reported failure.
    Error,
}

impl StatusCode {
    /// Numeric value of the status.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::RequestError => 499,
            Self::InternalError => 500,
            Self::UnexpectedError => 520,
            Self::ParseError => 521,
            Self::Error => 599,
        }
    }

    /// Look up a status by its numeric value.
    pub fn from_u16(code: u16) -> Option<Self> {
        let status = match code {
            200 => Self::Success,
            201 => Self::Created,
            204 => Self::NoContent,
            400 => Self::BadRequest,
            404 => Self::NotFound,
            499 => Self::RequestError,
            500 => Self::InternalError,
            520 => Self::UnexpectedError,
            521 => Self::ParseError,
            599 => Self::Error,
            _ => return None,
        };
        Some(status)
    }

    /// Whether the status reports a successful call.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success | Self::Created | Self::NoContent)
    }

    fn label(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::RequestError => "Request Error",
            Self::InternalError => "Internal Error",
            Self::UnexpectedError => "Unexpected Error",
            Self::ParseError => "Parse Error",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.label())
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        status.as_u16()
    }
}

impl TryFrom<u16> for StatusCode {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, String> {
        StatusCode::from_u16(code).ok_or_else(|| format!("unknown status code {}", code))
    }
}
