//! # Document Store Shared
//!
//! Shared types used by callers of the document store client: the closed set of
//! status codes every operation reports, the per-call `Document` envelope, and
//! the typed shapes search and source lookups decode into.

pub mod document;
pub mod search;
pub mod status;

pub use document::{Document, RefreshPolicy, RefreshTarget};
pub use search::{HitMetadata, SearchResult, SourceLookup};
pub use status::StatusCode;
