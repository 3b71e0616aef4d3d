//! OpenSearch implementation of the search backend.
//!
//! This module provides a concrete implementation of `SearchBackend`
//! using OpenSearch as the backend.

mod client;

pub use client::OpenSearchBackend;
