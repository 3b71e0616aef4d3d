//! # Document Store Repository
//!
//! This crate provides a uniform client for storing, retrieving, searching and
//! counting JSON documents in an OpenSearch-compatible search engine. Every
//! backend outcome is normalized into a `StatusCode`, and response bodies are
//! decoded into typed results.
//!
//! It includes definitions for errors, the backend interface, and a concrete
//! implementation for OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod normalizer;
pub mod opensearch;
pub mod response;

pub use client::DocumentStore;
pub use config::DocumentStoreConfig;
pub use errors::{BackendError, StoreError, StoreResult};
pub use interfaces::{RawResponse, SearchBackend};
pub use opensearch::OpenSearchBackend;

pub use document_store_shared::{
    Document, HitMetadata, RefreshPolicy, RefreshTarget, SearchResult, SourceLookup, StatusCode,
};
