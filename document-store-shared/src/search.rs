//! Search and lookup result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::status::StatusCode;

/// Metadata of a single search hit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HitMetadata {
    /// Index the hit was found in.
    #[serde(rename = "_index")]
    pub index: String,
    /// Mapping type. Empty when the backend no longer reports one.
    #[serde(rename = "_type", default)]
    pub doc_type: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score, 0 when the backend did not score the hit.
    #[serde(rename = "_score", default)]
    pub score: f64,
    /// Sort key values, present only when the query sorts explicitly.
    #[serde(default)]
    pub sort: Vec<Value>,
}

/// Result of a search.
///
/// `hits[i]` and `documents[i]` always describe the same matched document, in
/// the order the backend returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<T> {
    /// `Success`, or `NoContent` when the response carried no hits section.
    pub status: StatusCode,
    /// Per-hit metadata.
    pub hits: Vec<HitMetadata>,
    /// Exact number of matching documents, which may exceed the page size.
    pub total: u64,
    /// Decoded `_source` of every hit.
    pub documents: Vec<T>,
}

impl<T> SearchResult<T> {
    /// A result for a response without a hits section.
    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NoContent,
            hits: Vec::new(),
            total: 0,
            documents: Vec::new(),
        }
    }

    /// Number of hits on this page.
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Whether this page carries no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Iterate hits paired with their decoded documents.
    pub fn iter(&self) -> impl Iterator<Item = (&HitMetadata, &T)> {
        self.hits.iter().zip(self.documents.iter())
    }
}

/// Result of fetching a document's source.
///
/// A missing document is an expected outcome and is reported here, with
/// `NotFound` and no document, rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLookup<T> {
    /// `Success` or `NotFound`.
    pub status: StatusCode,
    /// The decoded source when found.
    pub document: Option<T>,
}

impl<T> SourceLookup<T> {
    /// A found document.
    pub fn found(document: T) -> Self {
        Self {
            status: StatusCode::Success,
            document: Some(document),
        }
    }

    /// A missing document.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NotFound,
            document: None,
        }
    }

    /// Whether the document exists.
    pub fn is_found(&self) -> bool {
        self.document.is_some()
    }
}
