//! Document envelope and write visibility controls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility contract for a single write.
///
/// See <https://www.elastic.co/guide/en/elasticsearch/reference/current/docs-refresh.html>.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Make the write visible immediately by refreshing the affected shards.
    True,
    /// No visibility guarantee; the write shows up after the next scheduled refresh.
    #[default]
    False,
    /// Hold the response until the next scheduled refresh has made the write visible.
    WaitFor,
}

impl RefreshPolicy {
    /// Value of the `refresh` request parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::True => "true",
            Self::False => "false",
            Self::WaitFor => "wait_for",
        }
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which indices a refresh applies to.
///
/// `All` and `Indices(vec![])` are different requests: the first refreshes
/// every index in the cluster, the second names no index at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RefreshTarget {
    /// Every index.
    #[default]
    All,
    /// Only the named indices.
    Indices(Vec<String>),
}

impl RefreshTarget {
    /// Target a single index.
    pub fn index(index: impl Into<String>) -> Self {
        Self::Indices(vec![index.into()])
    }

    /// Target the given indices.
    pub fn indices<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Indices(indices.into_iter().map(Into::into).collect())
    }
}

/// A single document addressed by index and id.
///
/// The body stays in the caller's own type and is only serialized when the
/// document is written. A write without a body is rejected before anything is
/// sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<B> {
    /// Target index.
    pub index: String,
    /// Document id. Empty lets the backend assign one on create.
    pub id: String,
    /// Document body.
    pub body: Option<B>,
    /// Visibility contract for the write.
    pub refresh: RefreshPolicy,
}

impl<B> Document<B> {
    /// Create a document with a body and the default refresh policy.
    pub fn new(index: impl Into<String>, id: impl Into<String>, body: B) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body: Some(body),
            refresh: RefreshPolicy::default(),
        }
    }

    /// Create a document without a body.
    pub fn empty(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            body: None,
            refresh: RefreshPolicy::default(),
        }
    }

    /// Set the refresh policy.
    pub fn with_refresh(mut self, refresh: RefreshPolicy) -> Self {
        self.refresh = refresh;
        self
    }
}
