//! Types for the pagination controller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::marvel::{Character, MarvelError, Page};

/// Errors that can occur while acquiring the roster.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// Signing keys missing or rejected by the remote API.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No collection title matched the search term.
    #[error("no collection matches \"{0}\"")]
    CollectionNotFound(String),

    /// Network, HTTP or envelope failure against one collection.
    #[error("failed to fetch {collection}: {source}")]
    RemoteFetch {
        collection: String,
        #[source]
        source: MarvelError,
    },

    /// Stored roster could not be decoded. Treated as a cache miss.
    #[error("cached roster is unreadable: {0}")]
    CacheDeserialization(String),

    /// Detail lookup found the character nowhere.
    #[error("character not found: {0}")]
    CharacterNotFound(u64),
}

impl AcquisitionError {
    /// Classify a remote failure against `collection`.
    pub fn from_remote(collection: impl Into<String>, err: MarvelError) -> Self {
        match err {
            MarvelError::NotConfigured(message) => AcquisitionError::Configuration(message),
            source => AcquisitionError::RemoteFetch {
                collection: collection.into(),
                source,
            },
        }
    }

    /// Whether an explicit retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AcquisitionError::RemoteFetch { .. })
    }
}

/// Pagination state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationState {
    /// Ready for the next "load more".
    Idle,
    /// A step is in flight; further requests are ignored.
    Fetching,
    /// Every collection is drained, or the roster came from cache.
    Exhausted,
    /// The last step failed; "load more" retries the same offset.
    Failed,
}

impl std::fmt::Display for PaginationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaginationState::Idle => "idle",
            PaginationState::Fetching => "fetching",
            PaginationState::Exhausted => "exhausted",
            PaginationState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Where the current roster came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
    /// Nothing loaded yet.
    #[default]
    None,
    Remote,
    Cache,
}

/// Offset/limit window over the remote collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl Cursor {
    pub fn new(limit: u32) -> Self {
        Self {
            offset: 0,
            limit,
            has_more: true,
        }
    }

    /// Move past a successfully fetched round of pages.
    ///
    /// More data remains unless every page came back short.
    pub fn advance(&mut self, pages: &[Page]) {
        self.offset += self.limit;
        self.has_more = pages.iter().any(|p| !p.is_last());
    }

    pub fn is_start(&self) -> bool {
        self.offset == 0
    }
}

/// Point-in-time view of a pagination session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub state: PaginationState,
    pub offset: u32,
    pub limit: u32,
    pub has_more: bool,
    pub source: RosterSource,
    pub total: usize,
    pub characters: Vec<Character>,
    /// Message of the last failure, cleared by the next successful step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether retrying the failed step can succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl RosterSnapshot {
    /// Same snapshot with characters narrowed to names containing `query`.
    pub fn filtered(mut self, query: &str) -> Self {
        let needle = query.trim().to_lowercase();
        if !needle.is_empty() {
            self.characters
                .retain(|c| c.name.to_lowercase().contains(&needle));
        }
        self
    }
}
