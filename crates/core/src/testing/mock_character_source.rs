//! Mock character source for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::marvel::{Character, CharacterSource, Collection, MarvelError, Page};

/// A recorded source call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedSourceCall {
    ListCollections,
    FetchMembers {
        collection_id: u64,
        offset: u32,
        limit: u32,
    },
    FetchCharacter {
        id: u64,
    },
}

/// Mock implementation of the CharacterSource trait.
///
/// Provides controllable behavior for testing:
/// - Serve configurable collections and paged member lists
/// - Track calls for assertions
/// - Simulate failures, globally or per collection
/// - Simulate latency
///
/// # Example
///
/// ```rust,ignore
/// use comicvault_core::testing::{MockCharacterSource, fixtures};
///
/// let source = MockCharacterSource::new();
/// source.add_collection(1, "Avengers Disassembled").await;
/// source.set_members(1, fixtures::numbered_characters(100, 45)).await;
///
/// let page = source.fetch_members(1, 40, 20).await?;
/// assert_eq!(page.count(), 5);
/// ```
#[derive(Debug)]
pub struct MockCharacterSource {
    /// Collections returned by the listing call, in order.
    collections: Arc<RwLock<Vec<Collection>>>,
    /// Member characters by collection id.
    members: Arc<RwLock<HashMap<u64, Vec<Character>>>>,
    /// Characters only reachable through the detail endpoint.
    characters: Arc<RwLock<HashMap<u64, Character>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedSourceCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<MarvelError>>>,
    /// One-shot member-fetch failures by collection id.
    collection_errors: Arc<RwLock<HashMap<u64, MarvelError>>>,
    /// Artificial latency applied to every call.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl Default for MockCharacterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCharacterSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(Vec::new())),
            members: Arc::new(RwLock::new(HashMap::new())),
            characters: Arc::new(RwLock::new(HashMap::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            collection_errors: Arc::new(RwLock::new(HashMap::new())),
            delay: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Data Configuration
    // =========================================================================

    /// Add a collection to the listing.
    pub async fn add_collection(&self, id: u64, title: &str) {
        self.collections.write().await.push(Collection {
            id,
            title: title.to_string(),
        });
    }

    /// Replace the members of a collection.
    pub async fn set_members(&self, collection_id: u64, members: Vec<Character>) {
        self.members.write().await.insert(collection_id, members);
    }

    /// Make a character available through the detail endpoint.
    pub async fn add_character(&self, character: Character) {
        self.characters
            .write()
            .await
            .insert(character.id, character);
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedSourceCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Number of collection listing calls.
    pub async fn list_count(&self) -> usize {
        self.count_matching(|c| matches!(c, RecordedSourceCall::ListCollections))
            .await
    }

    /// Number of member page fetches.
    pub async fn member_fetch_count(&self) -> usize {
        self.count_matching(|c| matches!(c, RecordedSourceCall::FetchMembers { .. }))
            .await
    }

    /// Offsets requested for `collection_id`, in call order.
    pub async fn offsets_for(&self, collection_id: u64) -> Vec<u32> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| match c {
                RecordedSourceCall::FetchMembers {
                    collection_id: id,
                    offset,
                    ..
                } if *id == collection_id => Some(*offset),
                _ => None,
            })
            .collect()
    }

    async fn count_matching(&self, pred: impl Fn(&RecordedSourceCall) -> bool) -> usize {
        self.calls.read().await.iter().filter(|c| pred(*c)).count()
    }

    // =========================================================================
    // Error Injection / Latency
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: MarvelError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Fail the next member fetch against `collection_id`.
    pub async fn fail_collection(&self, collection_id: u64, error: MarvelError) {
        self.collection_errors
            .write()
            .await
            .insert(collection_id, error);
    }

    /// Delay every call by `delay`.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    async fn take_error(&self) -> Option<MarvelError> {
        self.next_error.write().await.take()
    }

    async fn begin(&self, call: RecordedSourceCall) -> Result<(), MarvelError> {
        self.calls.write().await.push(call);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.take_error().await {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CharacterSource for MockCharacterSource {
    async fn list_collections(&self) -> Result<Vec<Collection>, MarvelError> {
        self.begin(RecordedSourceCall::ListCollections).await?;
        Ok(self.collections.read().await.clone())
    }

    async fn fetch_members(
        &self,
        collection_id: u64,
        offset: u32,
        limit: u32,
    ) -> Result<Page, MarvelError> {
        self.begin(RecordedSourceCall::FetchMembers {
            collection_id,
            offset,
            limit,
        })
        .await?;

        if let Some(e) = self.collection_errors.write().await.remove(&collection_id) {
            return Err(e);
        }

        let members = self.members.read().await;
        let all = members
            .get(&collection_id)
            .ok_or_else(|| MarvelError::NotFound(format!("collection {}", collection_id)))?;

        let results = all
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            offset,
            limit,
            total: Some(all.len() as u32),
            results,
        })
    }

    async fn fetch_character(&self, id: u64) -> Result<Option<Character>, MarvelError> {
        self.begin(RecordedSourceCall::FetchCharacter { id }).await?;

        if let Some(character) = self.characters.read().await.get(&id) {
            return Ok(Some(character.clone()));
        }

        Ok(self
            .members
            .read()
            .await
            .values()
            .flatten()
            .find(|c| c.id == id)
            .cloned())
    }
}
