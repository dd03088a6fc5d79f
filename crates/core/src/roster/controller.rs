//! Pagination controller.
//!
//! Drives "load more" steps over every tracked collection: cache first, then
//! one concurrent round of member fetches at the current offset, merged into
//! the running roster and written back to the cache.

use std::sync::Arc;

use futures::future::try_join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheError, CacheStore};
use crate::config::RosterConfig;
use crate::marvel::{character_cache_key, Character, CharacterSource, Collection, Page};
use crate::metrics::{PAGINATION_CYCLES, ROSTER_SIZE};

use super::merge::merge_into;
use super::resolver::CollectionResolver;
use super::types::{AcquisitionError, Cursor, PaginationState, RosterSnapshot, RosterSource};
use super::ROSTER_CACHE_KEY;

/// Accumulated state of one pagination session.
#[derive(Debug)]
struct Session {
    state: PaginationState,
    cursor: Cursor,
    roster: Vec<Character>,
    source: RosterSource,
    last_error: Option<String>,
    retryable: bool,
}

impl Session {
    fn new(limit: u32) -> Self {
        Self {
            state: PaginationState::Idle,
            cursor: Cursor::new(limit),
            roster: Vec::new(),
            source: RosterSource::None,
            last_error: None,
            retryable: false,
        }
    }

    fn snapshot(&self) -> RosterSnapshot {
        RosterSnapshot {
            state: self.state,
            offset: self.cursor.offset,
            limit: self.cursor.limit,
            has_more: self.cursor.has_more,
            source: self.source,
            total: self.roster.len(),
            characters: self.roster.clone(),
            error: self.last_error.clone(),
            retryable: self.retryable,
        }
    }

    /// Apply the outcome of the step started at `cursor`.
    fn finish(&mut self, cursor: Cursor, result: Result<Step, AcquisitionError>) -> RosterSnapshot {
        match result {
            Ok(Step::Cached(roster)) => {
                info!("Serving {} characters from cache", roster.len());
                self.roster = roster;
                self.source = RosterSource::Cache;
                self.cursor.has_more = false;
                self.state = PaginationState::Exhausted;
                self.clear_error();
                PAGINATION_CYCLES.with_label_values(&["cache"]).inc();
            }
            Ok(Step::Fetched { roster, pages }) => {
                self.roster = roster;
                self.source = RosterSource::Remote;
                self.cursor.advance(&pages);
                self.clear_error();
                self.state = if self.cursor.has_more {
                    PaginationState::Idle
                } else {
                    PaginationState::Exhausted
                };
                info!(
                    "Loaded offset {}: {} characters in roster, now {}",
                    cursor.offset,
                    self.roster.len(),
                    self.state
                );
                let outcome = if self.cursor.has_more {
                    "fetched"
                } else {
                    "exhausted"
                };
                PAGINATION_CYCLES.with_label_values(&[outcome]).inc();
            }
            Err(e) => {
                error!("Failed to load characters at offset {}: {}", cursor.offset, e);
                self.fail(e.to_string(), e.is_retryable());
            }
        }

        ROSTER_SIZE.set(self.roster.len() as i64);
        self.snapshot()
    }

    fn fail(&mut self, message: String, retryable: bool) {
        self.state = PaginationState::Failed;
        self.last_error = Some(message);
        self.retryable = retryable;
        PAGINATION_CYCLES.with_label_values(&["failed"]).inc();
    }

    fn clear_error(&mut self) {
        self.last_error = None;
        self.retryable = false;
    }
}

/// Result of one successful step.
enum Step {
    /// A stored roster was found; the network was not touched.
    Cached(Vec<Character>),
    /// One round of pages was fetched and merged.
    Fetched {
        roster: Vec<Character>,
        pages: Vec<Page>,
    },
}

/// Everything a step needs besides the session itself.
struct Fetcher {
    source: Arc<dyn CharacterSource>,
    cache: CacheStore,
    resolver: CollectionResolver,
    terms: Vec<String>,
}

/// Owns the running roster and its cursor for one session.
///
/// Steps are strictly sequential: a request made while a step is in flight,
/// or after the session is exhausted, returns the current snapshot untouched.
/// A step runs on its own task, so dropping the caller of
/// [`load_more`](Self::load_more) discards the result but never leaves the
/// session stuck in `Fetching`.
pub struct PaginationController {
    fetcher: Arc<Fetcher>,
    session: Arc<Mutex<Session>>,
}

impl PaginationController {
    pub fn new(source: Arc<dyn CharacterSource>, cache: CacheStore, config: &RosterConfig) -> Self {
        let terms = config
            .collections
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            fetcher: Arc::new(Fetcher {
                resolver: CollectionResolver::new(Arc::clone(&source)),
                source,
                cache,
                terms,
            }),
            session: Arc::new(Mutex::new(Session::new(config.page_limit))),
        }
    }

    /// Collection search terms tracked by this session.
    pub fn terms(&self) -> &[String] {
        &self.fetcher.terms
    }

    /// Current state of the session.
    pub async fn snapshot(&self) -> RosterSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn state(&self) -> PaginationState {
        self.session.lock().await.state
    }

    /// Characters whose name contains `query`, ignoring case, in roster order.
    pub async fn search(&self, query: &str) -> Vec<Character> {
        let needle = query.trim().to_lowercase();
        let session = self.session.lock().await;
        session
            .roster
            .iter()
            .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Run one pagination step and return the resulting snapshot.
    ///
    /// Never fails: errors move the session to `Failed` with a message and
    /// leave the roster and cursor as they were.
    pub async fn load_more(&self) -> RosterSnapshot {
        let (cursor, roster) = {
            let mut session = self.session.lock().await;
            match session.state {
                PaginationState::Fetching | PaginationState::Exhausted => {
                    debug!("Ignoring load more while {}", session.state);
                    PAGINATION_CYCLES.with_label_values(&["skipped"]).inc();
                    return session.snapshot();
                }
                PaginationState::Idle | PaginationState::Failed => {}
            }
            session.state = PaginationState::Fetching;
            (session.cursor, session.roster.clone())
        };

        let fetcher = Arc::clone(&self.fetcher);
        let session = Arc::clone(&self.session);
        let task = tokio::spawn(async move {
            let result = fetcher.step(cursor, roster).await;
            session.lock().await.finish(cursor, result)
        });

        match task.await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("Pagination step at offset {} aborted: {}", cursor.offset, e);
                let mut session = self.session.lock().await;
                session.fail(format!("pagination step aborted: {}", e), true);
                session.snapshot()
            }
        }
    }

    /// Look up one character: detail cache, then roster, then remote.
    pub async fn character(&self, id: u64) -> Result<Character, AcquisitionError> {
        let key = character_cache_key(id);
        if let Some(character) = self.fetcher.cache.get::<Character>(&key).await {
            debug!("Character {} served from cache", id);
            return Ok(character);
        }

        let known = {
            let session = self.session.lock().await;
            session.roster.iter().find(|c| c.id == id).cloned()
        };

        let character = match known {
            Some(character) => character,
            None => self
                .fetcher
                .source
                .fetch_character(id)
                .await
                .map_err(|e| AcquisitionError::from_remote(format!("character {}", id), e))?
                .ok_or(AcquisitionError::CharacterNotFound(id))?,
        };

        self.fetcher.cache.put_detached(&key, &character);
        Ok(character)
    }
}

impl Fetcher {
    async fn step(
        &self,
        cursor: Cursor,
        roster: Vec<Character>,
    ) -> Result<Step, AcquisitionError> {
        if cursor.is_start() && roster.is_empty() {
            if let Some(cached) = self.cached_roster().await {
                return Ok(Step::Cached(cached));
            }
        }

        let collections = self.resolver.resolve_all(&self.terms).await?;
        let pages = try_join_all(
            collections
                .iter()
                .map(|collection| self.fetch_page(collection, cursor)),
        )
        .await?;

        let incoming = pages.iter().map(|p| p.results.clone()).collect::<Vec<_>>();
        let merged = merge_into(roster, incoming);
        self.cache.put(ROSTER_CACHE_KEY, &merged).await;

        Ok(Step::Fetched {
            roster: merged,
            pages,
        })
    }

    async fn fetch_page(
        &self,
        collection: &Collection,
        cursor: Cursor,
    ) -> Result<Page, AcquisitionError> {
        debug!(
            "Fetching {} members at offset {} (limit {})",
            collection.title, cursor.offset, cursor.limit
        );

        let mut page = self
            .source
            .fetch_members(collection.id, cursor.offset, cursor.limit)
            .await
            .map_err(|e| AcquisitionError::from_remote(collection.title.clone(), e))?;

        for character in &mut page.results {
            character.event = Some(collection.title.clone());
        }
        Ok(page)
    }

    /// Previously merged roster, if one is stored and readable.
    async fn cached_roster(&self) -> Option<Vec<Character>> {
        match self.cache.try_get::<Vec<Character>>(ROSTER_CACHE_KEY).await {
            Ok(Some(roster)) if !roster.is_empty() => Some(roster),
            Ok(_) => None,
            Err(CacheError::Deserialization { message, .. }) => {
                warn!(
                    "{}, fetching from remote",
                    AcquisitionError::CacheDeserialization(message)
                );
                None
            }
            Err(e) => {
                warn!("Roster cache unavailable, fetching from remote: {}", e);
                None
            }
        }
    }
}
