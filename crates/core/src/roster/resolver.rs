//! Search-term to collection resolution.
//!
//! Titles are matched by case-insensitive substring against the live remote
//! listing, first match wins. Resolved collections are remembered for the
//! lifetime of the resolver so later pages skip the listing call.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::marvel::{CharacterSource, Collection, MarvelError};

use super::types::AcquisitionError;

/// Find the first collection whose title contains `term`, ignoring case.
pub fn match_collection<'a>(collections: &'a [Collection], term: &str) -> Option<&'a Collection> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    collections
        .iter()
        .find(|c| c.title.to_lowercase().contains(&needle))
}

/// Resolve one search term with a fresh listing call.
pub async fn resolve_collection(
    source: &dyn CharacterSource,
    term: &str,
) -> Result<Collection, AcquisitionError> {
    let collections = fetch_listing(source, term).await?;

    let found = match_collection(&collections, term)
        .cloned()
        .ok_or_else(|| AcquisitionError::CollectionNotFound(term.to_string()))?;

    info!(
        "Resolved collection {:?} -> {} ({})",
        term, found.id, found.title
    );
    Ok(found)
}

/// One listing call. `context` names the term(s) being resolved in errors.
async fn fetch_listing(
    source: &dyn CharacterSource,
    context: &str,
) -> Result<Vec<Collection>, AcquisitionError> {
    match source.list_collections().await {
        Ok(collections) => Ok(collections),
        Err(MarvelError::Malformed(message)) => {
            debug!(
                "Collection listing malformed while resolving {:?}: {}",
                context, message
            );
            Err(AcquisitionError::CollectionNotFound(context.to_string()))
        }
        Err(e) => Err(AcquisitionError::from_remote(context, e)),
    }
}

/// Session-scoped resolver that caches term-to-collection mappings.
pub struct CollectionResolver {
    source: Arc<dyn CharacterSource>,
    resolved: RwLock<HashMap<String, Collection>>,
}

impl CollectionResolver {
    pub fn new(source: Arc<dyn CharacterSource>) -> Self {
        Self {
            source,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve `term`, reusing an earlier result from this session.
    pub async fn resolve(&self, term: &str) -> Result<Collection, AcquisitionError> {
        let mut found = self.resolve_all(&[term.to_string()]).await?;
        found
            .pop()
            .ok_or_else(|| AcquisitionError::CollectionNotFound(term.to_string()))
    }

    /// Resolve every term, in order. Terms not seen before in this session
    /// share a single listing call. Fails on the first unresolved term.
    pub async fn resolve_all(&self, terms: &[String]) -> Result<Vec<Collection>, AcquisitionError> {
        let pending: Vec<&String> = {
            let resolved = self.resolved.read().await;
            terms.iter().filter(|t| !resolved.contains_key(*t)).collect()
        };

        if !pending.is_empty() {
            let context = pending
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let collections = fetch_listing(self.source.as_ref(), &context).await?;

            let mut resolved = self.resolved.write().await;
            for term in pending {
                let found = match_collection(&collections, term)
                    .cloned()
                    .ok_or_else(|| AcquisitionError::CollectionNotFound(term.clone()))?;
                info!(
                    "Resolved collection {:?} -> {} ({})",
                    term, found.id, found.title
                );
                resolved.insert(term.clone(), found);
            }
        }

        let resolved = self.resolved.read().await;
        terms
            .iter()
            .map(|term| {
                resolved
                    .get(term)
                    .cloned()
                    .ok_or_else(|| AcquisitionError::CollectionNotFound(term.clone()))
            })
            .collect()
    }

    /// Number of terms resolved so far.
    pub async fn resolved_count(&self) -> usize {
        self.resolved.read().await.len()
    }
}
