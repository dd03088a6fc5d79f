//! Remote character API integration.
//!
//! This module provides the client for the signed, rate-limited public
//! character API and the trait the roster uses to talk to it.

mod client;
mod types;

pub use client::MarvelClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the remote character API.
#[derive(Debug, Error)]
pub enum MarvelError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response did not carry the `data.results` envelope.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Client not configured (missing or rejected API keys).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of collections and their member characters.
///
/// Implemented by [`MarvelClient`] and by the mock in `testing`.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// List the collections known to the remote API.
    async fn list_collections(&self) -> Result<Vec<Collection>, MarvelError>;

    /// Fetch one page of a collection's member characters.
    async fn fetch_members(
        &self,
        collection_id: u64,
        offset: u32,
        limit: u32,
    ) -> Result<Page, MarvelError>;

    /// Fetch a single character by id. `Ok(None)` when the API does not know it.
    async fn fetch_character(&self, id: u64) -> Result<Option<Character>, MarvelError>;
}
