//! Account backend integration.
//!
//! Registration, login and the per-user favorite character live in a
//! separate backend. Nothing in the roster pipeline depends on it.

mod client;
mod types;

pub use client::AccountClient;
pub use types::{FavoriteCharacter, FavoriteCharacterUpdate, LoginRequest, RegisterRequest};

use thiserror::Error;

/// Cache key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Errors that can occur when talking to the account backend.
#[derive(Debug, Error)]
pub enum AccountError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// No token stored; log in first.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Backend answered with an error.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Failed to parse the backend reply.
    #[error("Failed to parse reply: {0}")]
    ParseError(String),

    /// Token could not be stored or removed.
    #[error("Token storage failed: {0}")]
    Storage(String),
}
