//! HTTP client for the account backend.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::types::{
    BackendReply, FavoriteCharacter, FavoriteCharacterUpdate, LoginRequest, RegisterRequest,
};
use super::{AccountError, AUTH_TOKEN_KEY};
use crate::cache::CacheStore;
use crate::config::AccountConfig;

/// Account backend client.
///
/// The bearer token obtained at login lives in the cache store under
/// [`AUTH_TOKEN_KEY`], so it survives restarts like the rest of the cache.
pub struct AccountClient {
    client: Client,
    base_url: String,
    cache: CacheStore,
}

impl AccountClient {
    pub fn new(config: &AccountConfig, cache: CacheStore) -> Result<Self, AccountError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Create an account. Returns the backend's confirmation message.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<String, AccountError> {
        debug!("Registering account for {}", email);

        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let reply = self.post("/register", &body, None).await?;
        Ok(reply.message.unwrap_or_else(|| "registered".to_string()))
    }

    /// Log in and persist the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        debug!("Logging in {}", email);

        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let reply = self.post("/login", &body, None).await?;
        let token = reply
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AccountError::ParseError("login reply carried no token".to_string()))?;

        self.cache.put(AUTH_TOKEN_KEY, &token).await;
        info!("Logged in as {}", email);
        Ok(token)
    }

    /// Forget the stored token.
    pub async fn logout(&self) -> Result<(), AccountError> {
        self.cache
            .remove(AUTH_TOKEN_KEY)
            .await
            .map_err(|e| AccountError::Storage(e.to_string()))?;
        info!("Logged out");
        Ok(())
    }

    /// The stored bearer token, if logged in.
    pub async fn token(&self) -> Option<String> {
        self.cache
            .get::<String>(AUTH_TOKEN_KEY)
            .await
            .filter(|t| !t.is_empty())
    }

    /// Fetch the favorite character of `user_id`.
    pub async fn favorite_character(
        &self,
        user_id: u64,
    ) -> Result<FavoriteCharacter, AccountError> {
        let token = self.require_token().await?;
        let url = format!("{}/user/favorite-character/{}", self.base_url, user_id);
        debug!("Fetching favorite character: user={}", user_id);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let reply = serde_json::from_str::<BackendReply>(&text).unwrap_or_default();
            return Err(rejection(status, reply));
        }

        serde_json::from_str(&text)
            .map_err(|e| AccountError::ParseError(format!("Failed to parse favorite: {}", e)))
    }

    /// Replace the favorite character of `user_id`.
    pub async fn update_favorite_character(
        &self,
        user_id: u64,
        name: &str,
        image_url: &str,
    ) -> Result<String, AccountError> {
        let token = self.require_token().await?;
        let body = FavoriteCharacterUpdate {
            user_id,
            favorite_character: name.to_string(),
            character_image: image_url.to_string(),
        };
        debug!("Updating favorite character: user={}, name={}", user_id, name);

        let reply = self
            .post("/user/update-favorite-character", &body, Some(&token))
            .await?;
        Ok(reply.message.unwrap_or_else(|| "updated".to_string()))
    }

    async fn require_token(&self) -> Result<String, AccountError> {
        self.token().await.ok_or(AccountError::NotAuthenticated)
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<BackendReply, AccountError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let reply: BackendReply = match serde_json::from_str(&text) {
            Ok(reply) => reply,
            Err(e) if status.is_success() => {
                return Err(AccountError::ParseError(format!(
                    "Failed to parse reply from {}: {}",
                    path, e
                )))
            }
            Err(_) => BackendReply::default(),
        };

        interpret(status, reply)
    }
}

/// Map a backend status and reply body to a result.
fn interpret(status: StatusCode, reply: BackendReply) -> Result<BackendReply, AccountError> {
    if status.is_success() && reply.error.is_none() {
        return Ok(reply);
    }
    Err(rejection(status, reply))
}

fn rejection(status: StatusCode, reply: BackendReply) -> AccountError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("Account backend refused the token ({})", status);
    }
    let message = reply
        .error
        .or(reply.message)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
    AccountError::Rejected {
        status: status.as_u16(),
        message,
    }
}
