//! Account backend proxy handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use comicvault_core::{
    account::{FavoriteCharacterUpdate, LoginRequest, RegisterRequest},
    AccountClient, AccountError, FavoriteCharacter,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/account/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let client = account_client(&state)?;
    let message = client
        .register(&request.name, &request.email, &request.password)
        .await
        .map_err(account_error)?;
    Ok(Json(MessageResponse { message }))
}

/// POST /api/v1/account/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let client = account_client(&state)?;
    let token = client
        .login(&request.email, &request.password)
        .await
        .map_err(account_error)?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/v1/account/logout
pub async fn logout(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>, ApiError> {
    let client = account_client(&state)?;
    client.logout().await.map_err(account_error)?;
    Ok(Json(MessageResponse {
        message: "logged out".to_string(),
    }))
}

/// GET /api/v1/account/favorite-character/{user_id}
pub async fn get_favorite(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<FavoriteCharacter>, ApiError> {
    let client = account_client(&state)?;
    let favorite = client
        .favorite_character(user_id)
        .await
        .map_err(account_error)?;
    Ok(Json(favorite))
}

/// POST /api/v1/account/favorite-character
pub async fn update_favorite(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FavoriteCharacterUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    let client = account_client(&state)?;
    let message = client
        .update_favorite_character(
            update.user_id,
            &update.favorite_character,
            &update.character_image,
        )
        .await
        .map_err(account_error)?;
    Ok(Json(MessageResponse { message }))
}

// ============================================================================
// Helpers
// ============================================================================

fn account_client(state: &AppState) -> Result<&AccountClient, ApiError> {
    state.account().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Account backend not configured".to_string(),
            }),
        )
    })
}

fn account_error(e: AccountError) -> ApiError {
    let status = match &e {
        AccountError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        AccountError::Rejected { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
        }
        AccountError::HttpError(_) | AccountError::ParseError(_) => StatusCode::BAD_GATEWAY,
        AccountError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
