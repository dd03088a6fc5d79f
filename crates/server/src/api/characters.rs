//! Character roster API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use comicvault_core::{AcquisitionError, Character, RosterSnapshot};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CharacterQueryParams {
    #[serde(default)]
    pub query: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/characters
///
/// Current roster snapshot, optionally filtered by name.
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CharacterQueryParams>,
) -> Json<RosterSnapshot> {
    let snapshot = state.roster().snapshot().await;
    match params.query.as_deref() {
        Some(query) => Json(snapshot.filtered(query)),
        None => Json(snapshot),
    }
}

/// POST /api/v1/characters/load-more
///
/// Run one pagination step. Failures are reported in the snapshot.
pub async fn load_more(State(state): State<Arc<AppState>>) -> Json<RosterSnapshot> {
    Json(state.roster().load_more().await)
}

/// GET /api/v1/characters/{id}
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Character>, (StatusCode, Json<ErrorResponse>)> {
    match state.roster().character(id).await {
        Ok(character) => Ok(Json(character)),
        Err(e) => {
            debug!("Character lookup {} failed: {}", id, e);
            let status = match e {
                AcquisitionError::CharacterNotFound(_) => StatusCode::NOT_FOUND,
                AcquisitionError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}
