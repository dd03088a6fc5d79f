//! Common test utilities for in-process API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock character source and a throwaway cache, plus a fake account
//! backend bound to a local port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::RwLock;
use tower::ServiceExt;

use comicvault_core::{
    cache::{CacheStore, SqliteKvStore},
    config::{AccountConfig, Config, RosterConfig},
    testing::MockCharacterSource,
    AccountClient, CharacterSource,
};
use comicvault_server::state::AppState;

/// Re-export fixtures for test convenience
pub use comicvault_core::testing::fixtures;

pub const AVENGERS: u64 = 238;
pub const XMEN: u64 = 227;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_load_more() {
///     let fixture = TestFixture::new().await;
///     fixture.source.set_members(AVENGERS, fixtures::numbered_characters(1, 5)).await;
///
///     let response = fixture.post("/api/v1/characters/load-more", json!({})).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock character source - configure collections and members
    pub source: Arc<MockCharacterSource>,
    /// Cache shared with the roster
    pub cache: CacheStore,
    /// Temporary directory for the cache database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a new test fixture with no account backend.
    pub async fn new() -> Self {
        Self::with_account(None).await
    }

    /// Create a test fixture whose account client talks to `backend_url`.
    pub async fn with_account(backend_url: Option<String>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = SqliteKvStore::new(&temp_dir.path().join("cache.db"))
            .expect("Failed to create cache store");
        let cache = CacheStore::new(Arc::new(store));

        let source = Arc::new(MockCharacterSource::new());
        source.add_collection(AVENGERS, "Avengers Disassembled").await;
        source.add_collection(XMEN, "X-Men: Age of Apocalypse").await;
        source.set_members(AVENGERS, Vec::new()).await;
        source.set_members(XMEN, Vec::new()).await;

        let account_config = backend_url.map(|base_url| AccountConfig {
            base_url,
            timeout_secs: 5,
        });
        let account = account_config.as_ref().map(|c| {
            AccountClient::new(c, cache.clone()).expect("Failed to create account client")
        });

        let config = Config {
            roster: RosterConfig {
                collections: vec!["avengers".to_string(), "x-men".to_string()],
                page_limit: 20,
            },
            account: account_config,
            ..Default::default()
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&source) as Arc<dyn CharacterSource>,
            cache.clone(),
            account,
        ));

        let router = comicvault_server::api::create_router(state);

        Self {
            router,
            source,
            cache,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

// =============================================================================
// Fake account backend
// =============================================================================

const FAKE_TOKEN: &str = "fake-jwt-token";

#[derive(Default)]
struct BackendState {
    /// email -> password
    users: HashMap<String, String>,
    /// user id -> (favorite, image)
    favorites: HashMap<u64, (String, String)>,
}

type SharedBackend = Arc<RwLock<BackendState>>;

/// Spawn the fake account backend on a random local port and return its URL.
pub async fn spawn_account_backend() -> String {
    let state: SharedBackend = Arc::new(RwLock::new(BackendState::default()));

    let app = Router::new()
        .route("/register", post(backend_register))
        .route("/login", post(backend_login))
        .route("/user/favorite-character/{id}", get(backend_get_favorite))
        .route(
            "/user/update-favorite-character",
            post(backend_update_favorite),
        )
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}", addr)
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", FAKE_TOKEN))
        .unwrap_or(false)
}

async fn backend_register(
    State(state): State<SharedBackend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();
    let mut state = state.write().await;
    if state.users.contains_key(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "User already exists"})),
        );
    }
    state.users.insert(email, password);
    (
        StatusCode::CREATED,
        Json(json!({"message": "User registered successfully"})),
    )
}

async fn backend_login(
    State(state): State<SharedBackend>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let state = state.read().await;
    match state.users.get(email) {
        Some(stored) if stored == password => {
            (StatusCode::OK, Json(json!({"token": FAKE_TOKEN})))
        }
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid credentials"})),
        ),
    }
}

async fn backend_get_favorite(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        );
    }
    let state = state.read().await;
    match state.favorites.get(&id) {
        Some((name, image)) => (
            StatusCode::OK,
            Json(json!({"favoriteCharacter": name, "characterImage": image})),
        ),
        None => (
            StatusCode::OK,
            Json(json!({"favoriteCharacter": null, "characterImage": null})),
        ),
    }
}

async fn backend_update_favorite(
    State(state): State<SharedBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        );
    }
    let id = body["userId"].as_u64().unwrap_or_default();
    let name = body["favoriteCharacter"].as_str().unwrap_or_default().to_string();
    let image = body["characterImage"].as_str().unwrap_or_default().to_string();
    state.write().await.favorites.insert(id, (name, image));
    (
        StatusCode::OK,
        Json(json!({"message": "Favorite character updated"})),
    )
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
