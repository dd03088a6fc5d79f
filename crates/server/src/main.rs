use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comicvault_core::{
    create_cache_store, load_config, validate_config, AccountClient, CharacterSource,
    MarvelClient, Platform, SanitizedConfig,
};
use comicvault_server::api::create_router;
use comicvault_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("COMICVAULT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        "comicvault {} configuration loaded (hash {})",
        VERSION,
        &config_hash[..16]
    );
    info!("Tracking collections: {:?}", config.roster.collections);

    // Create remote client
    let marvel = MarvelClient::new(&config.marvel).context("Failed to create API client")?;
    if !marvel.is_configured() {
        error!("Marvel API keys are not configured; every remote fetch will fail");
    }
    let source: Arc<dyn CharacterSource> = Arc::new(marvel);

    // Create cache store
    let cache = create_cache_store(&config.cache).context("Failed to open cache store")?;
    info!(
        "Cache store opened at {:?} ({:?} platform)",
        config.cache.path,
        Platform::resolve(config.cache.platform)
    );

    // Create account client if configured
    let account = match &config.account {
        Some(account_config) => {
            info!("Account backend at {}", account_config.base_url);
            match AccountClient::new(account_config, cache.clone()) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!("Failed to create account client: {}", e);
                    None
                }
            }
        }
        None => {
            info!("Account backend not configured");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), source, cache, account));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
