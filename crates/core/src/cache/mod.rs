//! Local cache store - JSON blobs by string key, persisted across restarts.
//!
//! The store sits on top of one or two [`KeyValueStore`] backends: the
//! platform persistent store, and on browser-hosted runtimes a mirror in
//! local storage. Callers never branch on platform.

mod local;
mod memory;
mod sqlite;

pub use local::LocalStorageStore;
pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{CacheConfig, CachePlatform};
use crate::metrics::{CACHE_LOOKUPS, CACHE_WRITES};

/// Errors from the cache layer.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("failed to serialize value for key {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("corrupt cache entry for key {key}: {message}")]
    Deserialization { key: String, message: String },
}

/// Opaque string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), CacheError>;

    /// Name of this backend, for logs.
    fn backend_name(&self) -> &'static str;
}

/// Runtime the cache is running in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Native,
    Web,
}

impl Platform {
    /// Platform of the current compile target.
    pub fn detect() -> Self {
        if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Native
        }
    }

    pub fn resolve(configured: CachePlatform) -> Self {
        match configured {
            CachePlatform::Native => Platform::Native,
            CachePlatform::Web => Platform::Web,
            CachePlatform::Auto => Self::detect(),
        }
    }
}

/// Factory function to create the cache store from config
pub fn create_cache_store(config: &CacheConfig) -> Result<CacheStore, CacheError> {
    let primary: Arc<dyn KeyValueStore> = Arc::new(SqliteKvStore::new(&config.path)?);

    match Platform::resolve(config.platform) {
        Platform::Native => Ok(CacheStore::new(primary)),
        Platform::Web => {
            let local = Arc::new(LocalStorageStore::open(&config.local_path)?);
            Ok(CacheStore::new(primary).with_local(local))
        }
    }
}

/// JSON cache over the platform stores.
///
/// Reads never fail: storage errors and corrupt entries are logged and
/// reported as a miss. Writes are whole-value replacements.
#[derive(Clone)]
pub struct CacheStore {
    primary: Arc<dyn KeyValueStore>,
    local: Option<Arc<dyn KeyValueStore>>,
}

impl CacheStore {
    pub fn new(primary: Arc<dyn KeyValueStore>) -> Self {
        Self {
            primary,
            local: None,
        }
    }

    /// Add a browser-local mirror: read as fallback, written alongside the primary.
    pub fn with_local(mut self, local: Arc<dyn KeyValueStore>) -> Self {
        self.local = Some(local);
        self
    }

    /// Cache backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKvStore::new()))
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// Read and decode `key`, reporting storage and decode failures.
    ///
    /// Every lookup is counted in `CACHE_LOOKUPS` by result.
    pub async fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let raw = match self.read_raw(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
                return Ok(None);
            }
            Err(e) => {
                CACHE_LOOKUPS.with_label_values(&["error"]).inc();
                return Err(e);
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
                Ok(Some(value))
            }
            Err(e) => {
                CACHE_LOOKUPS.with_label_values(&["corrupt"]).inc();
                Err(CacheError::Deserialization {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Read and decode `key`; any failure is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e @ CacheError::Deserialization { .. }) => {
                warn!("Ignoring cache entry: {}", e);
                None
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Read `key` as an untyped JSON value.
    pub async fn get_json(&self, key: &str) -> Option<Value> {
        self.get::<Value>(key).await
    }

    /// Encode and store `value` under `key` in every available store.
    ///
    /// Failures are logged, never returned.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                CACHE_WRITES.with_label_values(&["error"]).inc();
                warn!(
                    "{}",
                    CacheError::Serialization {
                        key: key.to_string(),
                        message: e.to_string(),
                    }
                );
                return;
            }
        };

        let stores = self.stores();
        let key = key.to_string();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut ok = true;
            for store in stores {
                if let Err(e) = store.set(&key, &raw) {
                    warn!("Cache write to {} failed for {}: {}", store.backend_name(), key, e);
                    ok = false;
                }
            }
            debug!("Cached {} ({} bytes)", key, raw.len());
            ok
        })
        .await;

        let label = match outcome {
            Ok(true) => "success",
            Ok(false) => "error",
            Err(e) => {
                warn!("Cache write task failed: {}", e);
                "error"
            }
        };
        CACHE_WRITES.with_label_values(&[label]).inc();
    }

    /// Store `value` without waiting for the write to finish.
    pub fn put_detached<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                CACHE_WRITES.with_label_values(&["error"]).inc();
                warn!("Failed to serialize value for {}: {}", key, e);
                return;
            }
        };

        let store = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            store.put(&key, &value).await;
        });
    }

    /// Remove `key` from every store.
    pub async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let stores = self.stores();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), CacheError> {
            for store in stores {
                store.remove(&key)?;
            }
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Storage(format!("cache task failed: {}", e)))?
    }

    /// Remove every entry from every store. Not used by the pipeline itself.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let stores = self.stores();
        tokio::task::spawn_blocking(move || -> Result<(), CacheError> {
            for store in stores {
                store.clear()?;
            }
            Ok(())
        })
        .await
        .map_err(|e| CacheError::Storage(format!("cache task failed: {}", e)))?
    }

    fn stores(&self) -> Vec<Arc<dyn KeyValueStore>> {
        std::iter::once(Arc::clone(&self.primary))
            .chain(self.local.iter().cloned())
            .collect()
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let primary = Arc::clone(&self.primary);
        let local = self.local.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<String>, CacheError> {
            if let Some(raw) = primary.get(&key)? {
                return Ok(Some(raw));
            }
            match local {
                Some(local) => local.get(&key),
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| CacheError::Storage(format!("cache task failed: {}", e)))?
    }
}
