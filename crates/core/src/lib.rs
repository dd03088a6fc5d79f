pub mod account;
pub mod cache;
pub mod config;
pub mod marvel;
pub mod metrics;
pub mod roster;
pub mod signer;
pub mod testing;

pub use account::{AccountClient, AccountError, FavoriteCharacter, AUTH_TOKEN_KEY};
pub use cache::{
    create_cache_store, CacheError, CacheStore, KeyValueStore, LocalStorageStore, MemoryKvStore,
    Platform, SqliteKvStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, CachePlatform, Config, ConfigError,
    SanitizedConfig,
};
pub use marvel::{
    character_cache_key, Character, CharacterSource, Collection, MarvelClient, MarvelError, Page,
};
pub use roster::{
    merge_characters, AcquisitionError, PaginationController, PaginationState, RosterSnapshot,
    RosterSource, ROSTER_CACHE_KEY,
};
pub use signer::{RequestSigner, Signature};
