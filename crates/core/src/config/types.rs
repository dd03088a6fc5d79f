use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub marvel: MarvelConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub account: Option<AccountConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Remote character API credentials and endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarvelConfig {
    /// Public API key, sent as `apikey`.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Private API key, only ever used as hash input.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Base URL (default: https://gateway.marvel.com/v1/public).
    #[serde(default = "default_marvel_base_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Page size used when listing collections (the API caps this at 100).
    #[serde(default = "default_listing_limit")]
    pub collection_listing_limit: u32,
}

impl Default for MarvelConfig {
    fn default() -> Self {
        Self {
            public_key: None,
            private_key: None,
            base_url: default_marvel_base_url(),
            timeout_secs: default_timeout(),
            collection_listing_limit: default_listing_limit(),
        }
    }
}

fn default_marvel_base_url() -> String {
    "https://gateway.marvel.com/v1/public".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_listing_limit() -> u32 {
    100
}

/// Which collections are tracked and how they are paged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterConfig {
    /// Collection search terms, matched against collection titles.
    #[serde(default = "default_collections")]
    pub collections: Vec<String>,
    /// Members fetched per collection per pagination step.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            collections: default_collections(),
            page_limit: default_page_limit(),
        }
    }
}

fn default_collections() -> Vec<String> {
    vec!["avengers".to_string(), "x-men".to_string()]
}

fn default_page_limit() -> u32 {
    20
}

/// Storage platform for the local cache.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CachePlatform {
    Native,
    Web,
    #[default]
    Auto,
}

/// Local cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub platform: CachePlatform,
    /// SQLite file backing the native store.
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// JSON file backing the browser-local store.
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            platform: CachePlatform::default(),
            path: default_cache_path(),
            local_path: default_local_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("comicvault.db")
}

fn default_local_path() -> PathBuf {
    PathBuf::from("local_storage.json")
}

/// Authentication backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Backend URL (e.g., "http://localhost:4000")
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub marvel: SanitizedMarvelConfig,
    pub roster: RosterConfig,
    pub cache: CacheConfig,
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountConfig>,
}

/// Sanitized remote API config (private key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedMarvelConfig {
    pub base_url: String,
    pub public_key_configured: bool,
    pub private_key_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let configured = |key: &Option<String>| key.as_ref().is_some_and(|k| !k.is_empty());
        Self {
            marvel: SanitizedMarvelConfig {
                base_url: config.marvel.base_url.clone(),
                public_key_configured: configured(&config.marvel.public_key),
                private_key_configured: configured(&config.marvel.private_key),
                timeout_secs: config.marvel.timeout_secs,
            },
            roster: config.roster.clone(),
            cache: config.cache.clone(),
            server: config.server.clone(),
            account: config.account.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[marvel]
public_key = "abc"
private_key = "def"
base_url = "http://localhost:9999/v1/public"

[roster]
collections = ["avengers", "x-men", "civil war"]
page_limit = 50

[cache]
platform = "web"
path = "/data/cache.db"
local_path = "/data/local.json"

[server]
host = "127.0.0.1"
port = 9000

[account]
base_url = "http://localhost:4000"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.marvel.base_url, "http://localhost:9999/v1/public");
        assert_eq!(config.roster.collections.len(), 3);
        assert_eq!(config.roster.page_limit, 50);
        assert_eq!(config.cache.platform, CachePlatform::Web);
        assert_eq!(config.cache.path.to_str().unwrap(), "/data/cache.db");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");

        let account = config.account.as_ref().unwrap();
        assert_eq!(account.base_url, "http://localhost:4000");
        assert_eq!(account.timeout_secs, 30); // default
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.marvel.base_url, "https://gateway.marvel.com/v1/public");
        assert_eq!(config.marvel.collection_listing_limit, 100);
        assert_eq!(config.roster.collections, vec!["avengers", "x-men"]);
        assert_eq!(config.cache.platform, CachePlatform::Auto);
        assert_eq!(config.cache.path.to_str().unwrap(), "comicvault.db");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert!(config.account.is_none());
    }

    #[test]
    fn test_deserialize_unknown_platform_fails() {
        let toml = r#"
[cache]
platform = "android"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_keys() {
        let mut config = Config::default();
        config.marvel.public_key = Some("public".to_string());
        config.marvel.private_key = Some("very-secret".to_string());

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.marvel.public_key_configured);
        assert!(sanitized.marvel.private_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("very-secret"));
    }

    #[test]
    fn test_sanitized_config_empty_key_not_configured() {
        let mut config = Config::default();
        config.marvel.private_key = Some(String::new());

        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.marvel.public_key_configured);
        assert!(!sanitized.marvel.private_key_configured);
        assert!(sanitized.account.is_none());
    }
}
