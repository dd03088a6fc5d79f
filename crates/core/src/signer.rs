//! Request signing for the remote character API.
//!
//! Every call carries `ts`, `apikey` and `hash`, where `hash` is the
//! lowercase hex MD5 of `ts + private_key + public_key`.

use chrono::Utc;

use crate::config::MarvelConfig;

/// A timestamp/signature pair for one logical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Milliseconds since the Unix epoch, rendered as a decimal string.
    pub timestamp: String,
    /// Lowercase hex digest.
    pub hash: String,
}

/// Produces signatures from the configured key pair.
#[derive(Clone)]
pub struct RequestSigner {
    public_key: String,
    private_key: String,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// Build a signer from config. Returns `None` when either key is absent or empty.
    pub fn from_config(config: &MarvelConfig) -> Option<Self> {
        let public_key = config.public_key.as_deref().filter(|k| !k.is_empty())?;
        let private_key = config.private_key.as_deref().filter(|k| !k.is_empty())?;
        Some(Self::new(public_key, private_key))
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign with the current wall-clock time.
    pub fn sign(&self) -> Signature {
        self.sign_at(Utc::now().timestamp_millis().to_string())
    }

    /// Sign with an explicit timestamp.
    pub fn sign_at(&self, timestamp: impl Into<String>) -> Signature {
        let timestamp = timestamp.into();
        let input = format!("{}{}{}", timestamp, self.private_key, self.public_key);
        let hash = format!("{:x}", md5::compute(input.as_bytes()));
        Signature { timestamp, hash }
    }

    /// Authentication query parameters for a fresh signature.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let signature = self.sign();
        vec![
            ("ts", signature.timestamp),
            ("apikey", self.public_key.clone()),
            ("hash", signature.hash),
        ]
    }
}
