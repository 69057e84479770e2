//! Signing keys of the identity-token issuer (JWKS).
//!
//! The remote source keeps the last fetched key set in process and only goes
//! back to the issuer when a token names a `kid` it has not seen, at most once
//! per cooldown window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Error)]
pub enum JwksError {
    #[error("failed to fetch jwks: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("invalid jwks document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no signing key with kid '{0}'")]
    UnknownKid(String),
    #[error("unusable signing key: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),
}

#[async_trait]
pub trait KeySource: Send + Sync {
    // Resolve the verification key for the `kid` found in a token header.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError>;
}

fn find_key(set: &JwkSet, kid: &str) -> Option<Result<DecodingKey, JwksError>> {
    set.find(kid)
        .map(|jwk| DecodingKey::from_jwk(jwk).map_err(JwksError::from))
}

/// A fixed key set (inline configuration, tests).
#[derive(Clone)]
pub struct StaticJwks {
    keys: JwkSet,
}

impl StaticJwks {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }

    pub fn from_json(json: &str) -> Result<Self, JwksError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl KeySource for StaticJwks {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        find_key(&self.keys, kid).unwrap_or_else(|| Err(JwksError::UnknownKid(kid.to_string())))
    }
}

/// Key set fetched from the issuer's `/.well-known/jwks.json`.
pub struct RemoteJwks {
    url: String,
    http: reqwest::Client,
    cache: RwLock<Option<Arc<JwkSet>>>,
    last_fetch: Mutex<Option<Instant>>,
    refetch_cooldown: Duration,
}

impl std::fmt::Debug for RemoteJwks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteJwks")
            .field("url", &self.url)
            .field("refetch_cooldown", &self.refetch_cooldown)
            .finish()
    }
}

impl RemoteJwks {
    pub fn new(url: impl Into<String>) -> Result<Self, JwksError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            url: url.into(),
            http,
            cache: RwLock::new(None),
            last_fetch: Mutex::new(None),
            refetch_cooldown: Duration::from_secs(30),
        })
    }

    /// Minimum gap between two fetches triggered by unknown `kid`s.
    pub fn with_refetch_cooldown(mut self, cooldown: Duration) -> Self {
        self.refetch_cooldown = cooldown;
        self
    }

    async fn cached(&self, kid: &str) -> Option<Result<DecodingKey, JwksError>> {
        let cache = self.cache.read().await;
        cache.as_deref().and_then(|set| find_key(set, kid))
    }

    async fn fetch(&self) -> Result<JwkSet, JwksError> {
        tracing::info!(url = %self.url, "fetching jwks");
        let set = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        Ok(set)
    }
}

#[async_trait]
impl KeySource for RemoteJwks {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, JwksError> {
        if let Some(found) = self.cached(kid).await {
            return found;
        }

        // One fetch at a time; whoever waited here re-checks the cache first.
        let mut last_fetch = self.last_fetch.lock().await;
        if let Some(found) = self.cached(kid).await {
            return found;
        }
        if let Some(at) = *last_fetch
            && at.elapsed() < self.refetch_cooldown
        {
            return Err(JwksError::UnknownKid(kid.to_string()));
        }

        let set = self.fetch().await;
        *last_fetch = Some(Instant::now());
        let set = Arc::new(set?);
        *self.cache.write().await = Some(set.clone());

        find_key(&set, kid).unwrap_or_else(|| Err(JwksError::UnknownKid(kid.to_string())))
    }
}
