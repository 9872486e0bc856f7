//! Signing-key lookup for asymmetric access tokens.
//!
//! Keys come from the issuer's `/.well-known/jwks.json`. Callers must check
//! the issuer against the allow-list first; this module fetches whatever
//! issuer URL it is given.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use tokio::sync::RwLock;
use url::Url;

use super::verifier::VerifyError;

const JWKS_PATH: &str = ".well-known/jwks.json";
const DEFAULT_MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Clone)]
struct CachedSet {
    keys: JwkSet,
    fetched_at: Instant,
}

/// JWKS fetcher with a per-issuer cache.
#[derive(Clone)]
pub struct JwksClient {
    http: reqwest::Client,
    cache_ttl: Duration,
    /// Lower bound between two fetches for the same issuer triggered by an unknown `kid`.
    min_refetch_interval: Duration,
    cache: Arc<RwLock<HashMap<String, CachedSet>>>,
}

impl JwksClient {
    pub fn new(cache_ttl: Duration, fetch_timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(fetch_timeout).build()?;
        Ok(Self::with_client(http, cache_ttl))
    }

    pub fn with_client(http: reqwest::Client, cache_ttl: Duration) -> Self {
        Self {
            http,
            cache_ttl,
            min_refetch_interval: DEFAULT_MIN_REFETCH_INTERVAL,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
        self.min_refetch_interval = interval;
        self
    }

    /// Resolve the decoding key for `kid` published by `issuer`.
    ///
    /// An unknown `kid` refetches the set so rotated keys are picked up before
    /// the TTL runs out, but at most once per `min_refetch_interval`. Inside
    /// that window the miss is answered from the cache.
    pub async fn decoding_key(&self, issuer: &str, kid: &str) -> Result<DecodingKey, VerifyError> {
        let cached = match self.cached(issuer).await {
            Some(cached) => cached,
            None => {
                let keys = self.refresh(issuer).await?;
                return find_key(&keys, kid)?
                    .ok_or_else(|| VerifyError::UnknownKey(kid.to_string()));
            }
        };

        if let Some(key) = find_key(&cached.keys, kid)? {
            return Ok(key);
        }
        if cached.fetched_at.elapsed() < self.min_refetch_interval {
            tracing::debug!(issuer, kid, "unknown kid, refetch suppressed");
            return Err(VerifyError::UnknownKey(kid.to_string()));
        }

        let keys = self.refresh(issuer).await?;
        find_key(&keys, kid)?.ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))
    }

    async fn cached(&self, issuer: &str) -> Option<CachedSet> {
        let cache = self.cache.read().await;
        cache
            .get(issuer)
            .filter(|entry| entry.fetched_at.elapsed() < self.cache_ttl)
            .cloned()
    }

    async fn refresh(&self, issuer: &str) -> Result<JwkSet, VerifyError> {
        let url = jwks_url(issuer)?;
        let keys = self.fetch(url).await?;

        let mut cache = self.cache.write().await;
        cache.insert(
            issuer.to_string(),
            CachedSet {
                keys: keys.clone(),
                fetched_at: Instant::now(),
            },
        );

        Ok(keys)
    }

    async fn fetch(&self, url: Url) -> Result<JwkSet, VerifyError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VerifyError::KeyFetch(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| VerifyError::KeyFetch(e.to_string()))
    }
}

fn find_key(keys: &JwkSet, kid: &str) -> Result<Option<DecodingKey>, VerifyError> {
    match keys.find(kid) {
        Some(jwk) => DecodingKey::from_jwk(jwk)
            .map(Some)
            .map_err(|e| VerifyError::KeyFetch(format!("unusable key {kid}: {e}"))),
        None => Ok(None),
    }
}

/// `https://tenant.auth0.com/` -> `https://tenant.auth0.com/.well-known/jwks.json`
pub(crate) fn jwks_url(issuer: &str) -> Result<Url, VerifyError> {
    let mut base = Url::parse(issuer).map_err(|_| VerifyError::InvalidIssuer)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(JWKS_PATH).map_err(|_| VerifyError::InvalidIssuer)
}
