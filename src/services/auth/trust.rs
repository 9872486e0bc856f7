/*
 * Responsibility
 * - アクセストークン検証用のプロセス共通の信頼設定
 * - 起動時 (Config) に一度だけ組み立て、以降は変更しない
 */
use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;

#[derive(Clone)]
pub struct TrustConfig {
    /// Accepted `iss` values. Also the only hosts a JWKS may be fetched from.
    pub authorized_issuers: Vec<String>,
    /// Sole accepted `aud`.
    pub api_identifier: String,
    pub supported_algs: Vec<Algorithm>,
    /// Shared secret for HS* tokens. Asymmetric tokens use the issuer's JWKS.
    pub client_secret: Option<String>,
    pub leeway_seconds: u64,
    pub verify_timeout: Duration,
    pub jwks_cache_ttl: Duration,
    /// Minimum gap between JWKS refetches caused by an unknown `kid`.
    pub jwks_min_refetch_interval: Duration,
}

impl TrustConfig {
    pub fn new(
        authorized_issuers: Vec<String>,
        api_identifier: impl Into<String>,
        supported_algs: Vec<Algorithm>,
    ) -> Self {
        Self {
            authorized_issuers,
            api_identifier: api_identifier.into(),
            supported_algs,
            client_secret: None,
            leeway_seconds: 60,
            verify_timeout: Duration::from_secs(5),
            jwks_cache_ttl: Duration::from_secs(600),
            jwks_min_refetch_interval: Duration::from_secs(30),
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn is_authorized_issuer(&self, iss: &str) -> bool {
        self.authorized_issuers.iter().any(|allowed| allowed == iss)
    }

    pub fn supports(&self, alg: Algorithm) -> bool {
        self.supported_algs.contains(&alg)
    }
}

impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the client secret
        f.debug_struct("TrustConfig")
            .field("authorized_issuers", &self.authorized_issuers)
            .field("api_identifier", &self.api_identifier)
            .field("supported_algs", &self.supported_algs)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("leeway_seconds", &self.leeway_seconds)
            .field("verify_timeout", &self.verify_timeout)
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("jwks_min_refetch_interval", &self.jwks_min_refetch_interval)
            .finish()
    }
}
