/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, CORS 許可, Auth0 の信頼設定など)
 * - 設定値のバリデーション (不足・不正なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::services::auth::TrustConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()))
    }

    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Transport-level knobs consumed by `middleware::http`.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
}

pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub run_migrations: bool,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,
    pub http: HttpLimits,

    pub trust: TrustConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parse_or("PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;
        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;
        let run_migrations = parse_or("RUN_MIGRATIONS", false)?;

        let app_env = AppEnv::from_env();
        let cors_allowed_origins =
            split_list(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default());

        let http = HttpLimits {
            request_timeout: Duration::from_secs(parse_or("HTTP_REQUEST_TIMEOUT_SECONDS", 30)?),
            body_limit_bytes: parse_or("HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?,
        };

        Ok(Self {
            addr,
            database_url,
            database_max_connections,
            run_migrations,
            app_env,
            cors_allowed_origins,
            http,
            trust: trust_from_env()?,
        })
    }
}

fn trust_from_env() -> Result<TrustConfig, ConfigError> {
    let authorized_issuers = std::env::var("AUTH0_AUTHORIZED_ISSUERS")
        .map(|v| split_list(&v))
        .map_err(|_| ConfigError::Missing("AUTH0_AUTHORIZED_ISSUERS"))?;
    if authorized_issuers.is_empty() {
        return Err(ConfigError::Invalid("AUTH0_AUTHORIZED_ISSUERS"));
    }

    let api_identifier = std::env::var("AUTH0_API_IDENTIFIER")
        .map_err(|_| ConfigError::Missing("AUTH0_API_IDENTIFIER"))?;
    if api_identifier.trim().is_empty() {
        return Err(ConfigError::Invalid("AUTH0_API_IDENTIFIER"));
    }

    let supported_algs = parse_algs(
        &std::env::var("AUTH0_SUPPORTED_ALGS").unwrap_or_else(|_| "RS256".to_string()),
    )?;

    let mut trust = TrustConfig::new(authorized_issuers, api_identifier, supported_algs);
    trust.leeway_seconds = parse_or("ACCESS_TOKEN_LEEWAY_SECONDS", trust.leeway_seconds)?;
    trust.verify_timeout = Duration::from_millis(parse_or("AUTH_VERIFY_TIMEOUT_MS", 5000)?);
    trust.jwks_cache_ttl = Duration::from_secs(parse_or("JWKS_CACHE_TTL_SECONDS", 600)?);
    trust.jwks_min_refetch_interval =
        Duration::from_secs(parse_or("JWKS_MIN_REFETCH_SECONDS", 30)?);

    // Empty string is the same as unset
    match std::env::var("AUTH0_CLIENT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(trust.with_client_secret(secret)),
        _ => Ok(trust),
    }
}

/// Reads `key`; unset falls back to `default`, set-but-unparseable is an error.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn parse_algs(raw: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algs = split_list(raw)
        .iter()
        .map(|name| Algorithm::from_str(name))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::Invalid("AUTH0_SUPPORTED_ALGS"))?;

    if algs.is_empty() {
        return Err(ConfigError::Invalid("AUTH0_SUPPORTED_ALGS"));
    }
    Ok(algs)
}
