/*
 * Responsibility
 * - Read settings from the environment (.env honoured): table name, user pool, client id, store URL
 * - Validate them up front (missing or malformed -> refuse to start)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::repos::ClientPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
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

/// Where notes are persisted, chosen from the scheme of `NOTES_STORE_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres(String),
    Valkey(String),
}

impl StoreBackend {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let parsed =
            url::Url::parse(url).map_err(|_| ConfigError::Invalid("NOTES_STORE_URL"))?;

        match parsed.scheme() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres(url.to_string())),
            "redis" | "rediss" => Ok(Self::Valkey(url.to_string())),
            // the redis client only knows the redis schemes
            "valkey" => Ok(Self::Valkey(url.replacen("valkey://", "redis://", 1))),
            "valkeys" => Ok(Self::Valkey(url.replacen("valkeys://", "rediss://", 1))),
            _ => Err(ConfigError::Invalid("NOTES_STORE_URL")),
        }
    }
}

/// Where the verifier gets the user pool's signing keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwksSourceConfig {
    Remote(String),
    Inline(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub notes_table_name: String,
    pub store_backend: StoreBackend,
    pub store_policy: ClientPolicy,

    pub cognito_client_id: String,
    pub cognito_issuer: String,
    pub jwks_source: JwksSourceConfig,
    pub id_token_leeway_seconds: u64,

    pub authorizer_resource_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source (the process environment in production).
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = var("PORT").and_then(|s| s.parse().ok()).unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let notes_table_name = var("NOTES_TABLE_NAME")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("NOTES_TABLE_NAME"))?;
        if !is_valid_table_name(&notes_table_name) {
            return Err(ConfigError::Invalid("NOTES_TABLE_NAME"));
        }

        let store_backend = match var("NOTES_STORE_URL").filter(|s| !s.trim().is_empty()) {
            Some(url) => StoreBackend::parse(&url)?,
            // a production process must never silently fall back to process memory
            None if app_env.is_production() => {
                return Err(ConfigError::Missing("NOTES_STORE_URL"));
            }
            None => StoreBackend::Memory,
        };

        let store_max_attempts = var("STORE_MAX_ATTEMPTS")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(3);
        let store_timeout_ms = var("STORE_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5_000);
        let store_policy =
            ClientPolicy::new(store_max_attempts, Duration::from_millis(store_timeout_ms));

        let cognito_user_pool_id = var("COGNITO_USER_POOL_ID")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?;
        let cognito_client_id = var("COGNITO_CLIENT_ID")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("COGNITO_CLIENT_ID"))?;

        let cognito_issuer = match var("COGNITO_ISSUER").filter(|s| !s.trim().is_empty()) {
            Some(issuer) => issuer.trim_end_matches('/').to_string(),
            None => {
                let region = region_of_user_pool(&cognito_user_pool_id)
                    .ok_or(ConfigError::Invalid("COGNITO_USER_POOL_ID"))?;
                format!("https://cognito-idp.{region}.amazonaws.com/{cognito_user_pool_id}")
            }
        };

        let jwks_source = match var("COGNITO_JWKS_JSON").filter(|s| !s.trim().is_empty()) {
            Some(json) => JwksSourceConfig::Inline(json),
            None => {
                let url = var("COGNITO_JWKS_URL")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| format!("{cognito_issuer}/.well-known/jwks.json"));
                url::Url::parse(&url).map_err(|_| ConfigError::Invalid("COGNITO_JWKS_URL"))?;
                JwksSourceConfig::Remote(url)
            }
        };

        let id_token_leeway_seconds = var("ID_TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let authorizer_resource_prefix = var("AUTHORIZER_RESOURCE_PREFIX")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "notes-api/v1".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            notes_table_name,
            store_backend,
            store_policy,
            cognito_client_id,
            cognito_issuer,
            jwks_source,
            id_token_leeway_seconds,
            authorizer_resource_prefix,
        })
    }
}

/// User pool ids look like `us-west-2_AbCdEf123`; the part before `_` is the region.
pub fn region_of_user_pool(user_pool_id: &str) -> Option<&str> {
    let (region, rest) = user_pool_id.split_once('_')?;
    let well_formed = !region.is_empty()
        && !rest.is_empty()
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    well_formed.then_some(region)
}

// Used verbatim as a SQL identifier and key prefix.
fn is_valid_table_name(name: &str) -> bool {
    name.len() <= 63 && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
