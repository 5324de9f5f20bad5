//! Runtime settings loaded via OrthoConfig from `SOCIAL_*` variables.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/social";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Connection and credential settings for the data-access layer.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SOCIAL")]
pub struct Settings {
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Redis connection string.
    pub redis_url: Option<String>,
    /// Lifetime of cached post entries.
    #[ortho_config(default = 3600)]
    pub cache_ttl_seconds: u64,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// HMAC secret for identity tokens.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued identity tokens, in seconds.
    #[ortho_config(default = 86_400)]
    pub token_ttl_seconds: u64,
}

impl Settings {
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    pub fn redis_url(&self) -> &str {
        self.redis_url.as_deref().unwrap_or(DEFAULT_REDIS_URL)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    /// The token secret. Unset or empty means tokens cannot be issued.
    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref().filter(|secret| !secret.is_empty())
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_seconds)
    }
}
