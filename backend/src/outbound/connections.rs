//! Opens and closes the process-wide database and cache connections.
//!
//! [`Connections::open`] fails fast: both backends must answer a ping before
//! any repository is handed out.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::config::Settings;
use crate::domain::ports::PostCacheError;
use crate::domain::{SocialRepository, TokenAuthenticator};
use crate::outbound::cache::{CacheConfig, RedisPostCache};
use crate::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig, PoolError};
use crate::outbound::security::{Argon2PasswordHasher, JwtTokenCodec};

/// Repository wired to the production adapters.
pub type LiveRepository = SocialRepository<DieselDocumentStore, RedisPostCache, Argon2PasswordHasher>;

/// Authenticator wired to the production adapters.
pub type LiveAuthenticator = TokenAuthenticator<JwtTokenCodec, DieselDocumentStore>;

/// Failures while establishing connections.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("database unavailable: {0}")]
    Database(#[from] PoolError),
    #[error("cache unavailable: {0}")]
    Cache(#[from] PostCacheError),
    #[error("SOCIAL_JWT_SECRET is not set")]
    MissingJwtSecret,
}

/// Live database and cache handles.
pub struct Connections {
    pool: DbPool,
    store: Arc<DieselDocumentStore>,
    cache: Arc<RedisPostCache>,
}

impl Connections {
    /// Connect to PostgreSQL and Redis and verify both respond.
    pub async fn open(settings: &Settings) -> Result<Self, ConnectionError> {
        let pool_config =
            PoolConfig::new(settings.database_url()).with_max_size(settings.db_max_connections());
        let pool = DbPool::new(pool_config).await?;
        pool.ping().await?;
        info!(max_connections = settings.db_max_connections(), "database connected");

        let cache = RedisPostCache::connect(&CacheConfig::new(settings.redis_url())).await?;
        cache.ping().await?;
        info!("cache connected");

        Ok(Self {
            store: Arc::new(DieselDocumentStore::new(pool.clone())),
            pool,
            cache: Arc::new(cache),
        })
    }

    pub fn store(&self) -> Arc<DieselDocumentStore> {
        Arc::clone(&self.store)
    }

    pub fn cache(&self) -> Arc<RedisPostCache> {
        Arc::clone(&self.cache)
    }

    /// Build a repository sharing these connections.
    pub fn repository(&self, settings: &Settings, clock: Arc<dyn Clock>) -> LiveRepository {
        SocialRepository::new(
            self.store(),
            self.cache(),
            Arc::new(Argon2PasswordHasher::new()),
            clock,
        )
        .with_cache_ttl(settings.cache_ttl())
    }

    /// Build a bearer-token authenticator, which needs a configured secret.
    pub fn authenticator(
        &self,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<LiveAuthenticator, ConnectionError> {
        let secret = settings
            .jwt_secret()
            .ok_or(ConnectionError::MissingJwtSecret)?;
        let codec = Arc::new(JwtTokenCodec::new(secret, settings.token_ttl(), clock));
        Ok(TokenAuthenticator::new(codec, self.store()))
    }

    /// Release both pools. Outstanding clones of the store or cache keep
    /// their pool alive until dropped.
    pub fn close(self) {
        let Self { pool, store, cache } = self;
        drop(store);
        drop(cache);
        drop(pool);
        info!("connections closed");
    }
}
