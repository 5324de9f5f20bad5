//! Redis-backed `PostCache` using `bb8-redis` connection pooling.
//!
//! Values are stored as plain strings with `SET key value EX ttl`; deletes
//! use `DEL` and succeed whether or not the key existed.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands, RedisError};
use bb8_redis::{RedisConnectionManager, bb8};
use tracing::debug;

use crate::domain::ports::{CacheKey, PostCache, PostCacheError};

/// Connection settings for the Redis pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use social_backend::outbound::cache::CacheConfig;
///
/// let config = CacheConfig::new("redis://127.0.0.1:6379")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(1));
/// assert_eq!(config.redis_url(), "redis://127.0.0.1:6379");
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl CacheConfig {
    /// Defaults: 8 connections, 5 second checkout timeout.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }
}

/// Classify a Redis failure: unreachable servers are backend failures,
/// anything the server answered with is a command failure.
fn map_redis_error(error: RedisError) -> PostCacheError {
    debug!(%error, kind = ?error.kind(), "redis operation failed");
    if error.is_io_error()
        || error.is_timeout()
        || error.is_connection_dropped()
        || error.is_connection_refusal()
    {
        PostCacheError::backend(error.to_string())
    } else {
        PostCacheError::command(error.to_string())
    }
}

fn map_run_error(error: bb8::RunError<RedisError>) -> PostCacheError {
    match error {
        bb8::RunError::User(error) => map_redis_error(error),
        bb8::RunError::TimedOut => PostCacheError::backend("timed out waiting for a connection"),
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

/// Redis implementation of the `PostCache` port.
#[derive(Clone)]
pub struct RedisPostCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisPostCache {
    /// Build the pool. Fails when the URL is invalid or Redis is unreachable.
    pub async fn connect(config: &CacheConfig) -> Result<Self, PostCacheError> {
        let manager = RedisConnectionManager::new(config.redis_url()).map_err(map_redis_error)?;
        let pool = bb8::Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { pool })
    }

    /// Issue `PING` to prove the server answers.
    pub async fn ping(&self) -> Result<(), PostCacheError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        let _: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }
}

#[async_trait]
impl PostCache for RedisPostCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PostCacheError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        conn.get::<_, Option<String>>(key.as_str())
            .await
            .map_err(map_redis_error)
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), PostCacheError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        let _: () = conn
            .set_ex(key.as_str(), value, ttl_seconds(ttl))
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<(), PostCacheError> {
        let mut conn = self.pool.get().await.map_err(map_run_error)?;
        let removed: usize = conn.del(key.as_str()).await.map_err(map_redis_error)?;
        debug!(key = %key, removed, "post cache entry invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn cache_config_defaults() {
        let config = CacheConfig::new("redis://localhost");
        assert_eq!(config.max_size, 8);
        assert_eq!(config.connection_timeout, Duration::from_secs(5));
    }

    #[rstest]
    fn unreachable_server_is_backend_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let mapped = map_redis_error(RedisError::from(io));
        assert!(mapped.is_transient());
    }

    #[rstest]
    fn server_rejection_is_command_failure() {
        let error = RedisError::from((redis::ErrorKind::UnexpectedReturnType, "WRONGTYPE"));
        let mapped = map_redis_error(error);
        assert!(matches!(mapped, PostCacheError::Command { .. }));
    }

    #[rstest]
    fn pool_timeout_is_backend_failure() {
        let mapped = map_run_error(bb8::RunError::TimedOut);
        assert!(mapped.is_transient());
    }

    #[rstest]
    #[case(Duration::from_secs(3600), 3600)]
    #[case(Duration::from_millis(200), 1)]
    fn ttl_is_whole_seconds_and_never_zero(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(ttl_seconds(ttl), expected);
    }
}
