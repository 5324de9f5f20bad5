//! Port for the key/value side-cache holding serialised post reads.
//!
//! Values are opaque JSON strings; the repository owns encoding and decoding
//! so adapters stay ignorant of the post model. The cache is never
//! authoritative: every entry may vanish at any time.

use std::time::Duration;

use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by post cache adapters.
    pub enum PostCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "post cache backend failure: {message}"; transient,
        /// The backend answered but rejected the command.
        Command { message: String } => "post cache command failed: {message}"; permanent,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCache: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PostCacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), PostCacheError>;

    /// Remove `key`. Deleting an absent key succeeds.
    async fn delete(&self, key: &CacheKey) -> Result<(), PostCacheError>;
}
