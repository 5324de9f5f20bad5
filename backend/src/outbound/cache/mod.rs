//! Redis cache adapter for the `PostCache` port.
//!
//! The repository owns key selection, serialisation and TTL choice; this
//! adapter only moves strings in and out of Redis.

mod redis_post_cache;

pub use redis_post_cache::{CacheConfig, RedisPostCache};
