//! Cache keys for the two cached post resources.
//!
//! Only the full listing (`posts`) and individual posts (`post:{id}`) are ever
//! cached. Keys for anything else cannot be constructed through the domain
//! constructors; [`CacheKey::new`] exists for adapters and tests that need to
//! rebuild a key from raw text.
use thiserror::Error;

use crate::domain::PostId;

const POSTS_KEY: &str = "posts";
const POST_KEY_PREFIX: &str = "post:";

/// Key addressing a cached post resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key holding the serialised post listing.
    pub fn posts() -> Self {
        Self(POSTS_KEY.to_owned())
    }

    /// Key holding a single serialised post.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::PostId;
    /// use social_backend::domain::ports::CacheKey;
    ///
    /// let id = PostId::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert_eq!(CacheKey::post(&id).as_str(), "post:3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn post(id: &PostId) -> Self {
        Self(format!("{POST_KEY_PREFIX}{id}"))
    }

    /// Rebuild a key from raw text after validating it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}
