//! Data-access and cache-consistency layer for a social posting backend.
//!
//! - [`domain`]: entities, ports and the [`domain::SocialRepository`] that
//!   keeps the post cache consistent with the document store.
//! - [`outbound`]: PostgreSQL, Redis, Argon2 and JWT adapters.
//! - [`config`]: `SOCIAL_*` runtime settings.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
