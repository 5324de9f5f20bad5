//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`DocumentStore`, `PostCache`, `PasswordHasher`,
//! `TokenCodec`) describe the infrastructure the repository consumes. Each
//! exposes a typed error generated by `define_port_error!` so adapters map
//! their failures into predictable variants. `Authenticator` is a driving
//! port called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod authenticator;
mod cache_key;
mod document_store;
mod password_hasher;
mod post_cache;
mod token_codec;

#[cfg(test)]
pub use authenticator::MockAuthenticator;
pub use authenticator::Authenticator;
pub use cache_key::{CacheKey, CacheKeyValidationError};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use post_cache::MockPostCache;
pub use post_cache::{PostCache, PostCacheError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{TokenCodec, TokenError};
