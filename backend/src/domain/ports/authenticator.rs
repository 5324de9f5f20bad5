//! Driving port resolving the caller behind a credential.
//!
//! Inbound adapters (GraphQL context builders, HTTP extractors) hand over the
//! raw `Authorization` header value and receive the actor identity, without
//! knowing how tokens are verified or where users live.

use async_trait::async_trait;

use crate::domain::{AuthenticatedActor, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve the actor for `credential`, or fail with `Unauthenticated`.
    async fn authenticate(&self, credential: &str) -> Result<AuthenticatedActor, Error>;
}
