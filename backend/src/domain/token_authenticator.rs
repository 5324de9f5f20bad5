//! Bearer-token authenticator.
//!
//! Decodes the token carried in an `Authorization: Bearer <token>` header and
//! confirms the embedded email still belongs to a registered user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{Authenticator, DocumentStore, TokenCodec, TokenError};
use crate::domain::social_repository::map_store_error;
use crate::domain::{AuthenticatedActor, Error, IdentityPayload, bearer_token};

const NOT_AUTHENTICATED: &str = "you are not authenticated";

/// [`Authenticator`] backed by a [`TokenCodec`] and a user lookup.
pub struct TokenAuthenticator<T, S> {
    codec: Arc<T>,
    store: Arc<S>,
}

impl<T, S> Clone for TokenAuthenticator<T, S> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            store: Arc::clone(&self.store),
        }
    }
}

impl<T, S> TokenAuthenticator<T, S>
where
    T: TokenCodec,
{
    pub fn new(codec: Arc<T>, store: Arc<S>) -> Self {
        Self { codec, store }
    }

    /// Sign the payload returned by a successful login.
    pub fn issue_token(&self, payload: &IdentityPayload) -> Result<String, Error> {
        self.codec.issue(payload).map_err(|error| {
            debug!(%error, "token issue failed");
            Error::internal(error.to_string())
        })
    }
}

#[async_trait]
impl<T, S> Authenticator for TokenAuthenticator<T, S>
where
    T: TokenCodec,
    S: DocumentStore,
{
    async fn authenticate(&self, credential: &str) -> Result<AuthenticatedActor, Error> {
        let token =
            bearer_token(credential).ok_or_else(|| Error::unauthenticated(NOT_AUTHENTICATED))?;
        let payload = self.codec.decode(token).map_err(|error| match error {
            TokenError::InvalidToken { .. } => {
                debug!(%error, "bearer token rejected");
                Error::unauthenticated(NOT_AUTHENTICATED)
            }
            other => Error::internal(other.to_string()),
        })?;

        let user = self
            .store
            .find_user_by_email(&payload.email)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::unauthenticated(NOT_AUTHENTICATED))?;

        Ok(AuthenticatedActor {
            id: user.id,
            name: user.name,
        })
    }
}
