//! Social repository: the data-access and cache-consistency core.
//!
//! Reads go through the post cache (`posts`, `post:{id}`) and fall back to
//! the document store on a miss, populating the cache afterwards. Writes go
//! to the store first; once committed, every cache key the write could have
//! changed is deleted before the operation returns, so the caller's next read
//! is a guaranteed miss.
//!
//! The cache is never allowed to fail a read. A failed invalidation does not
//! fail the write either; it is reported as a [`ErrorCode::CacheInvalidationFailed`]
//! warning on the [`Written`] result.
//!
//! [`ErrorCode::CacheInvalidationFailed`]: crate::domain::ErrorCode::CacheInvalidationFailed

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::domain::ports::{
    CacheKey, DocumentStore, DocumentStoreError, PasswordHasher, PasswordHasherError, PostCache,
};
use crate::domain::{
    Comment, Error, Follow, IdentityError, IdentityPayload, Like, LoginCredentials, NewFollow,
    NewUser, PasswordDigest, Post, PostDraft, PostId, PostWithAuthor, Registration, User, UserId,
};

/// Default lifetime of cached post reads.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Hashed once per repository and verified against when a login names an
/// unknown user, so both failure paths pay for a digest verification.
const DECOY_PASSWORD: &str = "social-backend-decoy-password";

/// Result of a write that succeeded in the store.
///
/// `warning` is set when the write committed but the cache could not be
/// invalidated; readers may then observe stale data until the TTL lapses.
#[derive(Debug, Clone, PartialEq)]
pub struct Written<T> {
    pub value: T,
    pub warning: Option<Error>,
}

impl<T> Written<T> {
    /// A write whose cache invalidation succeeded.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Translate a store failure into a domain error.
///
/// Unreachable stores become `StoreUnavailable`; unique violations keep the
/// violated constraint in the error details.
pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    debug!(%error, transient = error.is_transient(), "document store operation failed");
    match error {
        DocumentStoreError::DuplicateKey { constraint } => {
            let field = unique_field(&constraint);
            Error::duplicate_key(format!("a user with this {field} already exists"))
                .with_details(json!({ "constraint": constraint }))
        }
        error if error.is_transient() => Error::store_unavailable(error.to_string()),
        error => Error::internal(error.to_string()),
    }
}

fn unique_field(constraint: &str) -> &str {
    if constraint.contains("email") {
        "email"
    } else if constraint.contains("username") {
        "username"
    } else {
        "identity"
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    debug!(%error, "password hasher failed");
    Error::internal(error.to_string())
}

fn map_identity_error(error: IdentityError) -> Error {
    Error::invalid_id(error.to_string())
}

/// Coordinates the document store and the post cache.
pub struct SocialRepository<S, C, H> {
    store: Arc<S>,
    cache: Arc<C>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
    cache_ttl: Duration,
    decoy_digest: Arc<OnceCell<PasswordDigest>>,
}

impl<S, C, H> Clone for SocialRepository<S, C, H> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cache: Arc::clone(&self.cache),
            hasher: Arc::clone(&self.hasher),
            clock: Arc::clone(&self.clock),
            cache_ttl: self.cache_ttl,
            decoy_digest: Arc::clone(&self.decoy_digest),
        }
    }
}

impl<S, C, H> SocialRepository<S, C, H> {
    /// Build a repository over injected store, cache and hasher handles.
    pub fn new(store: Arc<S>, cache: Arc<C>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            cache,
            hasher,
            clock,
            cache_ttl: DEFAULT_CACHE_TTL,
            decoy_digest: Arc::new(OnceCell::new()),
        }
    }

    /// Override how long cached reads live.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }
}

impl<S, C, H> SocialRepository<S, C, H>
where
    S: DocumentStore,
    C: PostCache,
    H: PasswordHasher,
{
    /// Every post with its author, served from `posts` when cached.
    pub async fn get_posts(&self) -> Result<Vec<PostWithAuthor>, Error> {
        let key = CacheKey::posts();
        if let Some(posts) = self.read_cached(&key).await {
            return Ok(posts);
        }

        let posts = self
            .store
            .list_posts_with_author()
            .await
            .map_err(map_store_error)?;
        self.populate(&key, &posts).await;
        Ok(posts)
    }

    /// A single post, served from `post:{id}` when cached.
    ///
    /// Malformed ids fail with `InvalidId` before either backend is touched.
    pub async fn get_post_by_id(&self, post_id: &str) -> Result<Post, Error> {
        let id = PostId::parse(post_id).map_err(map_identity_error)?;
        let key = CacheKey::post(&id);
        if let Some(post) = self.read_cached(&key).await {
            return Ok(post);
        }

        let post = self.load_post(&id).await?;
        self.populate(&key, &post).await;
        Ok(post)
    }

    /// Publish a post authored by `author_id`.
    #[tracing::instrument(skip_all, fields(author_id = %author_id))]
    pub async fn create_post(
        &self,
        author_id: &UserId,
        content: &str,
        tags: Option<Vec<String>>,
        img_url: Option<String>,
    ) -> Result<Written<Post>, Error> {
        let draft = PostDraft::try_new(content, tags, img_url)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let new_post = draft.into_new_post(*author_id, self.clock.utc());

        let id = self
            .store
            .insert_post(&new_post)
            .await
            .map_err(map_store_error)?;

        let warning = self.invalidate(&[CacheKey::posts()]).await;
        Ok(Written {
            value: new_post.into_post(id),
            warning,
        })
    }

    /// Append a comment by `actor_id` and return the refreshed post.
    #[tracing::instrument(skip_all, fields(post_id = %post_id, actor_id = %actor_id))]
    pub async fn add_comment(
        &self,
        post_id: &str,
        actor_id: &UserId,
        content: &str,
    ) -> Result<Written<Post>, Error> {
        let id = PostId::parse(post_id).map_err(map_identity_error)?;
        if content.trim().is_empty() {
            return Err(Error::invalid_request("comment content must not be empty"));
        }
        let actor = self.resolve_user(actor_id).await?;
        let comment = Comment::new(content, actor.username, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let appended = self
            .store
            .append_comment(&id, &comment)
            .await
            .map_err(map_store_error)?;
        if !appended {
            return Err(post_not_found(&id));
        }

        let warning = self
            .invalidate(&[CacheKey::posts(), CacheKey::post(&id)])
            .await;
        let post = self.load_post(&id).await?;
        Ok(Written {
            value: post,
            warning,
        })
    }

    /// Like a post on behalf of `actor_id`. Repeated likes are no-ops.
    #[tracing::instrument(skip_all, fields(post_id = %post_id, actor_id = %actor_id))]
    pub async fn add_like(&self, post_id: &str, actor_id: &UserId) -> Result<Written<Post>, Error> {
        let id = PostId::parse(post_id).map_err(map_identity_error)?;
        let actor = self.resolve_user(actor_id).await?;
        let like = Like {
            username: actor.username,
            created_at: self.clock.utc(),
        };

        let appended = self
            .store
            .append_like(&id, &like)
            .await
            .map_err(map_store_error)?;
        if !appended {
            debug!(post_id = %id, username = %like.username, "like not appended");
        }

        let warning = self
            .invalidate(&[CacheKey::posts(), CacheKey::post(&id)])
            .await;
        let post = self.load_post(&id).await?;
        Ok(Written {
            value: post,
            warning,
        })
    }

    /// Record that `follower_id` follows `following_id`.
    ///
    /// Repeated follows store repeated edges.
    #[tracing::instrument(skip_all, fields(follower_id = %follower_id, following_id = %following_id))]
    pub async fn follow_user(
        &self,
        follower_id: &UserId,
        following_id: &str,
    ) -> Result<Follow, Error> {
        let following_id = UserId::parse(following_id).map_err(map_identity_error)?;
        self.resolve_user(&following_id).await?;

        let follow = NewFollow {
            follower_id: *follower_id,
            following_id,
            created_at: self.clock.utc(),
        };
        self.store
            .insert_follow(&follow)
            .await
            .map_err(map_store_error)
    }

    /// Edges pointing at `user_id`.
    pub async fn get_followers(&self, user_id: &str) -> Result<Vec<Follow>, Error> {
        let user_id = UserId::parse(user_id).map_err(map_identity_error)?;
        self.store
            .find_followers(&user_id)
            .await
            .map_err(map_store_error)
    }

    /// Edges leaving `user_id`.
    pub async fn get_following(&self, user_id: &str) -> Result<Vec<Follow>, Error> {
        let user_id = UserId::parse(user_id).map_err(map_identity_error)?;
        self.store
            .find_following(&user_id)
            .await
            .map_err(map_store_error)
    }

    /// Create an account. The password is stored only as a digest.
    #[tracing::instrument(skip_all, fields(username = %username))]
    pub async fn register_user(
        &self,
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, Error> {
        let registration = Registration::try_from_parts(name, username, email, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let digest = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;
        let new_user = NewUser::from_registration(&registration, digest, self.clock.utc());

        let id = self
            .store
            .insert_user(&new_user)
            .await
            .map_err(map_store_error)?;
        Ok(new_user.into_user(id))
    }

    /// Check credentials and return the payload to sign into a token.
    ///
    /// Unknown usernames and wrong passwords fail identically.
    #[tracing::instrument(skip_all, fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IdentityPayload, Error> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let Some(record) = self
            .store
            .find_user_by_username(credentials.username())
            .await
            .map_err(map_store_error)?
        else {
            self.verify_decoy(credentials.password()).await;
            return Err(Error::invalid_credentials());
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &record.password_digest)
            .await
            .map_err(map_hasher_error)?;
        if !verified {
            return Err(Error::invalid_credentials());
        }

        Ok(IdentityPayload {
            id: record.user.id,
            email: record.user.email,
        })
    }

    /// Users whose username matches exactly, without password digests.
    pub async fn search_users(&self, username: &str) -> Result<Vec<User>, Error> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::invalid_request("username must not be empty"));
        }
        self.store
            .find_user_by_username(username)
            .await
            .map_err(map_store_error)?
            .map(|record| vec![record.user])
            .ok_or_else(|| Error::not_found(format!("user {username} not found")))
    }

    /// Look a user up by email, normalised the way registration stores it.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        self.store
            .find_user_by_email(&email.trim().to_lowercase())
            .await
            .map_err(map_store_error)
    }

    async fn verify_decoy(&self, password: &str) {
        let digest = self
            .decoy_digest
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
            .await;
        let outcome = match digest {
            Ok(digest) => self.hasher.verify(password, digest).await.map(|_| ()),
            Err(error) => Err(error),
        };
        if let Err(error) = outcome {
            debug!(%error, "decoy password verification failed");
        }
    }

    async fn resolve_user(&self, id: &UserId) -> Result<User, Error> {
        self.store
            .find_user_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }

    async fn load_post(&self, id: &PostId) -> Result<Post, Error> {
        self.store
            .find_post_by_id(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| post_not_found(id))
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(key = %key, %error, "post cache read failed; falling back to store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(key = %key, %error, "discarding undecodable post cache entry");
                None
            }
        }
    }

    async fn populate<T: Serialize + Sync>(&self, key: &CacheKey, value: &T) {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(key = %key, %error, "failed to encode post cache entry");
                return;
            }
        };
        if let Err(error) = self.cache.set(key, &payload, self.cache_ttl).await {
            warn!(key = %key, %error, "post cache populate failed");
        }
    }

    async fn invalidate(&self, keys: &[CacheKey]) -> Option<Error> {
        let mut failed = Vec::new();
        for key in keys {
            if let Err(error) = self.cache.delete(key).await {
                warn!(key = %key, %error, "post cache invalidation failed");
                failed.push(key.to_string());
            }
        }
        if failed.is_empty() {
            return None;
        }
        Some(
            Error::cache_invalidation_failed(format!(
                "write committed but cache keys could not be invalidated: {}",
                failed.join(", ")
            ))
            .with_details(json!({ "keys": failed })),
        )
    }
}

fn post_not_found(id: &PostId) -> Error {
    Error::not_found(format!("post {id} not found"))
}

#[cfg(test)]
#[path = "social_repository_tests.rs"]
mod tests;
