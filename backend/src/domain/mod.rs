//! Domain primitives, aggregates and the repository core.
//!
//! Purpose: Define strongly typed domain entities used by callers and
//! persistence adapters, and the `SocialRepository` that keeps the post cache
//! consistent with the document store. Keep types immutable and document
//! invariants and serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: tagged failure returned by every operation.
//! - User, Post, Follow and their insertion drafts.
//! - SocialRepository / Written: domain operations and write results.
//! - TokenAuthenticator: bearer-token `Authenticator` implementation.

pub mod auth;
pub mod error;
pub mod follow;
pub mod identity;
pub mod ports;
pub mod post;
pub mod social_repository;
pub mod token_authenticator;
pub mod user;

pub use self::auth::{
    AuthenticatedActor, IdentityPayload, LoginCredentials, LoginValidationError, bearer_token,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::follow::{Follow, NewFollow};
pub use self::identity::{FollowId, IdentityError, PostId, UserId};
pub use self::post::{Comment, Like, NewPost, Post, PostDraft, PostValidationError, PostWithAuthor};
pub use self::social_repository::{DEFAULT_CACHE_TTL, SocialRepository, Written};
pub use self::token_authenticator::TokenAuthenticator;
pub use self::user::{
    NewUser, PasswordDigest, Registration, User, UserRecord, UserValidationError,
    validate_username,
};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use social_backend::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("post 1 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
