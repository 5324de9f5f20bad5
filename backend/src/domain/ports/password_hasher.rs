//! Port for one-way password hashing.
use async_trait::async_trait;

use crate::domain::PasswordDigest;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing failed inside the algorithm implementation.
        Hash { message: String } => "password hashing failed: {message}"; permanent,
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}"; permanent,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce an irreversible, salted digest for `plaintext`.
    async fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHasherError>;

    /// Whether `plaintext` matches `digest`. A mismatch is `Ok(false)`.
    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError>;
}
