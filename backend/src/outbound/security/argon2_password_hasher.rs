//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Digests are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters. Hashing is CPU-bound and runs on the blocking pool.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(plaintext: &str) -> Result<PasswordDigest, PasswordHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| PasswordHasherError::hash(err.to_string()))?
        .to_string();
    Ok(PasswordDigest::new(digest))
}

fn verify_blocking(plaintext: &str, digest: &str) -> Result<bool, PasswordHasherError> {
    let parsed =
        PasswordHash::new(digest).map_err(|err| PasswordHasherError::malformed_digest(err.to_string()))?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHasherError::hash(err.to_string())),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordDigest, PasswordHasherError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&plaintext))
            .await
            .map_err(|err| PasswordHasherError::hash(format!("hashing task failed: {err}")))?
    }

    async fn verify(
        &self,
        plaintext: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHasherError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let digest = digest.as_str().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &digest))
            .await
            .map_err(|err| PasswordHasherError::hash(format!("verification task failed: {err}")))?
    }
}
