//! User data model.
//!
//! A user is created once by registration and never mutated afterwards. Two
//! projections exist: [`User`] is the public view returned by every read path,
//! while [`UserRecord`] additionally carries the password digest and is only
//! ever produced for login.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Validation errors returned when building user inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyUsername,
    UsernameInvalidCharacters,
    UsernameTooLong { max: usize },
    InvalidEmail,
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameInvalidCharacters => write!(
                f,
                "username may only contain letters, numbers, dots, or underscores",
            ),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 32;

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| {
        Regex::new("^[A-Za-z0-9_.]+$")
            .unwrap_or_else(|error| panic!("username regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Validate a username as typed by a caller.
pub fn validate_username(username: &str) -> Result<&str, UserValidationError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::EmptyUsername);
    }
    if trimmed.chars().count() > USERNAME_MAX {
        return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
    }
    if !username_regex().is_match(trimmed) {
        return Err(UserValidationError::UsernameInvalidCharacters);
    }
    Ok(trimmed)
}

/// Public user projection. Never carries the password digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Irreversible password digest as produced by a password hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest string produced by a hasher or read from storage.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Borrow the encoded digest.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Stored user including the password digest, used only by login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: User,
    pub password_digest: PasswordDigest,
}

/// Validated registration input.
///
/// ## Invariants
/// - `name` is trimmed and non-empty.
/// - `username` matches the allowed character set and length.
/// - `email` is shaped like `local@domain.tld` and stored lower-cased.
/// - `password` is non-empty and zeroised on drop.
///
/// # Examples
/// ```
/// use social_backend::domain::Registration;
///
/// let reg = Registration::try_from_parts("Ada", "ada", "Ada@Example.com", "s3cret").unwrap();
/// assert_eq!(reg.email(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    name: String,
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw registration inputs.
    pub fn try_from_parts(
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        let username = validate_username(username)?;
        let email = email.trim();
        if !email_regex().is_match(email) {
            return Err(UserValidationError::InvalidEmail);
        }
        if password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }

        Ok(Self {
            name: name.to_owned(),
            username: username.to_owned(),
            email: email.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Plaintext password, only for handing to a password hasher.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// User ready for insertion; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_digest: PasswordDigest,
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Pair a validated registration with the digest of its password.
    pub fn from_registration(
        registration: &Registration,
        password_digest: PasswordDigest,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: registration.name().to_owned(),
            username: registration.username().to_owned(),
            email: registration.email().to_owned(),
            password_digest,
            created_at,
        }
    }

    /// Public projection once the store has assigned an id.
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
        }
    }
}

#[cfg(test)]
mod tests;
