//! Server-assigned record identities.
//!
//! Every record kind (user, post, follow edge) is keyed by a UUID assigned by
//! the document store. Identities arrive from callers as strings, so parsing
//! is where malformed ids are rejected with [`IdentityError`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors raised when parsing an identity token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The supplied token was empty.
    #[error("{kind} id must not be empty")]
    Empty { kind: &'static str },
    /// The supplied token is not a UUID.
    #[error("{kind} id `{value}` is not a well-formed identifier")]
    Malformed { kind: &'static str, value: String },
}

macro_rules! uuid_identity {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Uuid);

        impl $name {
            /// Parse an identity from caller-supplied text.
            pub fn parse(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
                let raw = raw.as_ref();
                if raw.is_empty() {
                    return Err(IdentityError::Empty { kind: $kind });
                }
                if raw.trim() != raw {
                    return Err(IdentityError::Malformed {
                        kind: $kind,
                        value: raw.to_owned(),
                    });
                }
                Uuid::parse_str(raw)
                    .map(Self)
                    .map_err(|_| IdentityError::Malformed {
                        kind: $kind,
                        value: raw.to_owned(),
                    })
            }

            /// Generate a fresh identity.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an identity read back from storage.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentityError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }
    };
}

uuid_identity!(
    /// Stable user identifier.
    UserId,
    "user"
);
uuid_identity!(
    /// Stable post identifier.
    PostId,
    "post"
);
uuid_identity!(
    /// Stable follow-edge identifier.
    FollowId,
    "follow"
);
