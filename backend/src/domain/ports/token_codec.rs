//! Port for issuing and decoding signed identity tokens.
use crate::domain::IdentityPayload;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenError {
        /// The token is malformed, expired or carries a bad signature.
        InvalidToken { message: String } => "token rejected: {message}"; permanent,
        /// The codec could not sign a token.
        Signing { message: String } => "token signing failed: {message}"; permanent,
    }
}

/// Signs identity payloads into opaque tokens and reverses the process.
///
/// Token handling is CPU-bound, so the trait is synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn issue(&self, payload: &IdentityPayload) -> Result<String, TokenError>;

    fn decode(&self, token: &str) -> Result<IdentityPayload, TokenError>;
}
