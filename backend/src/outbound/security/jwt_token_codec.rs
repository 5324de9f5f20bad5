//! HS256 JWT implementation of the `TokenCodec` port.
//!
//! `jsonwebtoken` checks the signature and claim shape only. Expiry is checked
//! against the injected clock so tests control time.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenCodec, TokenError};
use crate::domain::{IdentityPayload, UserId};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs identity payloads with a shared secret.
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenCodec {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_owned(), "sub".to_owned()]);
        validation
    }

    fn ttl_seconds(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, payload: &IdentityPayload) -> Result<String, TokenError> {
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            sub: payload.id.to_string(),
            email: payload.email.clone(),
            iat,
            exp: iat.saturating_add(self.ttl_seconds()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn decode(&self, token: &str) -> Result<IdentityPayload, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Self::validation())
            .map_err(|err| TokenError::invalid_token(err.to_string()))?;
        let claims = data.claims;

        if claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::invalid_token("token expired"));
        }
        let id = UserId::parse(&claims.sub)
            .map_err(|err| TokenError::invalid_token(err.to_string()))?;

        Ok(IdentityPayload {
            id,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock::new(now))
    }

    fn payload() -> IdentityPayload {
        IdentityPayload {
            id: UserId::random(),
            email: "ada@example.com".into(),
        }
    }

    fn codec(secret: &str, clock: Arc<MutableClock>) -> JwtTokenCodec {
        JwtTokenCodec::new(secret, Duration::from_secs(60), clock)
    }

    #[rstest]
    fn issued_token_decodes_to_payload(clock: Arc<MutableClock>) {
        let codec = codec("secret", clock);
        let expected = payload();
        let token = codec.issue(&expected).expect("issue");
        assert_eq!(codec.decode(&token).expect("decode"), expected);
    }

    #[rstest]
    fn token_expires_after_ttl(clock: Arc<MutableClock>) {
        let codec = codec("secret", Arc::clone(&clock));
        let token = codec.issue(&payload()).expect("issue");

        clock.advance_seconds(61);

        let err = codec.decode(&token).expect_err("expired");
        assert_eq!(err, TokenError::invalid_token("token expired"));
    }

    #[rstest]
    fn foreign_signature_is_rejected(clock: Arc<MutableClock>) {
        let token = codec("other", Arc::clone(&clock))
            .issue(&payload())
            .expect("issue");
        let err = codec("secret", clock).decode(&token).expect_err("bad signature");
        assert!(matches!(err, TokenError::InvalidToken { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.jwt")]
    fn garbage_is_rejected(#[case] token: &str, clock: Arc<MutableClock>) {
        let err = codec("secret", clock).decode(token).expect_err("garbage");
        assert!(matches!(err, TokenError::InvalidToken { .. }));
    }
}
