//! Tests for the domain error payload and its code mapping.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn not_found_constructor_sets_code() {
    let err = Error::not_found("post missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "post missing");
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn invalid_credentials_message_is_fixed() {
    let err = Error::invalid_credentials();
    assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    assert_eq!(err.to_string(), "invalid credentials");
}

#[rstest]
#[case(ErrorCode::InvalidRequest, 400)]
#[case(ErrorCode::InvalidId, 400)]
#[case(ErrorCode::InvalidCredentials, 401)]
#[case(ErrorCode::Unauthenticated, 401)]
#[case(ErrorCode::NotFound, 404)]
#[case(ErrorCode::DuplicateKey, 409)]
#[case(ErrorCode::StoreUnavailable, 503)]
#[case(ErrorCode::CacheInvalidationFailed, 500)]
#[case(ErrorCode::InternalError, 500)]
fn codes_map_to_http_status(#[case] code: ErrorCode, #[case] status: u16) {
    assert_eq!(code.http_status(), status);
}

#[rstest]
fn serialises_code_in_snake_case_with_details() {
    let err = Error::duplicate_key("username already taken")
        .with_details(json!({ "constraint": "users_username_key" }));
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "duplicate_key",
            "message": "username already taken",
            "details": { "constraint": "users_username_key" }
        })
    );
}

#[rstest]
fn omits_absent_details() {
    let value = serde_json::to_value(Error::store_unavailable("down")).expect("serialise error");
    assert!(value.get("details").is_none());
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result = serde_json::from_value::<Error>(json!({ "code": "not_found", "message": " " }));
    assert!(result.is_err());
}
