//! Validation coverage for registration inputs and user projections.

use super::*;
use rstest::rstest;

#[rstest]
#[case("", "ada", "ada@example.com", "pw", UserValidationError::EmptyName)]
#[case("Ada", "  ", "ada@example.com", "pw", UserValidationError::EmptyUsername)]
#[case("Ada", "ada lovelace", "ada@example.com", "pw", UserValidationError::UsernameInvalidCharacters)]
#[case("Ada", "ada", "not-an-email", "pw", UserValidationError::InvalidEmail)]
#[case("Ada", "ada", "ada@example", "pw", UserValidationError::InvalidEmail)]
#[case("Ada", "ada", "ada@example.com", "", UserValidationError::EmptyPassword)]
fn invalid_registrations_are_rejected(
    #[case] name: &str,
    #[case] username: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: UserValidationError,
) {
    let err = Registration::try_from_parts(name, username, email, password)
        .expect_err("invalid registration must fail");
    assert_eq!(err, expected);
}

#[rstest]
fn overlong_username_is_rejected() {
    let username = "a".repeat(USERNAME_MAX + 1);
    let err = Registration::try_from_parts("Ada", &username, "ada@example.com", "pw")
        .expect_err("overlong username must fail");
    assert_eq!(err, UserValidationError::UsernameTooLong { max: USERNAME_MAX });
}

#[rstest]
fn registration_normalises_inputs() {
    let reg = Registration::try_from_parts("  Ada Lovelace ", " ada.l ", " Ada@Example.COM ", " pw ")
        .expect("valid registration");
    assert_eq!(reg.name(), "Ada Lovelace");
    assert_eq!(reg.username(), "ada.l");
    assert_eq!(reg.email(), "ada@example.com");
    assert_eq!(reg.password(), " pw ");
}

#[rstest]
fn new_user_projection_drops_digest() {
    let reg = Registration::try_from_parts("Ada", "ada", "ada@example.com", "pw")
        .expect("valid registration");
    let new_user = NewUser::from_registration(
        &reg,
        PasswordDigest::new("$argon2id$fake"),
        chrono::Utc::now(),
    );
    let id = UserId::random();
    let user = new_user.into_user(id);

    assert_eq!(user.id, id);
    assert_eq!(user.username, "ada");
    let json = serde_json::to_value(&user).expect("serialise user");
    assert!(json.get("password").is_none());
    assert!(json.get("passwordDigest").is_none());
}

#[rstest]
fn digest_debug_is_redacted() {
    let digest = PasswordDigest::new("$argon2id$secret");
    assert_eq!(format!("{digest:?}"), "PasswordDigest(<redacted>)");
}
