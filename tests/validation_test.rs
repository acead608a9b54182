//! Unit tests for validation.rs module

use proptest::prelude::*;

use chat_store::error::StoreError;
use chat_store::models::{NewMessage, NewRoom};
use chat_store::validation::InputValidator;

#[test]
fn test_validate_room_name_valid() {
    assert!(InputValidator::validate_room_name("general").is_ok());
}

#[test]
fn test_validate_room_name_empty() {
    assert!(InputValidator::validate_room_name("").is_err());
}

#[test]
fn test_validate_room_name_whitespace_only() {
    assert!(InputValidator::validate_room_name("   ").is_err());
}

#[test]
fn test_validate_room_name_too_long() {
    let long_name = "a".repeat(101);
    assert!(matches!(
        InputValidator::validate_room_name(&long_name),
        Err(StoreError::Validation(_))
    ));
}

#[test]
fn test_validate_room_name_exactly_100_chars() {
    let name = "a".repeat(100);
    assert!(InputValidator::validate_room_name(&name).is_ok());
}

#[test]
fn test_validate_user_counts_characters_not_bytes() {
    // 100 two-byte characters
    let name = "é".repeat(100);
    assert!(InputValidator::validate_user(&name).is_ok());
    assert!(InputValidator::validate_user(&format!("{name}é")).is_err());
}

#[test]
fn test_validate_user_with_null_byte() {
    assert!(InputValidator::validate_user("John\0Doe").is_err());
}

#[test]
fn test_validate_user_with_newline() {
    assert!(InputValidator::validate_user("John\nDoe").is_err());
}

#[test]
fn test_validate_user_with_carriage_return() {
    assert!(InputValidator::validate_user("John\rDoe").is_err());
}

#[test]
fn test_validate_user_with_special_chars() {
    assert!(InputValidator::validate_user("O'Brien-Smith").is_ok());
}

#[test]
fn test_validate_new_message_ignores_content() {
    let message = NewMessage::new("alice", 1, "\n\0".repeat(50_000));
    assert!(InputValidator::validate_new_message(&message).is_ok());
}

#[test]
fn test_validate_new_room() {
    assert!(InputValidator::validate_new_room(&NewRoom::new("lobby").with_status(-1)).is_ok());
    assert!(InputValidator::validate_new_room(&NewRoom::new("")).is_err());
}

#[test]
fn test_validate_database_url() {
    assert!(InputValidator::validate_database_url("sqlite:data/chat.db").is_ok());
    assert!(InputValidator::validate_database_url("sqlite:///tmp/chat.db").is_ok());
    assert!(InputValidator::validate_database_url(":memory:").is_ok());
    assert!(InputValidator::validate_database_url("mysql://localhost/chat").is_err());
    assert!(InputValidator::validate_database_url("").is_err());
}

proptest! {
    #[test]
    fn prop_names_up_to_limit_are_accepted(name in "[a-zA-Z0-9 _-]{0,99}[a-zA-Z0-9]") {
        prop_assert!(InputValidator::validate_room_name(&name).is_ok());
        prop_assert!(InputValidator::validate_user(&name).is_ok());
    }

    #[test]
    fn prop_names_over_limit_are_rejected(name in "[a-z]{101,300}") {
        prop_assert!(InputValidator::validate_room_name(&name).is_err());
        prop_assert!(InputValidator::validate_user(&name).is_err());
    }
}
