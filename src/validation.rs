use crate::error::{Result, StoreError};
use crate::models::{NewMessage, NewRoom, MAX_NAME_LENGTH};

/// Validation utilities for input sanitization and edge case handling
#[derive(Debug, Copy, Clone)]
pub struct InputValidator;

impl InputValidator {
    /// Validate a room name
    pub fn validate_room_name(name: &str) -> Result<()> {
        Self::validate_name("Room name", name)
    }

    /// Validate the display name a message is sent under
    pub fn validate_user(user: &str) -> Result<()> {
        Self::validate_name("User name", user)
    }

    /// Validate a room before insertion
    pub fn validate_new_room(room: &NewRoom) -> Result<()> {
        Self::validate_room_name(&room.name)
    }

    /// Validate a message before insertion.
    ///
    /// Content is not checked: message bodies are unbounded free text.
    pub fn validate_new_message(message: &NewMessage) -> Result<()> {
        Self::validate_user(&message.user)
    }

    fn validate_name(label: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(StoreError::Validation(format!("{label} cannot be empty")));
        }

        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(StoreError::Validation(format!(
                "{label} too long (max {MAX_NAME_LENGTH} characters)"
            )));
        }

        // Check for potentially dangerous characters
        if value.contains('\0') || value.contains('\r') || value.contains('\n') {
            return Err(StoreError::Validation(format!("{label} contains invalid characters")));
        }

        Ok(())
    }

    /// Validate database URL
    pub fn validate_database_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(StoreError::Validation("Database URL cannot be empty".to_string()));
        }

        if url.contains("://") && !url.starts_with("sqlite://") {
            return Err(StoreError::Validation("Only SQLite databases are supported".to_string()));
        }

        if url.len() > 1000 {
            return Err(StoreError::Validation("Database URL too long".to_string()));
        }

        Ok(())
    }
}
