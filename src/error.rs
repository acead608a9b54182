//! Error types for the chat-store library.
//!
//! Storage failures that carry domain meaning (duplicate room names, dangling
//! room references, missing rooms) get their own variants so callers can match
//! on them instead of inspecting SQLite error codes.

use rusqlite::ffi;
use thiserror::Error;

/// Errors that can occur while reading or writing the chat store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique column already holds the value being inserted
    #[error("Uniqueness violation: {field} '{value}' already exists")]
    UniquenessViolation {
        /// Column that carries the unique constraint
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A foreign key points at a row that does not exist
    #[error("Reference not found: {entity} with id {id} does not exist")]
    ReferenceNotFound {
        /// Referenced entity
        entity: &'static str,
        /// Referenced primary key
        id: i64,
    },

    /// Room not found
    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    /// Input rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Result with `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Short, stable label used for metrics and log fields.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UniquenessViolation { .. } => "uniqueness_violation",
            Self::ReferenceNotFound { .. } => "reference_not_found",
            Self::RoomNotFound(_) => "room_not_found",
            Self::Validation(_) => "validation",
            Self::Database(_) => "database",
            Self::Pool(_) => "pool",
            Self::Migration(_) => "migration",
            Self::Io(_) => "io",
        }
    }
}

/// Extended result code of a failed SQLite constraint, if the error is one.
pub(crate) fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

/// True when the error is a UNIQUE (or PRIMARY KEY) constraint failure.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        constraint_code(err),
        Some(ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
    )
}

/// True when the error is a FOREIGN KEY constraint failure.
pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}
