//! Chat Store - Persistent Chat Rooms and Messages
//!
//! A Rust library for storing chat rooms and the messages posted in them in
//! an embedded SQLite database, behind explicit repository objects.
//!
//! # Features
//!
//! - Rooms with unique names and a free-form status code
//! - Messages owned by a room, deleted together with it
//! - Automatic creation date on every message
//! - Retrieval of the most recent messages of a room
//! - Export to TXT, CSV and JSON

/// Configuration management
pub mod config;
/// Database connections, pooling and migrations
pub mod db;
/// Error types
pub mod error;
/// Message rendering
pub mod export;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Repository pattern for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Validating service over the repositories
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{Result, StoreError};
pub use models::{Message, NewMessage, NewRoom, OutputFormat, Room};
pub use repository::{MessageRepository, RoomRepository, SqliteMessageRepository, SqliteRoomRepository};
pub use service::ChatService;
