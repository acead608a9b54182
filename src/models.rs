//! Data models for chat rooms and messages
//!
//! `Room` and `Message` are the persisted rows; `NewRoom` and `NewMessage`
//! carry what a caller may supply when creating them. Identifiers and the
//! message creation date are always assigned by the store.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status a room gets when none is given
pub const DEFAULT_ROOM_STATUS: i32 = 0;

/// Maximum length, in characters, of a room name or a message's user name
pub const MAX_NAME_LENGTH: usize = 100;

/// Number of messages returned by the recent-message queries
pub const RECENT_MESSAGE_LIMIT: usize = 30;

/// A named chat channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Database primary key
    pub id: i64,
    /// Unique room name
    pub name: String,
    /// Status code, stored verbatim
    pub status: i32,
}

/// A single chat post belonging to a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Database primary key
    pub id: i64,
    /// Display name of the sender
    pub user: String,
    /// Foreign key to the owning room
    pub room_id: i64,
    /// Message body
    pub content: String,
    /// Date the message was first stored
    pub send_date: NaiveDate,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// Data for creating a new room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    /// Room name, must be unique
    pub name: String,
    /// Status code (optional, defaults to `DEFAULT_ROOM_STATUS`)
    pub status: Option<i32>,
}

impl NewRoom {
    /// A room with the given name and the default status
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
        }
    }

    /// Set an explicit status
    #[must_use]
    pub const fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Status that will be stored
    #[must_use]
    pub fn effective_status(&self) -> i32 {
        self.status.unwrap_or(DEFAULT_ROOM_STATUS)
    }
}

/// Data for creating a new message
///
/// There is deliberately no date field: `send_date` is stamped by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Display name of the sender
    pub user: String,
    /// Room the message is posted to
    pub room_id: i64,
    /// Message body
    pub content: String,
}

impl NewMessage {
    /// Build a message for `room_id`
    #[must_use]
    pub fn new(user: impl Into<String>, room_id: i64, content: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            room_id,
            content: content.into(),
        }
    }
}

/// Output format for rendered messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Comma-separated values format
    Csv,
    /// Plain text format
    #[default]
    Txt,
    /// JSON format
    Json,
}

impl OutputFormat {
    /// Get the file extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "txt" => Ok(Self::Txt),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("Invalid format: {other}. Must be one of: txt, csv, json")),
        }
    }
}
