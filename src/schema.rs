//! Database schema definitions
//!
//! Constants for table and column names used to build rusqlite statements.
//! The DDL itself lives in `migrations/`.

/// Rooms table schema
pub mod rooms {
    /// Table name
    pub const TABLE: &str = "rooms";
    /// Primary key column
    pub const ID: &str = "id";
    /// Unique room name column
    pub const NAME: &str = "name";
    /// Status code column
    pub const STATUS: &str = "status";
}

/// Messages table schema
pub mod messages {
    /// Table name
    pub const TABLE: &str = "messages";
    /// Primary key column
    pub const ID: &str = "id";
    /// Sender display name column
    pub const USER: &str = "user";
    /// Foreign key to rooms table
    pub const ROOM_ID: &str = "room_id";
    /// Message body column
    pub const CONTENT: &str = "content";
    /// Creation date column
    pub const SEND_DATE: &str = "send_date";
}
