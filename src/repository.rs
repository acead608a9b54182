use chrono::{Local, NaiveDate};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::db::Database;
use crate::error::{is_foreign_key_violation, is_unique_violation, Result, StoreError};
use crate::models::{Message, NewMessage, NewRoom, Room, RECENT_MESSAGE_LIMIT};
use crate::schema::{messages, rooms};

/// Persistence for rooms
#[cfg_attr(test, mockall::automock)]
pub trait RoomRepository: Send + Sync {
    /// Insert a room. Fails with `UniquenessViolation` if the name is taken.
    fn create(&self, room: NewRoom) -> Result<Room>;
    /// Look a room up by primary key
    fn get(&self, room_id: i64) -> Result<Option<Room>>;
    /// Look a room up by its unique name
    fn find_by_name(&self, name: &str) -> Result<Option<Room>>;
    /// Delete a room together with all of its messages, returning how many
    /// messages went with it.
    fn delete(&self, room_id: i64) -> Result<usize>;
}

/// Persistence for messages
#[cfg_attr(test, mockall::automock)]
pub trait MessageRepository: Send + Sync {
    /// Insert a message stamped with today's date. Fails with
    /// `ReferenceNotFound` if the room does not exist.
    fn create(&self, message: NewMessage) -> Result<Message>;
    /// Look a message up by primary key
    fn get(&self, message_id: i64) -> Result<Option<Message>>;
    /// Every message of a room, oldest first
    fn list_for_room(&self, room_id: i64) -> Result<Vec<Message>>;
    /// The most recent messages of a room, oldest first
    fn recent_for_room(&self, room_id: i64) -> Result<Vec<Message>>;
    /// The most recent messages across all rooms, oldest first
    fn recent(&self) -> Result<Vec<Message>>;
}

/// Columns selected for a room, in `map_room` order
fn room_columns() -> String {
    [rooms::ID, rooms::NAME, rooms::STATUS].join(", ")
}

/// Columns selected for a message, in `map_message` order
fn message_columns() -> String {
    [
        messages::ID,
        messages::USER,
        messages::ROOM_ID,
        messages::CONTENT,
        messages::SEND_DATE,
    ]
    .join(", ")
}

/// Map a database row to a Room
fn map_room(row: &Row) -> rusqlite::Result<Room> {
    Ok(Room {
        id: row.get(rooms::ID)?,
        name: row.get(rooms::NAME)?,
        status: row.get(rooms::STATUS)?,
    })
}

/// Map a database row to a Message
fn map_message(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(messages::ID)?,
        user: row.get(messages::USER)?,
        room_id: row.get(messages::ROOM_ID)?,
        content: row.get(messages::CONTENT)?,
        send_date: row.get(messages::SEND_DATE)?,
    })
}

/// SQLite-backed room repository
#[derive(Clone)]
pub struct SqliteRoomRepository {
    database: Database,
}

impl SqliteRoomRepository {
    /// Create a repository over a shared database handle
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    fn query_one(&self, column: &str, value: &dyn rusqlite::ToSql) -> Result<Option<Room>> {
        let conn = self.database.get_connection()?;

        let room = conn
            .query_row(
                &format!("SELECT {} FROM {} WHERE {} = ?", room_columns(), rooms::TABLE, column),
                params![value],
                map_room,
            )
            .optional()?;

        Ok(room)
    }
}

impl RoomRepository for SqliteRoomRepository {
    fn create(&self, room: NewRoom) -> Result<Room> {
        let conn = self.database.get_connection()?;
        let status = room.effective_status();

        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}) VALUES (?, ?)",
                rooms::TABLE,
                rooms::NAME,
                rooms::STATUS
            ),
            params![room.name, status],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::UniquenessViolation {
                    field: rooms::NAME,
                    value: room.name,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        debug!(room_id = id, name = %room.name, status, "Inserted room");

        Ok(Room {
            id,
            name: room.name,
            status,
        })
    }

    fn get(&self, room_id: i64) -> Result<Option<Room>> {
        self.query_one(rooms::ID, &room_id)
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Room>> {
        self.query_one(rooms::NAME, &name)
    }

    fn delete(&self, room_id: i64) -> Result<usize> {
        self.database.with_transaction(|tx| {
            // Children first, so the cascade does not depend on the
            // connection having foreign keys enabled
            let removed = tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?", messages::TABLE, messages::ROOM_ID),
                params![room_id],
            )?;

            let deleted = tx.execute(
                &format!("DELETE FROM {} WHERE {} = ?", rooms::TABLE, rooms::ID),
                params![room_id],
            )?;

            // Returning early drops the transaction, which rolls it back
            if deleted == 0 {
                return Err(StoreError::RoomNotFound(room_id));
            }

            debug!(room_id, removed, "Deleted room");
            Ok(removed)
        })
    }
}

/// SQLite-backed message repository
#[derive(Clone)]
pub struct SqliteMessageRepository {
    database: Database,
}

impl SqliteMessageRepository {
    /// Create a repository over a shared database handle
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Run a message query and collect the rows
    fn query_messages(&self, query: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Message>> {
        let conn = self.database.get_connection()?;

        let mut stmt = conn.prepare(query)?;
        let message_iter = stmt.query_map(params, map_message)?;

        let mut results = Vec::new();
        for message in message_iter {
            results.push(message?);
        }

        Ok(results)
    }

    /// Newest `limit` messages, optionally restricted to one room, returned
    /// oldest first. Ties on `send_date` are broken by insertion order.
    fn recent_messages(&self, room_id: Option<i64>, limit: usize) -> Result<Vec<Message>> {
        let filter = if room_id.is_some() {
            format!("WHERE {} = ?", messages::ROOM_ID)
        } else {
            String::new()
        };

        let query = format!(
            "SELECT {cols} FROM (SELECT {cols} FROM {table} {filter} ORDER BY {date} DESC, {id} DESC LIMIT {limit}) \
             ORDER BY {date} ASC, {id} ASC",
            cols = message_columns(),
            table = messages::TABLE,
            date = messages::SEND_DATE,
            id = messages::ID,
        );

        match room_id {
            Some(room_id) => self.query_messages(&query, &[&room_id]),
            None => self.query_messages(&query, &[]),
        }
    }
}

impl MessageRepository for SqliteMessageRepository {
    fn create(&self, message: NewMessage) -> Result<Message> {
        let conn = self.database.get_connection()?;
        let send_date: NaiveDate = Local::now().date_naive();

        let inserted = conn.execute(
            &format!(
                "INSERT INTO {} ({}, {}, {}, {}) VALUES (?, ?, ?, ?)",
                messages::TABLE,
                messages::USER,
                messages::ROOM_ID,
                messages::CONTENT,
                messages::SEND_DATE
            ),
            params![message.user, message.room_id, message.content, send_date],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(StoreError::ReferenceNotFound {
                    entity: "room",
                    id: message.room_id,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        debug!(message_id = id, room_id = message.room_id, "Inserted message");

        Ok(Message {
            id,
            user: message.user,
            room_id: message.room_id,
            content: message.content,
            send_date,
        })
    }

    fn get(&self, message_id: i64) -> Result<Option<Message>> {
        let conn = self.database.get_connection()?;

        let message = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE {} = ?",
                    message_columns(),
                    messages::TABLE,
                    messages::ID
                ),
                params![message_id],
                map_message,
            )
            .optional()?;

        Ok(message)
    }

    fn list_for_room(&self, room_id: i64) -> Result<Vec<Message>> {
        let query = format!(
            "SELECT {} FROM {} WHERE {} = ? ORDER BY {} ASC, {} ASC",
            message_columns(),
            messages::TABLE,
            messages::ROOM_ID,
            messages::SEND_DATE,
            messages::ID
        );
        self.query_messages(&query, &[&room_id])
    }

    fn recent_for_room(&self, room_id: i64) -> Result<Vec<Message>> {
        self.recent_messages(Some(room_id), RECENT_MESSAGE_LIMIT)
    }

    fn recent(&self) -> Result<Vec<Message>> {
        self.recent_messages(None, RECENT_MESSAGE_LIMIT)
    }
}
