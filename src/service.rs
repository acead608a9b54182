use tracing::{info, warn};

use crate::db::Database;
use crate::error::Result;
use crate::metrics::{MetricsCollector, MetricsTimer};
use crate::models::{Message, NewMessage, NewRoom, Room};
use crate::repository::{MessageRepository, RoomRepository, SqliteMessageRepository, SqliteRoomRepository};
use crate::validation::InputValidator;

/// Validating front door to the room and message repositories
pub struct ChatService {
    rooms: Box<dyn RoomRepository>,
    messages: Box<dyn MessageRepository>,
    metrics: MetricsCollector,
}

impl ChatService {
    pub fn new(rooms: Box<dyn RoomRepository>, messages: Box<dyn MessageRepository>) -> Self {
        Self {
            rooms,
            messages,
            metrics: MetricsCollector::default(),
        }
    }

    /// Service over the SQLite repositories sharing one database
    pub fn sqlite(database: &Database) -> Self {
        Self::new(
            Box::new(SqliteRoomRepository::new(database.clone())),
            Box::new(SqliteMessageRepository::new(database.clone())),
        )
    }

    /// Time `f`, log a failure and record the outcome under `operation`
    fn observe<T>(&self, operation: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let timer = MetricsTimer::new(&self.metrics, operation);
        let result = f();

        match &result {
            Ok(_) => {
                timer.finish(None);
            }
            Err(e) => {
                warn!(operation, error = %e, "Operation failed");
                timer.finish(Some(e.kind()));
            }
        }

        result
    }

    pub fn create_room(&self, room: NewRoom) -> Result<Room> {
        InputValidator::validate_new_room(&room)?;

        let room = self.observe("create_room", || self.rooms.create(room))?;
        self.metrics.record_room_created();
        info!(room_id = room.id, name = %room.name, status = room.status, "Created room");
        Ok(room)
    }

    /// Delete a room and everything posted in it
    pub fn delete_room(&self, room_id: i64) -> Result<usize> {
        let removed = self.observe("delete_room", || self.rooms.delete(room_id))?;
        self.metrics.record_room_deleted(removed);
        info!(room_id, messages_removed = removed, "Deleted room");
        Ok(removed)
    }

    pub fn get_room(&self, room_id: i64) -> Result<Option<Room>> {
        self.observe("get_room", || self.rooms.get(room_id))
    }

    pub fn find_room(&self, name: &str) -> Result<Option<Room>> {
        self.observe("find_room", || self.rooms.find_by_name(name))
    }

    pub fn post_message(&self, message: NewMessage) -> Result<Message> {
        InputValidator::validate_new_message(&message)?;

        let message = self.observe("post_message", || self.messages.create(message))?;
        self.metrics.record_message_created();
        info!(
            message_id = message.id,
            room_id = message.room_id,
            user = %message.user,
            "Posted message"
        );
        Ok(message)
    }

    pub fn get_message(&self, message_id: i64) -> Result<Option<Message>> {
        self.observe("get_message", || self.messages.get(message_id))
    }

    /// Every message of a room, oldest first
    pub fn room_messages(&self, room_id: i64) -> Result<Vec<Message>> {
        let messages = self.observe("room_messages", || self.messages.list_for_room(room_id))?;
        self.metrics.record_messages_returned("room_messages", messages.len());
        Ok(messages)
    }

    /// The last 30 messages of a room, or of the whole store when `room_id`
    /// is `None`, oldest first
    pub fn recent_messages(&self, room_id: Option<i64>) -> Result<Vec<Message>> {
        let messages = self.observe("recent_messages", || match room_id {
            Some(room_id) => self.messages.recent_for_room(room_id),
            None => self.messages.recent(),
        })?;
        self.metrics.record_messages_returned("recent_messages", messages.len());
        Ok(messages)
    }
}
