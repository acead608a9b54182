use chrono::Local;

use chat_store::db::Database;
use chat_store::error::StoreError;
use chat_store::models::{NewMessage, NewRoom, Room, RECENT_MESSAGE_LIMIT};
use chat_store::repository::{MessageRepository, RoomRepository, SqliteMessageRepository, SqliteRoomRepository};

struct Fixture {
    rooms: SqliteRoomRepository,
    messages: SqliteMessageRepository,
}

impl Fixture {
    fn new() -> Self {
        let db = Database::in_memory().expect("Failed to create database");
        Self {
            rooms: SqliteRoomRepository::new(db.clone()),
            messages: SqliteMessageRepository::new(db),
        }
    }

    fn room(&self, name: &str) -> Room {
        self.rooms.create(NewRoom::new(name)).expect("Failed to create room")
    }

    fn post(&self, room: &Room, count: usize) {
        for i in 0..count {
            self.messages
                .create(NewMessage::new("alice", room.id, format!("{} #{i}", room.name)))
                .expect("Failed to create message");
        }
    }
}

#[test]
fn test_message_for_missing_room_is_rejected() {
    let fixture = Fixture::new();

    let err = fixture
        .messages
        .create(NewMessage::new("alice", 404, "anyone there?"))
        .unwrap_err();

    assert!(matches!(err, StoreError::ReferenceNotFound { entity: "room", id: 404 }));
    assert!(fixture.messages.recent().unwrap().is_empty());
}

#[test]
fn test_message_for_deleted_room_is_rejected() {
    let fixture = Fixture::new();
    let room = fixture.room("gone");
    fixture.rooms.delete(room.id).unwrap();

    let err = fixture.messages.create(NewMessage::new("alice", room.id, "hi")).unwrap_err();
    assert!(matches!(err, StoreError::ReferenceNotFound { .. }));
}

#[test]
fn test_send_date_is_stamped_with_today() {
    let fixture = Fixture::new();
    let room = fixture.room("general");

    let before = Local::now().date_naive();
    let message = fixture
        .messages
        .create(NewMessage::new("alice", room.id, "hello"))
        .expect("Failed to create message");
    let after = Local::now().date_naive();

    assert!(before <= message.send_date && message.send_date <= after);

    let stored = fixture.messages.get(message.id).unwrap().expect("Message missing");
    assert_eq!(stored, message);
}

#[test]
fn test_recent_returns_last_thirty_oldest_first() {
    let fixture = Fixture::new();
    let room = fixture.room("busy");
    fixture.post(&room, 35);

    let recent = fixture.messages.recent_for_room(room.id).expect("Failed to get recent messages");

    assert_eq!(recent.len(), RECENT_MESSAGE_LIMIT);
    let expected: Vec<String> = (5..35).map(|i| format!("busy #{i}")).collect();
    let actual: Vec<String> = recent.iter().map(|m| m.content.clone()).collect();
    assert_eq!(actual, expected);

    // Oldest first
    assert!(recent.windows(2).all(|w| (w[0].send_date, w[0].id) < (w[1].send_date, w[1].id)));
}

#[test]
fn test_recent_with_fewer_messages_returns_all() {
    let fixture = Fixture::new();
    let room = fixture.room("quiet");
    fixture.post(&room, 3);

    let recent = fixture.messages.recent_for_room(room.id).unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].content, "quiet #0");
}

#[test]
fn test_recent_for_room_ignores_other_rooms() {
    let fixture = Fixture::new();
    let first = fixture.room("first");
    let second = fixture.room("second");
    fixture.post(&first, 10);
    fixture.post(&second, 40);
    fixture.post(&first, 2);

    let recent = fixture.messages.recent_for_room(first.id).unwrap();
    assert_eq!(recent.len(), 12);
    assert!(recent.iter().all(|m| m.room_id == first.id));
}

#[test]
fn test_recent_across_rooms() {
    let fixture = Fixture::new();
    let first = fixture.room("first");
    let second = fixture.room("second");
    fixture.post(&first, 20);
    fixture.post(&second, 20);

    let recent = fixture.messages.recent().unwrap();
    assert_eq!(recent.len(), RECENT_MESSAGE_LIMIT);
    assert_eq!(recent.first().unwrap().content, "first #10");
    assert_eq!(recent.last().unwrap().content, "second #19");
}

#[test]
fn test_recent_for_unknown_room_is_empty() {
    let fixture = Fixture::new();
    assert!(fixture.messages.recent_for_room(12).unwrap().is_empty());
}

#[test]
fn test_list_for_room_returns_everything() {
    let fixture = Fixture::new();
    let room = fixture.room("history");
    fixture.post(&room, 45);

    let all = fixture.messages.list_for_room(room.id).unwrap();
    assert_eq!(all.len(), 45);
    assert_eq!(all[0].content, "history #0");
    assert_eq!(all[44].content, "history #44");
}

#[test]
fn test_content_is_unbounded() {
    let fixture = Fixture::new();
    let room = fixture.room("essays");
    let essay = "lorem ipsum ".repeat(20_000);

    let message = fixture
        .messages
        .create(NewMessage::new("alice", room.id, essay.clone()))
        .unwrap();

    let stored = fixture.messages.get(message.id).unwrap().unwrap();
    assert_eq!(stored.content, essay);
    assert_eq!(stored.to_string(), essay);
}
