use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::tempdir;

use chat_store::db::Database;
use chat_store::error::StoreError;
use chat_store::models::{NewMessage, NewRoom};
use chat_store::repository::{MessageRepository, RoomRepository, SqliteMessageRepository, SqliteRoomRepository};

fn repositories(db: &Database) -> (SqliteRoomRepository, SqliteMessageRepository) {
    (SqliteRoomRepository::new(db.clone()), SqliteMessageRepository::new(db.clone()))
}

#[test]
fn test_room_defaults_to_status_zero() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    let room = rooms.create(NewRoom::new("general")).expect("Failed to create room");
    assert_eq!(room.status, 0);

    let stored = rooms.get(room.id).expect("Failed to get room").expect("Room missing");
    assert_eq!(stored.status, 0);
    assert_eq!(stored.name, "general");
}

#[test]
fn test_room_keeps_explicit_status() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    let room = rooms
        .create(NewRoom::new("archive").with_status(7))
        .expect("Failed to create room");

    let stored = rooms.find_by_name("archive").expect("Failed to find room").expect("Room missing");
    assert_eq!(stored.id, room.id);
    assert_eq!(stored.status, 7);
}

#[test]
fn test_duplicate_room_name_is_rejected() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    rooms.create(NewRoom::new("general")).expect("Failed to create room");
    let err = rooms.create(NewRoom::new("general").with_status(1)).unwrap_err();

    match err {
        StoreError::UniquenessViolation { field, value } => {
            assert_eq!(field, "name");
            assert_eq!(value, "general");
        }
        other => panic!("Expected UniquenessViolation, got {other:?}"),
    }

    // The failed insert left the original untouched
    let stored = rooms.find_by_name("general").unwrap().unwrap();
    assert_eq!(stored.status, 0);
}

#[test]
fn test_room_names_are_case_sensitive() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    rooms.create(NewRoom::new("General")).unwrap();
    assert!(rooms.create(NewRoom::new("general")).is_ok());
}

#[test]
fn test_delete_room_cascades_to_messages() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, messages) = repositories(&db);

    let room = rooms.create(NewRoom::new("general")).unwrap();
    let posted: Vec<_> = (0..5)
        .map(|i| {
            messages
                .create(NewMessage::new("alice", room.id, format!("hello {i}")))
                .unwrap()
        })
        .collect();

    let removed = rooms.delete(room.id).expect("Failed to delete room");
    assert_eq!(removed, 5);

    assert_eq!(rooms.get(room.id).unwrap(), None);
    for message in posted {
        assert_eq!(messages.get(message.id).unwrap(), None);
    }
    assert!(messages.list_for_room(room.id).unwrap().is_empty());
}

#[test]
fn test_delete_room_leaves_other_rooms_alone() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, messages) = repositories(&db);

    let doomed = rooms.create(NewRoom::new("doomed")).unwrap();
    let kept = rooms.create(NewRoom::new("kept")).unwrap();
    messages.create(NewMessage::new("alice", doomed.id, "bye")).unwrap();
    let survivor = messages.create(NewMessage::new("bob", kept.id, "still here")).unwrap();

    assert_eq!(rooms.delete(doomed.id).unwrap(), 1);

    assert_eq!(rooms.get(kept.id).unwrap(), Some(kept.clone()));
    assert_eq!(messages.list_for_room(kept.id).unwrap(), vec![survivor]);
}

#[test]
fn test_delete_empty_room() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    let room = rooms.create(NewRoom::new("empty")).unwrap();
    assert_eq!(rooms.delete(room.id).unwrap(), 0);

    // The name is free again
    assert!(rooms.create(NewRoom::new("empty")).is_ok());
}

#[test]
fn test_delete_missing_room() {
    let db = Database::in_memory().expect("Failed to create database");
    let (rooms, _) = repositories(&db);

    assert!(matches!(rooms.delete(99), Err(StoreError::RoomNotFound(99))));
}

#[test]
fn test_concurrent_creation_with_same_name() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("race.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let db = Database::new(&db_url).expect("Failed to create database");
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let rooms = SqliteRoomRepository::new(db.clone());
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                rooms.create(NewRoom::new("contested"))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let violations = results
        .iter()
        .filter(|r| matches!(r, Err(StoreError::UniquenessViolation { .. })))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(violations, 1);
}
