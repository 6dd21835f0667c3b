//! Integration tests for store persistence across sessions.
//!
//! These tests drive a `ProgressionStore` through each on-disk backend,
//! drop it, and reopen it the way a new app session would.

use chrono::{DateTime, TimeZone, Utc};
use levelup_core::storage::{open_storage, StorageBackend, StorageConfig};
use levelup_core::{
    AttributeName, Config, Database, Difficulty, JsonFileStorage, NoopFeedback, PlayerDefaults,
    ProgressionStore, RecordingFeedback, SqliteStorage, StateStorage, TaskDraft,
};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap()
}

fn open(storage: Box<dyn StateStorage>, now: DateTime<Utc>) -> ProgressionStore {
    ProgressionStore::open_at(storage, PlayerDefaults::default(), Box::new(NoopFeedback), now)
        .unwrap()
}

#[test]
fn test_sqlite_session_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("levelup.db");

    let (daily, once) = {
        let storage = SqliteStorage::new(Database::open(&path).unwrap(), "game-storage");
        let mut store = open(Box::new(storage), day(1));
        let daily = store.add_task_at(
            TaskDraft::new("Stretch", Difficulty::Easy, AttributeName::Strength).daily(true),
            day(1),
        );
        let once = store.add_task_at(
            TaskDraft::new("Ship release", Difficulty::Epic, AttributeName::Intelligence)
                .with_secondary(AttributeName::Network),
            day(1),
        );
        store.complete_task_at(&daily, day(1));
        store.complete_task_at(&once, day(1));
        store.damage_player_at(25, day(1));
        store.flush().unwrap();
        (daily, once)
    };

    // Same day: nothing resets
    let storage = SqliteStorage::new(Database::open(&path).unwrap(), "game-storage");
    let store = open(Box::new(storage), day(1));
    assert!(store.task(&daily).unwrap().completed);
    assert_eq!(store.hp(), 75);
    assert_eq!(store.attribute(AttributeName::Intelligence).level(), 2);
    assert_eq!(store.attribute(AttributeName::Network).total_xp(), 500);
    drop(store);

    // Next day: only the daily quest reopens
    let storage = SqliteStorage::new(Database::open(&path).unwrap(), "game-storage");
    let store = open(Box::new(storage), day(2));
    assert!(!store.task(&daily).unwrap().completed);
    assert!(store.task(&once).unwrap().completed);
    assert_eq!(store.attribute(AttributeName::Strength).total_xp(), 100);
    assert_eq!(store.last_login(), day(2));
}

#[test]
fn test_json_file_session_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game-storage.json");

    let id = {
        let mut store = open(Box::new(JsonFileStorage::new(&path)), day(5));
        store.set_user_name_at("Sage", day(5));
        store.add_task_at(
            TaskDraft::new("Dinner with friends", Difficulty::Medium, AttributeName::Love),
            day(5),
        )
    };

    let store = open(Box::new(JsonFileStorage::new(&path)), day(5));
    assert_eq!(store.user_name(), "Sage");
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].id, id);
    assert_eq!(store.tasks()[0].created_at, day(5));
}

#[test]
fn test_reopen_across_days_emits_daily_reset() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::default();

    {
        let mut store = open(open_storage(&config, dir.path()).unwrap(), day(10));
        let id = store.add_task_at(
            TaskDraft::new("Call grandma", Difficulty::Trivial, AttributeName::Family).daily(true),
            day(10),
        );
        store.complete_task_at(&id, day(10));
    }

    let recorder = RecordingFeedback::new();
    let store = ProgressionStore::open_at(
        open_storage(&config, dir.path()).unwrap(),
        PlayerDefaults::default(),
        Box::new(recorder.clone()),
        day(12),
    )
    .unwrap();
    assert_eq!(store.opening_reset().reset_count, 1);
    assert_eq!(recorder.events().len(), 1);
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.history()[0].xp_gained, 50);
}

#[test]
fn test_config_drives_store_defaults_and_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::load_from(dir.path()).unwrap();
    config.set("player.default_name", "Paladin").unwrap();
    config.set("player.max_hp", "150").unwrap();
    config.set("storage.backend", "json").unwrap();
    config.save_to(dir.path()).unwrap();

    let config = Config::load_from(dir.path()).unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Json);

    let storage = open_storage(&config.storage, dir.path()).unwrap();
    let mut store =
        ProgressionStore::open(storage, config.player_defaults(), Box::new(NoopFeedback)).unwrap();
    assert_eq!(store.user_name(), "Paladin");
    assert_eq!(store.max_hp(), 150);
    assert_eq!(store.hp(), 150);

    store.add_task(TaskDraft::new("Meditate", Difficulty::Easy, AttributeName::Love));
    assert!(dir.path().join("game-storage.json").exists());
    assert!(!dir.path().join("levelup.db").exists());
}
