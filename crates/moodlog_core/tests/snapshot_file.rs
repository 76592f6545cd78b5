use chrono::{Duration, TimeZone, Utc};
use moodlog_core::{
    EntryStore, FileSnapshotStorage, LoadOutcome, MoodCategory, MoodEntry, NotificationConfig,
    NotificationDispatcher, OutboxNotificationCenter, SnapshotStorage, StorageError,
};
use std::path::Path;
use std::sync::Arc;

fn open_store(path: &Path) -> EntryStore<FileSnapshotStorage> {
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::new(OutboxNotificationCenter::new()),
        NotificationConfig::default(),
    ));
    EntryStore::new(FileSnapshotStorage::new(path), dispatcher)
}

#[test]
fn reload_after_mixed_mutations_restores_identical_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mood_entries.json");
    let base = Utc.with_ymd_and_hms(2024, 2, 29, 7, 15, 30).unwrap();

    let mut store = open_store(&path);
    assert!(matches!(store.load(), LoadOutcome::Missing));
    let mut ids = Vec::new();
    for (offset, category) in MoodCategory::ALL.into_iter().enumerate() {
        let entry = MoodEntry::new(
            base + Duration::minutes(offset as i64 * 97),
            category,
            format!("notes #{offset} with \"quotes\", emoji 🌧 and\nnewline"),
        );
        ids.push(entry.id);
        store.create(entry);
    }
    let mut edited = store.get(ids[2]).unwrap().clone();
    edited.notes.clear();
    edited.category = MoodCategory::Angry;
    store.update(edited);
    store.delete(ids[4]);
    store.delete_at(&[0]);
    let expected = store.entries().to_vec();

    let mut reopened = open_store(&path);
    assert!(matches!(
        reopened.load(),
        LoadOutcome::Loaded { count } if count == expected.len()
    ));
    assert_eq!(reopened.entries(), expected.as_slice());
}

#[test]
fn corrupt_file_loads_as_empty_and_next_save_replaces_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mood_entries.json");
    std::fs::write(&path, b"{\"version\": 1, \"entries\": [").unwrap();

    let mut store = open_store(&path);
    match store.load() {
        LoadOutcome::Reset { error } => assert!(matches!(error, StorageError::Decode(_))),
        other => panic!("expected reset, got {other:?}"),
    }
    assert!(store.is_empty());

    let entry = MoodEntry::new(Utc::now(), MoodCategory::Neutral, "fresh start");
    assert!(store.create(entry.clone()).persisted());
    let stored = FileSnapshotStorage::new(&path).read_snapshot().unwrap();
    assert_eq!(stored, Some(vec![entry]));
}

#[test]
fn failed_save_keeps_previous_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let path = data_dir.join("mood_entries.json");
    let mut store = open_store(&path);
    let entry = MoodEntry::new(Utc::now(), MoodCategory::Happy, "before");
    store.create(entry.clone());
    let before = std::fs::read(&path).unwrap();

    // Blocking the target with a directory makes the rename fail.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), b"x").unwrap();
    let report = store.create(MoodEntry::new(Utc::now(), MoodCategory::Sad, "after"));
    assert!(matches!(report.saved, Some(Err(StorageError::Io { .. }))));
    assert_eq!(store.len(), 2);

    let leftovers: Vec<_> = std::fs::read_dir(&data_dir)
        .unwrap()
        .map(|item| item.unwrap().file_name())
        .collect();
    assert_eq!(leftovers.len(), 1, "temp file must be cleaned up");

    std::fs::remove_dir_all(&path).unwrap();
    std::fs::write(&path, &before).unwrap();
    let mut reopened = open_store(&path);
    reopened.load();
    assert_eq!(reopened.entries(), &[entry]);
}

#[test]
fn newer_snapshot_version_is_treated_as_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mood_entries.json");
    std::fs::write(&path, br#"{"version": 7, "entries": []}"#).unwrap();

    let mut store = open_store(&path);
    match store.load() {
        LoadOutcome::Reset { error } => {
            assert_eq!(error.code(), "snapshot_version");
            assert!(error.to_string().contains("newer than supported"));
        }
        other => panic!("expected reset, got {other:?}"),
    }
}
