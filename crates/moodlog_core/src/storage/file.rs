//! File-backed snapshot storage.
//!
//! # Responsibility
//! - Read the snapshot file once per load.
//! - Replace the snapshot file atomically on every save.
//!
//! # Invariants
//! - Writes go to a temp file in the target directory, are flushed to disk,
//!   then renamed over the target. Readers see the old or the new file only.
//! - A missing file is "nothing persisted yet", not an error.

use super::{decode_snapshot, encode_snapshot, SnapshotStorage, StorageError, StorageResult};
use crate::model::entry::MoodEntry;
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Snapshot storage backed by one JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    path: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("snapshot");
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn read_snapshot(&self) -> StorageResult<Option<Vec<MoodEntry>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };
        decode_snapshot(&bytes).map(Some)
    }

    fn write_snapshot(&self, entries: &[MoodEntry]) -> StorageResult<()> {
        let started_at = Instant::now();
        let bytes = encode_snapshot(entries)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
            }
        }

        let tmp_path = self.temp_path();
        if let Err(err) = write_synced(&tmp_path, &bytes) {
            discard_temp(&tmp_path);
            return Err(StorageError::io(&tmp_path, err));
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            discard_temp(&tmp_path);
            return Err(StorageError::io(&self.path, err));
        }

        debug!(
            "event=snapshot_write module=storage status=ok entries={} bytes={} duration_ms={}",
            entries.len(),
            bytes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn discard_temp(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(
                "event=snapshot_temp_cleanup module=storage status=error path={} error={}",
                path.display(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FileSnapshotStorage;
    use crate::model::category::MoodCategory;
    use crate::model::entry::MoodEntry;
    use crate::storage::SnapshotStorage;
    use chrono::Utc;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSnapshotStorage::new(dir.path().join("entries.json"));
        assert!(storage.read_snapshot().unwrap().is_none());
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSnapshotStorage::new(dir.path().join("entries.json"));
        let entry = MoodEntry::new(Utc::now(), MoodCategory::Joyful, "walk");

        storage.write_snapshot(std::slice::from_ref(&entry)).unwrap();
        storage.write_snapshot(&[]).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|item| item.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["entries.json".to_string()]);
        assert_eq!(storage.read_snapshot().unwrap(), Some(Vec::new()));
    }

    #[test]
    fn write_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSnapshotStorage::new(dir.path().join("nested/deeper/entries.json"));
        storage.write_snapshot(&[]).unwrap();
        assert!(storage.path().exists());
    }
}
