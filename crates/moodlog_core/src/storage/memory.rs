//! In-memory snapshot storage.
//!
//! Keeps encoded snapshot bytes in process memory, so the full
//! encode/decode path runs exactly as with the file backend. Clones share
//! the same underlying state; tests keep one handle to inspect what the
//! store persisted.

use super::{decode_snapshot, encode_snapshot, SnapshotStorage, StorageResult};
use crate::model::entry::MoodEntry;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct MemoryState {
    bytes: Option<Vec<u8>>,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySnapshotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with raw bytes already "on disk", valid or not.
    pub fn with_raw(bytes: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage.lock().bytes = Some(bytes.into());
        storage
    }

    /// Raw persisted bytes, if any snapshot was written.
    pub fn raw(&self) -> Option<Vec<u8>> {
        self.lock().bytes.clone()
    }

    /// Decoded persisted entries; `None` when nothing is stored or it does
    /// not decode.
    pub fn persisted_entries(&self) -> Option<Vec<MoodEntry>> {
        self.raw().and_then(|bytes| decode_snapshot(&bytes).ok())
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnapshotStorage for MemorySnapshotStorage {
    fn read_snapshot(&self) -> StorageResult<Option<Vec<MoodEntry>>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(io::Error::other("simulated read failure").into());
        }
        match state.bytes.as_deref() {
            Some(bytes) => decode_snapshot(bytes).map(Some),
            None => Ok(None),
        }
    }

    fn write_snapshot(&self, entries: &[MoodEntry]) -> StorageResult<()> {
        let bytes = encode_snapshot(entries)?;
        let mut state = self.lock();
        if state.fail_writes {
            return Err(io::Error::other("simulated write failure").into());
        }
        state.bytes = Some(bytes);
        state.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
