//! Whole-list snapshot persistence.
//!
//! # Responsibility
//! - Define the storage contract the entry store persists through.
//! - Own the on-disk snapshot encoding shared by every backend.
//!
//! # Invariants
//! - A snapshot is always the full entry list, never a delta.
//! - Snapshot version is written on every save and checked on every load.
//! - Backends never expose a partially written snapshot to readers.

use crate::model::entry::MoodEntry;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

mod file;
mod memory;

pub use file::FileSnapshotStorage;
pub use memory::MemorySnapshotStorage;

/// Latest snapshot envelope version this build reads and writes.
pub const SNAPSHOT_VERSION: u32 = 1;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io {
        path: Option<PathBuf>,
        source: io::Error,
    },
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    UnsupportedVersion {
        file_version: u32,
        latest_supported: u32,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: Some(path.into()),
            source,
        }
    }

    /// Stable short code used in log lines and FFI messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "storage_io",
            Self::Encode(_) => "snapshot_encode",
            Self::Decode(_) => "snapshot_decode",
            Self::UnsupportedVersion { .. } => "snapshot_version",
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io {
                path: Some(path),
                source,
            } => write!(f, "snapshot I/O failed at `{}`: {source}", path.display()),
            Self::Io { path: None, source } => write!(f, "snapshot I/O failed: {source}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
            Self::Decode(err) => write!(f, "failed to decode snapshot: {err}"),
            Self::UnsupportedVersion {
                file_version,
                latest_supported,
            } => write!(
                f,
                "snapshot version {file_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(value: io::Error) -> Self {
        Self::Io {
            path: None,
            source: value,
        }
    }
}

/// Durable home of the entry list.
///
/// Implementations must make `write_snapshot` all-or-nothing: after a failed
/// write, `read_snapshot` still returns the previous snapshot.
pub trait SnapshotStorage {
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn read_snapshot(&self) -> StorageResult<Option<Vec<MoodEntry>>>;

    /// Replaces the persisted snapshot with `entries`.
    fn write_snapshot(&self, entries: &[MoodEntry]) -> StorageResult<()>;

    /// Short backend description for log lines.
    fn describe(&self) -> String;
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u32,
    entries: &'a [MoodEntry],
}

#[derive(Deserialize)]
struct SnapshotHeader {
    version: u32,
}

#[derive(Deserialize)]
struct SnapshotIn {
    entries: Vec<MoodEntry>,
}

/// Encodes the full entry list into the versioned snapshot envelope.
pub fn encode_snapshot(entries: &[MoodEntry]) -> StorageResult<Vec<u8>> {
    serde_json::to_vec_pretty(&SnapshotOut {
        version: SNAPSHOT_VERSION,
        entries,
    })
    .map_err(StorageError::Encode)
}

/// Decodes a snapshot envelope, rejecting versions newer than this build.
pub fn decode_snapshot(bytes: &[u8]) -> StorageResult<Vec<MoodEntry>> {
    let header: SnapshotHeader = serde_json::from_slice(bytes).map_err(StorageError::Decode)?;
    if header.version > SNAPSHOT_VERSION {
        return Err(StorageError::UnsupportedVersion {
            file_version: header.version,
            latest_supported: SNAPSHOT_VERSION,
        });
    }

    let snapshot: SnapshotIn = serde_json::from_slice(bytes).map_err(StorageError::Decode)?;
    Ok(snapshot.entries)
}
