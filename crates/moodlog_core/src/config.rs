//! Core configuration supplied by the host application.
//!
//! # Responsibility
//! - Describe where the snapshot lives and how notifications behave.
//! - Validate host-provided paths before anything touches the disk.
//!
//! # Invariants
//! - `data_dir` is a non-empty absolute path.
//! - `snapshot_file_name` is a bare file name, never a path.

use crate::notify::center::{AuthorizationOptions, PresentationOptions};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SNAPSHOT_FILE_NAME: &str = "mood_entries.json";
pub const DEFAULT_NOTIFICATION_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub enum ConfigError {
    EmptyDataDir,
    RelativeDataDir(PathBuf),
    InvalidFileName(String),
    CreateDataDir { path: PathBuf, source: io::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDataDir => write!(f, "data_dir cannot be empty"),
            Self::RelativeDataDir(path) => write!(
                f,
                "data_dir must be an absolute path, got `{}`",
                path.display()
            ),
            Self::InvalidFileName(name) => {
                write!(f, "snapshot file name must be a plain file name, got `{name}`")
            }
            Self::CreateDataDir { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDataDir { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Notification behavior shared by every scheduled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub delay: Duration,
    pub sound: bool,
    pub foreground: PresentationOptions,
    pub authorization: AuthorizationOptions,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_NOTIFICATION_DELAY,
            sound: true,
            foreground: PresentationOptions::default(),
            authorization: AuthorizationOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub snapshot_file_name: String,
    pub notification: NotificationConfig,
}

impl CoreConfig {
    /// Config with defaults for everything except the data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            snapshot_file_name: DEFAULT_SNAPSHOT_FILE_NAME.to_string(),
            notification: NotificationConfig::default(),
        }
    }

    pub fn with_snapshot_file_name(mut self, name: impl Into<String>) -> Self {
        self.snapshot_file_name = name.into();
        self
    }

    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = notification;
        self
    }

    /// Checks path shapes without touching the file system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if !self.data_dir.is_absolute() {
            return Err(ConfigError::RelativeDataDir(self.data_dir.clone()));
        }

        let name = self.snapshot_file_name.trim();
        let is_plain = !name.is_empty()
            && name != "."
            && name != ".."
            && Path::new(name).file_name().and_then(|value| value.to_str()) == Some(name);
        if !is_plain || name != self.snapshot_file_name {
            return Err(ConfigError::InvalidFileName(self.snapshot_file_name.clone()));
        }
        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file_name)
    }
}
