//! Core domain logic for MoodLog.
//! This crate is the single source of truth for entry and notification rules;
//! the Flutter UI reaches it through `moodlog_ffi`.

pub mod app;
pub mod config;
pub mod logging;
pub mod model;
pub mod notify;
pub mod search;
pub mod service;
pub mod storage;

pub use app::MoodLogApp;
pub use config::{ConfigError, CoreConfig, NotificationConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{DisplayColor, MoodCategory, UnknownCategory};
pub use model::entry::{EntryId, MoodEntry};
pub use notify::{
    AuthorizationOptions, AuthorizationStatus, NotificationCenter, NotificationDispatcher,
    NotificationRequest, NotifyError, NotifyResult, OutboxNotificationCenter, PermissionOutcome,
    PlatformCall, PresentationOptions,
};
pub use search::keyword::KeywordMatcher;
pub use service::entry_store::{
    EntryFilter, EntryStore, LoadOutcome, MutationReport, ObserverId,
};
pub use storage::{
    FileSnapshotStorage, MemorySnapshotStorage, SnapshotStorage, StorageError, StorageResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
