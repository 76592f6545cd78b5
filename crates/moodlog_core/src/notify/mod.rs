//! Local notification scheduling.
//!
//! # Responsibility
//! - Compose mood notifications from the static category table.
//! - Isolate the platform notification service behind `NotificationCenter`.
//!
//! # Invariants
//! - Notification failures never block or fail an entry mutation.
//! - Notifications are one-shot and uniquely identified.

pub mod center;
pub mod dispatcher;
pub mod outbox;

pub use center::{
    AuthorizationOptions, AuthorizationStatus, NotificationCenter, NotificationRequest,
    NotifyError, NotifyResult, PresentationOptions,
};
pub use dispatcher::{NotificationDispatcher, PermissionOutcome};
pub use outbox::{OutboxNotificationCenter, PlatformCall, DEFAULT_OUTBOX_CAPACITY};
