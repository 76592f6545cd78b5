//! Platform notification center contract.
//!
//! # Responsibility
//! - Describe what the core hands to the OS notification service.
//! - Keep platform specifics behind one object-safe trait.
//!
//! # Invariants
//! - Every request carries a unique identifier; the platform must not
//!   coalesce or replace requests with different identifiers.
//! - Requests are one-shot (`repeats == false`) for all core callers.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type NotifyResult<T> = Result<T, NotifyError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The platform service cannot be reached right now.
    Unavailable(String),
    /// The platform refused the call.
    Rejected(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => {
                write!(f, "notification service unavailable: {message}")
            }
            Self::Rejected(message) => write!(f, "notification rejected: {message}"),
        }
    }
}

impl Error for NotifyError {}

/// Capabilities asked for during the permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
}

impl Default for AuthorizationOptions {
    fn default() -> Self {
        Self {
            alert: true,
            badge: true,
            sound: true,
        }
    }
}

/// How a notification is shown while the app is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationOptions {
    pub banner: bool,
    pub sound: bool,
}

impl Default for PresentationOptions {
    fn default() -> Self {
        Self {
            banner: true,
            sound: true,
        }
    }
}

/// Immediate answer of the platform to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    /// The platform answers later; see
    /// [`NotificationDispatcher::record_permission_result`](super::NotificationDispatcher::record_permission_result).
    Pending,
}

impl AuthorizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Pending => "pending",
        }
    }
}

/// One local notification to schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub id: String,
    pub title: String,
    pub body: String,
    pub sound: bool,
    /// Fire after this delay, measured from submission.
    pub delay: Duration,
    pub repeats: bool,
}

/// Local notification service of the host platform.
pub trait NotificationCenter: Send + Sync {
    fn request_authorization(
        &self,
        options: AuthorizationOptions,
    ) -> NotifyResult<AuthorizationStatus>;

    /// Submits one request for delivery.
    fn add(&self, request: NotificationRequest) -> NotifyResult<()>;

    /// Sets foreground presentation. Platforms without the concept ignore it.
    fn set_foreground_presentation(&self, _options: PresentationOptions) -> NotifyResult<()> {
        Ok(())
    }
}
