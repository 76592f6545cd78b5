//! Queue-backed notification center for hosts that own the OS API.
//!
//! # Responsibility
//! - Record platform calls made by the dispatcher in submission order.
//! - Hand them to the host (Flutter) side, which executes them against the
//!   OS notification service.
//!
//! # Invariants
//! - Calls are drained exactly once, oldest first.
//! - The queue is bounded; when full, the oldest call is dropped and logged.

use super::center::{
    AuthorizationOptions, AuthorizationStatus, NotificationCenter, NotificationRequest,
    NotifyResult, PresentationOptions,
};
use log::warn;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Default number of calls kept before the oldest is dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

/// One call the host must perform on the platform notification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    RequestAuthorization(AuthorizationOptions),
    SetForegroundPresentation(PresentationOptions),
    Schedule(NotificationRequest),
}

impl PlatformCall {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestAuthorization(_) => "request_authorization",
            Self::SetForegroundPresentation(_) => "set_foreground_presentation",
            Self::Schedule(_) => "schedule",
        }
    }
}

#[derive(Debug)]
pub struct OutboxNotificationCenter {
    pending: Mutex<VecDeque<PlatformCall>>,
    capacity: usize,
}

impl OutboxNotificationCenter {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }

    /// A zero capacity is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Removes and returns every pending call, oldest first.
    pub fn take_pending(&self) -> Vec<PlatformCall> {
        self.lock().drain(..).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().len()
    }

    fn push(&self, call: PlatformCall) {
        let mut pending = self.lock();
        if pending.len() >= self.capacity {
            if let Some(dropped) = pending.pop_front() {
                warn!(
                    "event=outbox_overflow module=notify status=dropped kind={} capacity={}",
                    dropped.kind(),
                    self.capacity
                );
            }
        }
        pending.push_back(call);
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<PlatformCall>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OutboxNotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter for OutboxNotificationCenter {
    fn request_authorization(
        &self,
        options: AuthorizationOptions,
    ) -> NotifyResult<AuthorizationStatus> {
        self.push(PlatformCall::RequestAuthorization(options));
        Ok(AuthorizationStatus::Pending)
    }

    fn add(&self, request: NotificationRequest) -> NotifyResult<()> {
        self.push(PlatformCall::Schedule(request));
        Ok(())
    }

    fn set_foreground_presentation(&self, options: PresentationOptions) -> NotifyResult<()> {
        self.push(PlatformCall::SetForegroundPresentation(options));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{OutboxNotificationCenter, PlatformCall};
    use crate::notify::center::{NotificationCenter, NotificationRequest};
    use std::time::Duration;

    fn request(id: &str) -> NotificationRequest {
        NotificationRequest {
            id: id.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            sound: true,
            delay: Duration::from_secs(1),
            repeats: false,
        }
    }

    #[test]
    fn take_pending_drains_in_submission_order() {
        let outbox = OutboxNotificationCenter::new();
        outbox.add(request("a")).unwrap();
        outbox.add(request("b")).unwrap();

        let calls = outbox.take_pending();
        assert_eq!(
            calls,
            vec![
                PlatformCall::Schedule(request("a")),
                PlatformCall::Schedule(request("b"))
            ]
        );
        assert!(outbox.take_pending().is_empty());
    }

    #[test]
    fn full_queue_drops_oldest_call() {
        let outbox = OutboxNotificationCenter::with_capacity(2);
        for id in ["a", "b", "c"] {
            outbox.add(request(id)).unwrap();
        }

        let ids: Vec<String> = outbox
            .take_pending()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::Schedule(request) => Some(request.id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["b".to_string(), "c".to_string()]);
    }
}
