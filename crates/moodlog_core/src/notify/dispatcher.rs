//! Mood notification dispatcher.
//!
//! # Responsibility
//! - Turn a mood category into a one-shot local notification request.
//! - Ask the platform for notification permission once per dispatcher.
//!
//! # Invariants
//! - Every scheduled request gets a fresh `<kind>-notification-<uuid>` id.
//! - Failures are logged and returned, never panicked on; callers may drop
//!   the returned result.
//! - Notification text comes from the static category table only.

use super::center::{AuthorizationStatus, NotificationCenter, NotificationRequest, NotifyResult};
use crate::config::NotificationConfig;
use crate::logging::sanitize_message;
use crate::model::category::MoodCategory;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

const MOOD_ID_PREFIX: &str = "mood-notification";
const TEST_ID_PREFIX: &str = "test-notification";
const TEST_TITLE: &str = "Test notification";
const TEST_BODY: &str =
    "This is a test notification. If you can see it, notifications are working!";
const MAX_PLATFORM_ERROR_CHARS: usize = 160;

/// Outcome of [`NotificationDispatcher::request_permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    /// The platform was asked; carries its immediate answer.
    Requested(AuthorizationStatus),
    /// An earlier call already asked the platform.
    AlreadyRequested,
}

/// Schedules category notifications through a platform center.
pub struct NotificationDispatcher {
    center: Arc<dyn NotificationCenter>,
    config: NotificationConfig,
    permission_requested: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(center: Arc<dyn NotificationCenter>, config: NotificationConfig) -> Self {
        Self {
            center,
            config,
            permission_requested: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }

    /// Whether the platform has been asked for permission by this dispatcher.
    pub fn permission_requested(&self) -> bool {
        self.permission_requested.load(Ordering::Acquire)
    }

    /// Asks the platform for alert/badge/sound permission and configures
    /// foreground presentation.
    ///
    /// Only the first successful call reaches the platform. A failed call
    /// clears the requested flag so a later explicit call may ask again.
    pub fn request_permission(&self) -> NotifyResult<PermissionOutcome> {
        if self
            .permission_requested
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("event=permission_request module=notify status=skipped reason=already_requested");
            return Ok(PermissionOutcome::AlreadyRequested);
        }

        if let Err(err) = self
            .center
            .set_foreground_presentation(self.config.foreground)
        {
            warn!(
                "event=foreground_presentation module=notify status=error error={}",
                err
            );
        }

        match self.center.request_authorization(self.config.authorization) {
            Ok(status) => {
                match status {
                    AuthorizationStatus::Denied => warn!(
                        "event=permission_request module=notify status=ok result={}",
                        status.as_str()
                    ),
                    _ => info!(
                        "event=permission_request module=notify status=ok result={}",
                        status.as_str()
                    ),
                }
                Ok(PermissionOutcome::Requested(status))
            }
            Err(err) => {
                self.permission_requested.store(false, Ordering::Release);
                warn!(
                    "event=permission_request module=notify status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Logs a permission answer delivered asynchronously by the platform.
    pub fn record_permission_result(&self, granted: bool, error: Option<&str>) {
        match (granted, error) {
            (true, _) => info!("event=permission_result module=notify status=ok result=granted"),
            (false, Some(message)) => warn!(
                "event=permission_result module=notify status=error result=denied error={}",
                sanitize_message(message, MAX_PLATFORM_ERROR_CHARS)
            ),
            (false, None) => {
                warn!("event=permission_result module=notify status=ok result=denied")
            }
        }
    }

    /// Schedules the category's notification. Returns the request id.
    pub fn notify(&self, category: MoodCategory) -> NotifyResult<String> {
        self.schedule(
            MOOD_ID_PREFIX,
            category.tag(),
            category.notification_title(),
            category.notification_body(),
        )
    }

    /// Schedules the fixed diagnostic notification. Returns the request id.
    pub fn notify_test(&self) -> NotifyResult<String> {
        self.schedule(TEST_ID_PREFIX, "test", TEST_TITLE, TEST_BODY)
    }

    fn schedule(&self, prefix: &str, kind: &str, title: &str, body: &str) -> NotifyResult<String> {
        let request = NotificationRequest {
            id: format!("{prefix}-{}", Uuid::new_v4()),
            title: title.to_string(),
            body: body.to_string(),
            sound: self.config.sound,
            delay: self.config.delay,
            repeats: false,
        };
        let id = request.id.clone();

        match self.center.add(request) {
            Ok(()) => {
                info!(
                    "event=notification_schedule module=notify status=ok kind={} notification_id={} delay_ms={}",
                    kind,
                    id,
                    self.config.delay.as_millis()
                );
                Ok(id)
            }
            Err(err) => {
                warn!(
                    "event=notification_schedule module=notify status=error kind={} notification_id={} error={}",
                    kind, id, err
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationDispatcher, PermissionOutcome};
    use crate::config::NotificationConfig;
    use crate::notify::center::{
        AuthorizationOptions, AuthorizationStatus, NotificationCenter, NotificationRequest,
        NotifyError, NotifyResult, PresentationOptions,
    };
    use crate::model::category::MoodCategory;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Default)]
    struct ScriptedCenter {
        added: Mutex<Vec<NotificationRequest>>,
        authorizations: Mutex<usize>,
        presentations: Mutex<Vec<PresentationOptions>>,
        fail_authorization: Mutex<bool>,
    }

    impl NotificationCenter for ScriptedCenter {
        fn request_authorization(
            &self,
            options: AuthorizationOptions,
        ) -> NotifyResult<AuthorizationStatus> {
            assert!(options.alert && options.badge && options.sound);
            *self.authorizations.lock().unwrap() += 1;
            if *self.fail_authorization.lock().unwrap() {
                return Err(NotifyError::Unavailable("offline".to_string()));
            }
            Ok(AuthorizationStatus::Granted)
        }

        fn add(&self, request: NotificationRequest) -> NotifyResult<()> {
            self.added.lock().unwrap().push(request);
            Ok(())
        }

        fn set_foreground_presentation(&self, options: PresentationOptions) -> NotifyResult<()> {
            self.presentations.lock().unwrap().push(options);
            Ok(())
        }
    }

    fn dispatcher(center: &Arc<ScriptedCenter>) -> NotificationDispatcher {
        NotificationDispatcher::new(center.clone(), NotificationConfig::default())
    }

    #[test]
    fn notify_uses_category_text_one_second_delay_and_fresh_ids() {
        let center = Arc::new(ScriptedCenter::default());
        let dispatcher = dispatcher(&center);

        let first = dispatcher.notify(MoodCategory::Sad).unwrap();
        let second = dispatcher.notify(MoodCategory::Sad).unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("mood-notification-"));

        let added = center.added.lock().unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].title, MoodCategory::Sad.notification_title());
        assert_eq!(added[0].body, MoodCategory::Sad.notification_body());
        assert_eq!(added[0].delay, Duration::from_secs(1));
        assert!(!added[0].repeats);
        assert!(added[0].sound);
    }

    #[test]
    fn notify_test_uses_diagnostic_prefix() {
        let center = Arc::new(ScriptedCenter::default());
        let id = dispatcher(&center).notify_test().unwrap();
        assert!(id.starts_with("test-notification-"));
        assert_eq!(center.added.lock().unwrap()[0].title, "Test notification");
    }

    #[test]
    fn permission_is_requested_once_with_foreground_presentation() {
        let center = Arc::new(ScriptedCenter::default());
        let dispatcher = dispatcher(&center);
        assert!(!dispatcher.permission_requested());

        assert_eq!(
            dispatcher.request_permission().unwrap(),
            PermissionOutcome::Requested(AuthorizationStatus::Granted)
        );
        assert_eq!(
            dispatcher.request_permission().unwrap(),
            PermissionOutcome::AlreadyRequested
        );

        assert!(dispatcher.permission_requested());
        assert_eq!(*center.authorizations.lock().unwrap(), 1);
        assert_eq!(
            center.presentations.lock().unwrap().as_slice(),
            &[PresentationOptions::default()]
        );
    }

    #[test]
    fn failed_permission_request_can_be_retried_explicitly() {
        let center = Arc::new(ScriptedCenter::default());
        *center.fail_authorization.lock().unwrap() = true;
        let dispatcher = dispatcher(&center);

        assert!(dispatcher.request_permission().is_err());
        assert!(!dispatcher.permission_requested());

        *center.fail_authorization.lock().unwrap() = false;
        assert!(matches!(
            dispatcher.request_permission().unwrap(),
            PermissionOutcome::Requested(AuthorizationStatus::Granted)
        ));
        assert_eq!(*center.authorizations.lock().unwrap(), 2);
    }
}
