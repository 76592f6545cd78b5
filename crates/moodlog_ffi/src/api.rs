//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the single process-wide `MoodLogApp` and its notification outbox.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Errors are reported as messages inside response envelopes.
//! - Mutations are exported without `sync`, so Dart receives a future it
//!   may await or drop.

use chrono::{NaiveDate, TimeZone, Utc};
use moodlog_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, EntryFilter, EntryId, MoodCategory, MoodEntry, MoodLogApp, MutationReport,
    OutboxNotificationCenter, PlatformCall,
};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use uuid::Uuid;

static APP: OnceLock<AppHandle> = OnceLock::new();

struct AppHandle {
    data_dir: PathBuf,
    outbox: Arc<OutboxNotificationCenter>,
    app: Mutex<MoodLogApp>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the app core in the app's private documents directory.
///
/// # FFI contract
/// - Sync call; reads the snapshot file once.
/// - Idempotent for the same `data_dir`; a different directory is rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn app_init(data_dir: String) -> String {
    let requested = PathBuf::from(data_dir.trim());
    if let Some(handle) = APP.get() {
        return ensure_same_dir(handle, &requested);
    }

    let outbox = Arc::new(OutboxNotificationCenter::new());
    let (app, _) = match MoodLogApp::open(CoreConfig::new(&requested), outbox.clone()) {
        Ok(opened) => opened,
        Err(err) => {
            warn!("event=app_init module=ffi status=error error={err}");
            return format!("app_init failed: {err}");
        }
    };

    let handle = AppHandle {
        data_dir: requested.clone(),
        outbox,
        app: Mutex::new(app),
    };
    match APP.set(handle) {
        Ok(()) => {
            info!("event=app_init module=ffi status=ok");
            String::new()
        }
        // Lost a race with another initializer.
        Err(_) => match APP.get() {
            Some(active) => ensure_same_dir(active, &requested),
            None => "app_init failed: app state unavailable".to_string(),
        },
    }
}

/// One mood entry shaped for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub entry_id: String,
    /// Unix epoch milliseconds (UTC).
    pub timestamp_ms: i64,
    /// Stable category tag (`happy|joyful|neutral|sad|angry|anxious`).
    pub category: String,
    pub label: String,
    pub glyph: String,
    pub color_hex: String,
    pub notes: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryListResponse {
    pub ok: bool,
    pub items: Vec<EntryItem>,
    /// Store revision the items were read at.
    pub revision: u64,
    pub message: String,
}

impl EntryListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            revision: 0,
            message: message.into(),
        }
    }
}

/// Generic action response envelope for entry mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    /// Whether the mutation changed the entry list.
    pub ok: bool,
    pub entry_id: Option<String>,
    /// Number of entries changed.
    pub affected: u32,
    /// Whether the snapshot write succeeded.
    pub persisted: bool,
    /// Scheduled notification id, when one was scheduled.
    pub notification_id: Option<String>,
    pub message: String,
}

impl EntryActionResponse {
    fn from_report(
        report: MutationReport,
        entry_id: Option<EntryId>,
        success: &str,
        unchanged: &str,
    ) -> Self {
        let ok = report.applied();
        let persisted = report.persisted();
        let mut message = if ok { success } else { unchanged }.to_string();
        if let Some(Err(err)) = &report.saved {
            message = format!("{message} Saving failed: {err}");
        }
        Self {
            ok,
            entry_id: entry_id.map(|id| id.to_string()),
            affected: u32::try_from(report.affected).unwrap_or(u32::MAX),
            persisted,
            notification_id: report.notification.and_then(Result::ok),
            message,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            affected: 0,
            persisted: false,
            notification_id: None,
            message: message.into(),
        }
    }
}

/// Static category table row for pickers and legends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub category: String,
    pub label: String,
    pub glyph: String,
    pub color_hex: String,
}

/// One platform notification call the Dart side must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCallItem {
    /// `request_authorization|set_foreground_presentation|schedule`.
    pub kind: String,
    pub notification_id: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub delay_ms: Option<u64>,
    pub repeats: bool,
    pub alert: bool,
    pub badge: bool,
    pub sound: bool,
    pub banner: bool,
}

/// Creates an entry, persists the list and schedules its notification.
///
/// # FFI contract
/// - Async on the Dart side; never panics.
/// - `category` accepts a tag or label, case-insensitive.
pub fn entry_create(timestamp_ms: i64, category: String, notes: String) -> EntryActionResponse {
    let entry = match build_entry(Uuid::new_v4(), timestamp_ms, &category, notes) {
        Ok(entry) => entry,
        Err(message) => return EntryActionResponse::failure(format!("entry_create failed: {message}")),
    };
    let entry_id = entry.id;
    match with_app(|app| app.store_mut().create(entry)) {
        Ok(report) => EntryActionResponse::from_report(
            report,
            Some(entry_id),
            "Entry created.",
            "Entry already exists.",
        ),
        Err(message) => EntryActionResponse::failure(format!("entry_create failed: {message}")),
    }
}

/// Replaces the entry with `entry_id`.
///
/// Returns `ok == false` with a not-found message when the id is unknown;
/// nothing is saved or notified in that case.
pub fn entry_update(
    entry_id: String,
    timestamp_ms: i64,
    category: String,
    notes: String,
) -> EntryActionResponse {
    let result = parse_entry_id(&entry_id)
        .and_then(|id| build_entry(id, timestamp_ms, &category, notes));
    let entry = match result {
        Ok(entry) => entry,
        Err(message) => return EntryActionResponse::failure(format!("entry_update failed: {message}")),
    };
    let id = entry.id;
    match with_app(|app| app.store_mut().update(entry)) {
        Ok(report) => {
            EntryActionResponse::from_report(report, Some(id), "Entry updated.", "Entry not found.")
        }
        Err(message) => EntryActionResponse::failure(format!("entry_update failed: {message}")),
    }
}

/// Deletes the entry with `entry_id`; unknown ids are a no-op.
pub fn entry_delete(entry_id: String) -> EntryActionResponse {
    let id = match parse_entry_id(&entry_id) {
        Ok(id) => id,
        Err(message) => return EntryActionResponse::failure(format!("entry_delete failed: {message}")),
    };
    match with_app(|app| app.store_mut().delete(id)) {
        Ok(report) => {
            EntryActionResponse::from_report(report, Some(id), "Entry deleted.", "Entry not found.")
        }
        Err(message) => EntryActionResponse::failure(format!("entry_delete failed: {message}")),
    }
}

/// Deletes entries by position in the visible list, as produced by
/// [`entries_visible`] with the same day and search text.
pub fn entry_delete_at(
    year: i32,
    month: u32,
    day: u32,
    search_text: String,
    positions: Vec<u32>,
) -> EntryActionResponse {
    let date = match parse_day(year, month, day) {
        Ok(date) => date,
        Err(message) => {
            return EntryActionResponse::failure(format!("entry_delete_at failed: {message}"))
        }
    };
    let filter = EntryFilter::from_inputs(date, &search_text);
    let positions: Vec<usize> = positions
        .into_iter()
        .filter_map(|position| usize::try_from(position).ok())
        .collect();
    match with_app(|app| app.store_mut().delete_filtered_at(&filter, &positions)) {
        Ok(report) => EntryActionResponse::from_report(
            report,
            None,
            "Entries deleted.",
            "Nothing to delete.",
        ),
        Err(message) => EntryActionResponse::failure(format!("entry_delete_at failed: {message}")),
    }
}

/// Lists every entry in store order.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_list() -> EntryListResponse {
    list_with("entries_list", |app| {
        app.store().entries().iter().map(to_entry_item).collect()
    })
}

/// Lists entries logged on a local calendar day.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_on_day(year: i32, month: u32, day: u32) -> EntryListResponse {
    match parse_day(year, month, day) {
        Ok(date) => list_with("entries_on_day", |app| {
            app.store().query(date).into_iter().map(to_entry_item).collect()
        }),
        Err(message) => EntryListResponse::failure(format!("entries_on_day failed: {message}")),
    }
}

/// Lists entries whose notes or category label contain `keyword`.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_search(keyword: String) -> EntryListResponse {
    list_with("entries_search", |app| {
        app.store()
            .search(&keyword)
            .into_iter()
            .map(to_entry_item)
            .collect()
    })
}

/// Lists what the main screen shows: search results when `search_text` is
/// non-empty, otherwise the selected day's entries.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_visible(year: i32, month: u32, day: u32, search_text: String) -> EntryListResponse {
    match parse_day(year, month, day) {
        Ok(date) => {
            let filter = EntryFilter::from_inputs(date, &search_text);
            list_with("entries_visible", |app| {
                app.store()
                    .filtered(&filter)
                    .into_iter()
                    .map(to_entry_item)
                    .collect()
            })
        }
        Err(message) => EntryListResponse::failure(format!("entries_visible failed: {message}")),
    }
}

/// Current store revision; `0` before `app_init`.
///
/// Dart polls this to decide when to re-render.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_revision() -> u64 {
    with_app(|app| app.store().revision()).unwrap_or(0)
}

/// Static category table in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn categories() -> Vec<CategoryItem> {
    MoodCategory::ALL
        .into_iter()
        .map(|category| CategoryItem {
            category: category.tag().to_string(),
            label: category.label().to_string(),
            glyph: category.glyph().to_string(),
            color_hex: category.color().hex().to_string(),
        })
        .collect()
}

/// Asks for notification permission (once per process).
///
/// Returns empty string on success and error message on failure. The
/// platform answer arrives via [`notification_report_permission`].
#[flutter_rust_bridge::frb(sync)]
pub fn notification_request_permission() -> String {
    match with_app(|app| app.dispatcher().request_permission()) {
        Ok(Ok(_)) => String::new(),
        Ok(Err(err)) => format!("notification_request_permission failed: {err}"),
        Err(message) => format!("notification_request_permission failed: {message}"),
    }
}

/// Schedules the diagnostic notification.
pub fn notification_send_test() -> EntryActionResponse {
    match with_app(|app| app.dispatcher().notify_test()) {
        Ok(Ok(id)) => EntryActionResponse {
            ok: true,
            entry_id: None,
            affected: 0,
            persisted: false,
            notification_id: Some(id),
            message: "Test notification scheduled.".to_string(),
        },
        Ok(Err(err)) => {
            EntryActionResponse::failure(format!("notification_send_test failed: {err}"))
        }
        Err(message) => {
            EntryActionResponse::failure(format!("notification_send_test failed: {message}"))
        }
    }
}

/// Drains platform calls queued by the core, oldest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_take_pending() -> Vec<PlatformCallItem> {
    match APP.get() {
        Some(handle) => handle
            .outbox
            .take_pending()
            .into_iter()
            .map(to_platform_call_item)
            .collect(),
        None => Vec::new(),
    }
}

/// Reports the platform's answer to a permission request. Logged only.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_report_permission(granted: bool, error: Option<String>) {
    let _ = with_app(|app| {
        app.dispatcher()
            .record_permission_result(granted, error.as_deref())
    });
}

fn ensure_same_dir(handle: &AppHandle, requested: &Path) -> String {
    if handle.data_dir == requested {
        String::new()
    } else {
        warn!("event=app_init module=ffi status=rejected reason=data_dir_switch");
        format!(
            "app already initialized at `{}`; refusing to switch to `{}`",
            handle.data_dir.display(),
            requested.display()
        )
    }
}

fn with_app<T>(f: impl FnOnce(&mut MoodLogApp) -> T) -> Result<T, String> {
    let handle = APP
        .get()
        .ok_or_else(|| "app not initialized; call app_init first".to_string())?;
    let mut app = handle
        .app
        .lock()
        .map_err(|_| "app state lock poisoned".to_string())?;
    Ok(f(&mut app))
}

fn list_with(
    operation: &str,
    f: impl FnOnce(&MoodLogApp) -> Vec<EntryItem>,
) -> EntryListResponse {
    match with_app(|app| (f(app), app.store().revision())) {
        Ok((items, revision)) => {
            let message = if items.is_empty() {
                "No entries.".to_string()
            } else {
                format!("Found {} entr{}.", items.len(), plural_y(items.len()))
            };
            EntryListResponse {
                ok: true,
                items,
                revision,
                message,
            }
        }
        Err(message) => EntryListResponse::failure(format!("{operation} failed: {message}")),
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 {
        "y"
    } else {
        "ies"
    }
}

fn build_entry(
    id: EntryId,
    timestamp_ms: i64,
    category: &str,
    notes: String,
) -> Result<MoodEntry, String> {
    let timestamp = Utc
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .ok_or_else(|| format!("timestamp_ms out of range: {timestamp_ms}"))?;
    let category = MoodCategory::parse(category).map_err(|err| err.to_string())?;
    Ok(MoodEntry::with_id(id, timestamp, category, notes))
}

fn parse_entry_id(raw: &str) -> Result<EntryId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid entry id `{}`", raw.trim()))
}

fn parse_day(year: i32, month: u32, day: u32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| format!("invalid date {year:04}-{month:02}-{day:02}"))
}

fn to_entry_item(entry: &MoodEntry) -> EntryItem {
    EntryItem {
        entry_id: entry.id.to_string(),
        timestamp_ms: entry.timestamp.timestamp_millis(),
        category: entry.category.tag().to_string(),
        label: entry.category.label().to_string(),
        glyph: entry.category.glyph().to_string(),
        color_hex: entry.category.color().hex().to_string(),
        notes: entry.notes.clone(),
    }
}

fn to_platform_call_item(call: PlatformCall) -> PlatformCallItem {
    let kind = call.kind().to_string();
    let blank = PlatformCallItem {
        kind,
        notification_id: None,
        title: None,
        body: None,
        delay_ms: None,
        repeats: false,
        alert: false,
        badge: false,
        sound: false,
        banner: false,
    };
    match call {
        PlatformCall::RequestAuthorization(options) => PlatformCallItem {
            alert: options.alert,
            badge: options.badge,
            sound: options.sound,
            ..blank
        },
        PlatformCall::SetForegroundPresentation(options) => PlatformCallItem {
            banner: options.banner,
            sound: options.sound,
            ..blank
        },
        PlatformCall::Schedule(request) => PlatformCallItem {
            notification_id: Some(request.id),
            title: Some(request.title),
            body: Some(request.body),
            delay_ms: Some(u64::try_from(request.delay.as_millis()).unwrap_or(u64::MAX)),
            repeats: request.repeats,
            sound: request.sound,
            ..blank
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{
        app_init, categories, core_version, entries_list, entries_on_day, entries_revision,
        entries_search, entries_visible, entry_create, entry_delete, entry_delete_at,
        entry_update, init_logging, notification_send_test, notification_take_pending, ping,
    };
    use chrono::{Local, TimeZone};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn ensure_app() {
        let dir = std::env::temp_dir().join(format!("moodlog-ffi-test-{}", std::process::id()));
        let error = app_init(dir.to_string_lossy().into_owned());
        assert!(error.is_empty(), "{error}");
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn app_init_is_idempotent_and_rejects_switching_directory() {
        ensure_app();
        ensure_app();
        let other = std::env::temp_dir().join(unique_token("moodlog-ffi-other"));
        let error = app_init(other.to_string_lossy().into_owned());
        assert!(error.contains("refusing to switch"), "{error}");
    }

    #[test]
    fn categories_follow_display_order() {
        let tags: Vec<String> = categories().into_iter().map(|item| item.category).collect();
        assert_eq!(tags, ["happy", "joyful", "neutral", "sad", "angry", "anxious"]);
    }

    #[test]
    fn entry_create_is_listed_searchable_and_bumps_revision() {
        ensure_app();
        let token = unique_token("created");
        let before = entries_revision();

        let created = entry_create(1_700_000_000_000, "Happy".to_string(), token.clone());
        assert!(created.ok, "{}", created.message);
        assert!(created.persisted);
        assert!(created.notification_id.is_some());
        let entry_id = created.entry_id.expect("create should return entry_id");

        assert!(entries_revision() > before);
        assert!(entries_list()
            .items
            .iter()
            .any(|item| item.entry_id == entry_id));

        let found = entries_search(token.to_uppercase());
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].category, "happy");
        assert_eq!(found.items[0].timestamp_ms, 1_700_000_000_000);

        let day = Local.timestamp_millis_opt(1_700_000_000_000).unwrap().date_naive();
        let on_day = entries_on_day(
            chrono::Datelike::year(&day),
            chrono::Datelike::month(&day),
            chrono::Datelike::day(&day),
        );
        assert!(on_day.items.iter().any(|item| item.entry_id == entry_id));
    }

    #[test]
    fn entry_update_replaces_fields_and_reports_unknown_ids() {
        ensure_app();
        let token = unique_token("update");
        let created = entry_create(1_700_000_000_000, "neutral".to_string(), token.clone());
        let entry_id = created.entry_id.expect("create should return entry_id");

        let updated = entry_update(
            entry_id.clone(),
            1_700_000_360_000,
            "anxious".to_string(),
            format!("{token} edited"),
        );
        assert!(updated.ok, "{}", updated.message);
        let found = entries_search(format!("{token} edited"));
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].entry_id, entry_id);
        assert_eq!(found.items[0].category, "anxious");

        let missing = entry_update(
            uuid::Uuid::new_v4().to_string(),
            0,
            "sad".to_string(),
            String::new(),
        );
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
        assert!(missing.notification_id.is_none());
    }

    #[test]
    fn entry_create_rejects_unknown_category_and_bad_ids() {
        ensure_app();
        let response = entry_create(0, "ecstatic".to_string(), String::new());
        assert!(!response.ok);
        assert!(response.message.contains("unknown mood category"));

        let response = entry_delete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid entry id"));
    }

    #[test]
    fn entry_delete_and_delete_at_remove_entries() {
        ensure_app();
        let token = unique_token("delete");
        let first = entry_create(1_700_000_000_000, "sad".to_string(), format!("{token} a"));
        let second = entry_create(1_700_000_000_000, "sad".to_string(), format!("{token} b"));

        let deleted = entry_delete(first.entry_id.expect("first id"));
        assert!(deleted.ok);
        assert_eq!(deleted.affected, 1);

        let visible = entries_visible(2000, 1, 1, token.clone());
        assert_eq!(visible.items.len(), 1);
        assert_eq!(Some(visible.items[0].entry_id.clone()), second.entry_id);

        let removed = entry_delete_at(2000, 1, 1, token.clone(), vec![0, 5]);
        assert_eq!(removed.affected, 1);
        assert!(entries_search(token).items.is_empty());
    }

    #[test]
    fn invalid_day_is_reported() {
        ensure_app();
        let response = entries_on_day(2024, 2, 30);
        assert!(!response.ok);
        assert!(response.message.contains("invalid date"));
    }

    #[test]
    fn send_test_notification_is_drained_as_schedule_call() {
        ensure_app();
        let response = notification_send_test();
        assert!(response.ok, "{}", response.message);
        let id = response.notification_id.expect("test notification id");
        assert!(id.starts_with("test-notification-"));

        let pending = notification_take_pending();
        let call = pending
            .iter()
            .find(|call| call.notification_id.as_deref() == Some(id.as_str()))
            .expect("scheduled call should be pending");
        assert_eq!(call.kind, "schedule");
        assert_eq!(call.delay_ms, Some(1000));
        assert!(!call.repeats);
    }
}
