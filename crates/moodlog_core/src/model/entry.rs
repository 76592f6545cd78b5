//! Mood entry domain record.
//!
//! # Responsibility
//! - Define the single record the store persists and the UI renders.
//! - Provide calendar-day helpers used by day queries.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused for another entry.
//! - `timestamp` is stored as a UTC instant; calendar interpretation is done
//!   by callers with an explicit time zone.

use crate::model::category::MoodCategory;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a mood entry.
pub type EntryId = Uuid;

/// One logged record of a user's emotional state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: EntryId,
    /// When the mood applies. User-editable, not the creation time.
    pub timestamp: DateTime<Utc>,
    pub category: MoodCategory,
    /// Free text, may be empty.
    pub notes: String,
}

impl MoodEntry {
    /// Creates an entry with a freshly generated id.
    pub fn new(
        timestamp: DateTime<Utc>,
        category: MoodCategory,
        notes: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), timestamp, category, notes)
    }

    /// Creates an entry with a caller-provided id.
    ///
    /// Used by the FFI update path, where identity comes from the UI.
    pub fn with_id(
        id: EntryId,
        timestamp: DateTime<Utc>,
        category: MoodCategory,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            id,
            timestamp,
            category,
            notes: notes.into(),
        }
    }

    /// Blank entry for "now" with the default category, as the add form
    /// starts out.
    pub fn draft() -> Self {
        Self::new(Utc::now(), MoodCategory::default(), String::new())
    }

    /// Calendar day of `timestamp` in the given time zone.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.timestamp.with_timezone(tz).date_naive()
    }

    /// Calendar day of `timestamp` in the device's local time zone.
    pub fn local_day(&self) -> NaiveDate {
        self.day_in(&Local)
    }
}

#[cfg(test)]
mod tests {
    use super::MoodEntry;
    use crate::model::category::MoodCategory;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    #[test]
    fn day_in_respects_time_zone_offset() {
        let timestamp = Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap();
        let entry = MoodEntry::new(timestamp, MoodCategory::Happy, "late");

        assert_eq!(
            entry.day_in(&Utc),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            entry.day_in(&plus_two),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    #[test]
    fn draft_uses_default_category_and_empty_notes() {
        let draft = MoodEntry::draft();
        assert_eq!(draft.category, MoodCategory::Neutral);
        assert!(draft.notes.is_empty());
        assert_ne!(draft.id, MoodEntry::draft().id);
    }
}
