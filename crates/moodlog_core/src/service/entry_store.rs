//! Authoritative mood entry list.
//!
//! # Responsibility
//! - Hold the in-memory entry list and keep the persisted snapshot in sync.
//! - Trigger a category notification after every create and update.
//! - Tell observers about every state change.
//!
//! # Invariants
//! - Entry ids are unique within the list.
//! - Every applied mutation writes the full list before notifying.
//! - Storage and notification failures are logged and reported, never
//!   propagated as errors and never roll back the in-memory change.
//! - Store order is insertion order; queries do not sort.

use crate::model::entry::{EntryId, MoodEntry};
use crate::notify::center::NotifyResult;
use crate::notify::dispatcher::NotificationDispatcher;
use crate::search::keyword::KeywordMatcher;
use crate::storage::{SnapshotStorage, StorageError, StorageResult};
use chrono::{Local, NaiveDate, TimeZone};
use log::{error, info, warn};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

type Observer = Box<dyn Fn(&[MoodEntry]) + Send + Sync>;

/// Handle returned by [`EntryStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Result of [`EntryStore::load`].
#[derive(Debug)]
pub enum LoadOutcome {
    /// Nothing was persisted yet; the list starts empty.
    Missing,
    Loaded { count: usize },
    /// The snapshot could not be read; the list was reset to empty.
    Reset { error: StorageError },
}

/// Completion signal of one store mutation.
///
/// Callers may inspect or ignore it; the store has already logged every
/// failure it contains.
#[derive(Debug)]
pub struct MutationReport {
    /// Number of entries added, replaced or removed.
    pub affected: usize,
    /// `None` when nothing changed and no save was attempted.
    pub saved: Option<StorageResult<()>>,
    /// `None` when the mutation does not notify or nothing changed.
    pub notification: Option<NotifyResult<String>>,
}

impl MutationReport {
    fn unchanged() -> Self {
        Self {
            affected: 0,
            saved: None,
            notification: None,
        }
    }

    pub fn applied(&self) -> bool {
        self.affected > 0
    }

    pub fn persisted(&self) -> bool {
        matches!(self.saved, Some(Ok(())))
    }
}

/// What the entry list screen shows: one calendar day, or keyword results
/// when search text is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    Day(NaiveDate),
    Keyword(String),
}

impl EntryFilter {
    pub fn from_inputs(day: NaiveDate, search_text: &str) -> Self {
        if search_text.is_empty() {
            Self::Day(day)
        } else {
            Self::Keyword(search_text.to_string())
        }
    }
}

/// In-memory entry list synchronized to a [`SnapshotStorage`].
pub struct EntryStore<S: SnapshotStorage> {
    storage: S,
    dispatcher: Arc<NotificationDispatcher>,
    entries: Vec<MoodEntry>,
    revision: u64,
    observers: Vec<(ObserverId, Observer)>,
    next_observer_id: u64,
}

impl<S: SnapshotStorage> EntryStore<S> {
    /// Creates an empty store. Call [`EntryStore::load`] to read the snapshot.
    pub fn new(storage: S, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
            entries: Vec::new(),
            revision: 0,
            observers: Vec::new(),
            next_observer_id: 0,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn dispatcher(&self) -> &Arc<NotificationDispatcher> {
        &self.dispatcher
    }

    /// Replaces the list with the persisted snapshot.
    ///
    /// Any read or decode failure resets the list to empty.
    pub fn load(&mut self) -> LoadOutcome {
        let started_at = Instant::now();
        let outcome = match self.storage.read_snapshot() {
            Ok(Some(entries)) => {
                let entries = dedupe_ids(entries);
                let count = entries.len();
                self.entries = entries;
                info!(
                    "event=snapshot_load module=store status=ok storage={} entries={} duration_ms={}",
                    self.storage.describe(),
                    count,
                    started_at.elapsed().as_millis()
                );
                LoadOutcome::Loaded { count }
            }
            Ok(None) => {
                self.entries.clear();
                info!(
                    "event=snapshot_load module=store status=missing storage={}",
                    self.storage.describe()
                );
                LoadOutcome::Missing
            }
            Err(err) => {
                self.entries.clear();
                error!(
                    "event=snapshot_load module=store status=reset storage={} error_code={} error={}",
                    self.storage.describe(),
                    err.code(),
                    err
                );
                LoadOutcome::Reset { error: err }
            }
        };
        self.changed();
        outcome
    }

    /// Writes the full list. Failures leave the previous snapshot in place.
    pub fn save(&self) -> StorageResult<()> {
        let result = self.storage.write_snapshot(&self.entries);
        if let Err(err) = &result {
            error!(
                "event=snapshot_save module=store status=error storage={} entries={} error_code={} error={}",
                self.storage.describe(),
                self.entries.len(),
                err.code(),
                err
            );
        }
        result
    }

    /// Appends `entry`, saves, then notifies with its category.
    ///
    /// An entry whose id is already present is not added.
    pub fn create(&mut self, entry: MoodEntry) -> MutationReport {
        if self.get(entry.id).is_some() {
            warn!(
                "event=entry_create module=store status=rejected reason=duplicate_id entry_id={}",
                entry.id
            );
            return MutationReport::unchanged();
        }

        let category = entry.category;
        info!(
            "event=entry_create module=store status=ok entry_id={} category={}",
            entry.id,
            category.tag()
        );
        self.entries.push(entry);
        self.changed();

        MutationReport {
            affected: 1,
            saved: Some(self.save()),
            notification: Some(self.dispatcher.notify(category)),
        }
    }

    /// Replaces the entry with the same id in place, saves, then notifies.
    ///
    /// An unknown id changes nothing; the report shows `affected == 0`.
    pub fn update(&mut self, entry: MoodEntry) -> MutationReport {
        let Some(index) = self.position(entry.id) else {
            info!(
                "event=entry_update module=store status=not_found entry_id={}",
                entry.id
            );
            return MutationReport::unchanged();
        };

        let category = entry.category;
        info!(
            "event=entry_update module=store status=ok entry_id={} category={}",
            entry.id,
            category.tag()
        );
        self.entries[index] = entry;
        self.changed();

        MutationReport {
            affected: 1,
            saved: Some(self.save()),
            notification: Some(self.dispatcher.notify(category)),
        }
    }

    /// Removes the entry with `id`, then saves. No-op if absent.
    pub fn delete(&mut self, id: EntryId) -> MutationReport {
        self.delete_many(&[id])
    }

    /// Removes every entry whose id is listed, with a single save.
    pub fn delete_many(&mut self, ids: &[EntryId]) -> MutationReport {
        let targets: HashSet<EntryId> = ids.iter().copied().collect();
        let before = self.entries.len();
        self.entries.retain(|entry| !targets.contains(&entry.id));
        let removed = before - self.entries.len();
        self.finish_removal(removed)
    }

    /// Removes entries at list positions, then saves.
    ///
    /// Duplicate positions count once; out-of-range positions are ignored.
    pub fn delete_at(&mut self, positions: &[usize]) -> MutationReport {
        let unique: BTreeSet<usize> = positions.iter().copied().collect();
        let mut ignored = 0usize;
        let mut removed = 0usize;
        for position in unique.into_iter().rev() {
            if position < self.entries.len() {
                self.entries.remove(position);
                removed += 1;
            } else {
                ignored += 1;
            }
        }
        if ignored > 0 {
            warn!(
                "event=entry_delete module=store status=partial ignored_positions={}",
                ignored
            );
        }
        self.finish_removal(removed)
    }

    /// Removes entries at positions of the filtered view described by
    /// `filter`, e.g. a swipe-delete on the visible list.
    pub fn delete_filtered_at(
        &mut self,
        filter: &EntryFilter,
        positions: &[usize],
    ) -> MutationReport {
        let visible = self.filtered(filter);
        let ids: Vec<EntryId> = positions
            .iter()
            .filter_map(|position| visible.get(*position).map(|entry| entry.id))
            .collect();
        self.delete_many(&ids)
    }

    pub fn entries(&self) -> &[MoodEntry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&MoodEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every load and applied mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Entries whose timestamp falls on `day` in the local calendar.
    pub fn query(&self, day: NaiveDate) -> Vec<&MoodEntry> {
        self.query_in(day, &Local)
    }

    pub fn query_in<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> Vec<&MoodEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.day_in(tz) == day)
            .collect()
    }

    /// Entries whose notes or category label contain `keyword`, ignoring
    /// case. An empty keyword returns every entry.
    pub fn search(&self, keyword: &str) -> Vec<&MoodEntry> {
        let matcher = KeywordMatcher::new(keyword);
        self.entries
            .iter()
            .filter(|entry| matcher.matches(entry))
            .collect()
    }

    pub fn filtered(&self, filter: &EntryFilter) -> Vec<&MoodEntry> {
        match filter {
            EntryFilter::Day(day) => self.query(*day),
            EntryFilter::Keyword(keyword) => self.search(keyword),
        }
    }

    /// Registers `observer`; it runs after every load and applied mutation
    /// with the current list.
    pub fn subscribe(
        &mut self,
        observer: impl Fn(&[MoodEntry]) + Send + Sync + 'static,
    ) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    fn finish_removal(&mut self, removed: usize) -> MutationReport {
        if removed == 0 {
            return MutationReport::unchanged();
        }

        info!(
            "event=entry_delete module=store status=ok removed={} remaining={}",
            removed,
            self.entries.len()
        );
        self.changed();
        MutationReport {
            affected: removed,
            saved: Some(self.save()),
            notification: None,
        }
    }

    fn changed(&mut self) {
        self.revision += 1;
        for (_, observer) in &self.observers {
            observer(&self.entries);
        }
    }
}

/// Keeps the first entry for every id; a hand-edited snapshot must not
/// break id uniqueness.
fn dedupe_ids(entries: Vec<MoodEntry>) -> Vec<MoodEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let before = entries.len();
    let unique: Vec<MoodEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id))
        .collect();
    if unique.len() != before {
        warn!(
            "event=snapshot_load module=store status=deduplicated dropped={}",
            before - unique.len()
        );
    }
    unique
}
