//! Domain model for logged moods.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the category lookup table next to the record that references it.
//!
//! # Invariants
//! - Every entry is identified by a stable `EntryId`.
//! - Every entry belongs to exactly one `MoodCategory`.

pub mod category;
pub mod entry;
