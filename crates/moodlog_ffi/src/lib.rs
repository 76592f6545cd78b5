//! Flutter bridge for the MoodLog core.

pub mod api;
