//! Case-insensitive keyword matching over mood entries.
//!
//! # Responsibility
//! - Match a user keyword against entry notes and category label.
//!
//! # Invariants
//! - The keyword is matched literally; regex metacharacters have no meaning.
//! - An empty keyword matches every entry.

use crate::model::entry::MoodEntry;
use log::warn;
use regex::{Regex, RegexBuilder};

/// Compiled keyword filter.
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    All,
    Pattern(Regex),
    /// Lowercase substring fallback for keywords too large to compile.
    Lowercase(String),
}

impl KeywordMatcher {
    pub fn new(keyword: &str) -> Self {
        if keyword.is_empty() {
            return Self::All;
        }

        match RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => Self::Pattern(pattern),
            Err(err) => {
                warn!(
                    "event=keyword_compile module=search status=fallback keyword_chars={} error={}",
                    keyword.chars().count(),
                    err
                );
                Self::Lowercase(keyword.to_lowercase())
            }
        }
    }

    pub fn is_match_text(&self, text: &str) -> bool {
        match self {
            Self::All => true,
            Self::Pattern(pattern) => pattern.is_match(text),
            Self::Lowercase(needle) => text.to_lowercase().contains(needle.as_str()),
        }
    }

    /// True when notes or the category label contain the keyword.
    pub fn matches(&self, entry: &MoodEntry) -> bool {
        self.is_match_text(&entry.notes) || self.is_match_text(entry.category.label())
    }
}
