//! Mood category lookup table.
//!
//! # Responsibility
//! - Define the fixed set of mood categories an entry can belong to.
//! - Map every category to its display label, glyph, color and canned
//!   notification text.
//!
//! # Invariants
//! - The table is static configuration; nothing here changes at runtime.
//! - Serialized tags are stable snake_case names and must never be renamed.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One of six fixed emotional-state classifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Happy,
    Joyful,
    /// Preselected for new entries.
    #[default]
    Neutral,
    Sad,
    Angry,
    Anxious,
}

/// Display color for a category, resolved to concrete RGB by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayColor {
    Yellow,
    Green,
    Gray,
    Blue,
    Red,
    Purple,
}

impl DisplayColor {
    /// Lowercase color name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Gray => "gray",
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Purple => "purple",
        }
    }

    /// `#RRGGBB` form matching the platform system palette.
    pub fn hex(self) -> &'static str {
        match self {
            Self::Yellow => "#FFCC00",
            Self::Green => "#34C759",
            Self::Gray => "#8E8E93",
            Self::Blue => "#007AFF",
            Self::Red => "#FF3B30",
            Self::Purple => "#AF52DE",
        }
    }
}

/// Returned by [`MoodCategory::parse`] for unknown input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl Display for UnknownCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown mood category `{}`; expected happy|joyful|neutral|sad|angry|anxious",
            self.0
        )
    }
}

impl Error for UnknownCategory {}

impl MoodCategory {
    /// All categories in display order.
    pub const ALL: [MoodCategory; 6] = [
        Self::Happy,
        Self::Joyful,
        Self::Neutral,
        Self::Sad,
        Self::Angry,
        Self::Anxious,
    ];

    /// Stable serialized tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Joyful => "joyful",
            Self::Neutral => "neutral",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
        }
    }

    /// Human-readable label. Keyword search matches against this.
    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Joyful => "Joyful",
            Self::Neutral => "Neutral",
            Self::Sad => "Sad",
            Self::Angry => "Angry",
            Self::Anxious => "Anxious",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Happy => "😄",
            Self::Joyful => "😊",
            Self::Neutral => "😐",
            Self::Sad => "😢",
            Self::Angry => "😡",
            Self::Anxious => "😰",
        }
    }

    pub fn color(self) -> DisplayColor {
        match self {
            Self::Happy => DisplayColor::Yellow,
            Self::Joyful => DisplayColor::Green,
            Self::Neutral => DisplayColor::Gray,
            Self::Sad => DisplayColor::Blue,
            Self::Angry => DisplayColor::Red,
            Self::Anxious => DisplayColor::Purple,
        }
    }

    pub fn notification_title(self) -> &'static str {
        match self {
            Self::Happy => "Congratulations!",
            Self::Joyful => "Wonderful!",
            Self::Neutral => "Hello",
            Self::Sad => "Tough day?",
            Self::Angry => "Feeling frustrated?",
            Self::Anxious => "Feeling anxious?",
        }
    }

    pub fn notification_body(self) -> &'static str {
        match self {
            Self::Happy => "Your mood is excellent today. Enjoy this special day!",
            Self::Joyful => "Glad to see you are feeling good today. Keep it up!",
            Self::Neutral => {
                "You logged a neutral mood. Maybe a pleasant activity could brighten your day?"
            }
            Self::Sad => {
                "You logged that you feel sad. Try talking to someone close or doing something that usually cheers you up."
            }
            Self::Angry => {
                "You logged that you feel angry. Try taking a break and doing something relaxing to calm down."
            }
            Self::Anxious => {
                "You logged that you feel anxious. Try a breathing exercise or a short walk outdoors."
            }
        }
    }

    /// Parses a serialized tag or a display label, ignoring case and
    /// surrounding whitespace.
    pub fn parse(value: &str) -> Result<Self, UnknownCategory> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                category.tag().eq_ignore_ascii_case(normalized)
                    || category.label().eq_ignore_ascii_case(normalized)
            })
            .ok_or_else(|| UnknownCategory(normalized.to_string()))
    }
}

impl Display for MoodCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
