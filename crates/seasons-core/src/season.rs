//! The closed set of seasons a card can be tagged with.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Season tag attached to every card.
///
/// Stored as the lowercase name (`"winter"`, `"spring"`, ...). Presentation
/// tables are exhaustive matches so a new season is a compile error until
/// every table handles it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season assumed when a stored record carries an unknown or missing tag.
    pub const FALLBACK: Season = Season::Spring;

    /// All seasons in calendar order starting from winter.
    pub fn all() -> impl Iterator<Item = Season> {
        Season::iter()
    }

    /// Parses a stored tag, falling back to [`Season::FALLBACK`].
    pub fn parse_or_fallback(raw: Option<&str>) -> Season {
        raw.and_then(|value| value.trim().to_ascii_lowercase().parse().ok())
            .unwrap_or(Self::FALLBACK)
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
        }
    }

    /// Accent colour used for chips and filters (`#RRGGBB`).
    pub fn color(self) -> &'static str {
        match self {
            Season::Winter => "#4FC3F7",
            Season::Spring => "#81C784",
            Season::Summer => "#FFB74D",
            Season::Autumn => "#FF7043",
        }
    }
}
