//! Match history in the rating engine's wire format.
//!
//! A history is serialized as:
//!
//! ```text
//! {
//!   "game": "DotA 2",
//!   "entries": [
//!     {
//!       "timestamp": "2025-01-01T00:00:00.000+00:00",
//!       "winner": ["Player-3", "Player-7"],
//!       "loser": ["Player-1", "Player-4"],
//!       "scale": "Even",
//!       "duration": 2400
//!     }
//!   ]
//! }
//! ```
//!
//! Entry order is significant: the engine may replay the history sequentially.
//! Timestamps always carry millisecond precision and an explicit offset.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Game tag used for generated histories.
pub const DEFAULT_GAME: &str = "DotA 2";

/// Coarse label describing how lopsided a match was.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum MatchOutcomeScale {
    #[default]
    #[serde(alias = "even")]
    Even,
    #[serde(alias = "advantage")]
    Advantage,
    #[serde(alias = "pwnage")]
    Pwnage,
}

/// Generation-time details of a synthetic match.
///
/// Only kept in memory for inspection; never sent to the rating engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchMetadata {
    /// Uniform draw that decided the winner.
    pub roll: f64,
    /// Probability that the team which actually won would win.
    pub prob_winner_wins: f64,
    pub winner_elo: i64,
    pub loser_elo: i64,
    /// The roll expressed relative to the winning team (`1 - roll` when team 2 won).
    pub winner_roll: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEntry {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub winner: Vec<String>,
    pub loser: Vec<String>,
    #[serde(default)]
    pub scale: MatchOutcomeScale,
    /// Match duration in whole seconds.
    pub duration: u32,
    #[serde(skip)]
    pub metadata: Option<MatchMetadata>,
}

fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, false))
}

impl MatchEntry {
    pub fn all_players(&self) -> impl Iterator<Item = &str> {
        self.winner.iter().chain(&self.loser).map(String::as_str)
    }

    /// Returns `true` if both teams have the same size and no player appears twice.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.winner.len() != self.loser.len() {
            return false;
        }
        let mut names = self.all_players().collect::<Vec<_>>();
        let count = names.len();
        names.sort_unstable();
        names.dedup();
        names.len() == count
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchHistory {
    pub game: String,
    pub entries: Vec<MatchEntry>,
}

impl MatchHistory {
    #[must_use]
    pub fn new(game: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            entries: vec![],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the history as the engine expects it on standard input.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
