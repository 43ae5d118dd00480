//! Top scores kept by the browser between visits.
//!
//! The JSON layout is the one the browser client already stores:
//! `[{"name", "score", "deliveries", "distance", "date"}]` with `distance`
//! in kilometres and `date` as an ISO-8601 UTC timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::config::GameConfig;
use crate::game::session::RoundSummary;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalEntry {
    pub name: String,
    pub score: i32,
    pub deliveries: u32,
    #[serde(rename = "distance")]
    pub distance_km: f32,
    pub date: DateTime<Utc>,
}

impl LocalEntry {
    pub fn new(name: impl Into<String>, summary: &RoundSummary, date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            score: summary.score,
            deliveries: summary.deliveries,
            distance_km: summary.distance_km,
            date,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalLeaderboard {
    capacity: usize,
    entries: Vec<LocalEntry>,
}

impl Default for LocalLeaderboard {
    fn default() -> Self {
        Self::with_capacity(GameConfig::default().leaderboard_entries)
    }
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty board sized from [`GameConfig::leaderboard_entries`].
    pub fn for_config(config: &GameConfig) -> Self {
        Self::with_capacity(config.leaderboard_entries)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Restores a board saved with [`LocalLeaderboard::to_json`]. Extra or
    /// unsorted entries are normalised.
    pub fn from_json(json: &str, capacity: usize) -> Result<Self, serde_json::Error> {
        let entries: Vec<LocalEntry> = serde_json::from_str(json)?;
        let mut board = Self { capacity, entries };
        board.normalise();
        Ok(board)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[LocalEntry] {
        &self.entries
    }

    pub fn is_new_record(&self, score: i32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        match self.entries.last() {
            Some(last) if self.entries.len() >= self.capacity => score > last.score,
            _ => true,
        }
    }

    /// Inserts the entry and returns its 1-based rank, or `None` when it
    /// did not make the cut.
    pub fn add(&mut self, entry: LocalEntry) -> Option<usize> {
        // Equal scores rank behind earlier ones.
        let index = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        if index >= self.capacity {
            return None;
        }

        self.entries.insert(index, entry);
        self.entries.truncate(self.capacity);
        Some(index + 1)
    }

    fn normalise(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.capacity);
    }
}
