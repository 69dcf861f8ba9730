//! High score tracking
//!
//! Two stores, both persisted through the platform key-value store:
//! - [`LocalBest`]: this device's best score, shown in the HUD
//! - [`HighScores`]: ranked per-player bests backing the local leaderboard

use serde::{Deserialize, Serialize};

use crate::platform::{KeyValueStore, StorageError};

/// Entries kept on the board (the UI shows the top [`LEADERBOARD_SIZE`])
pub const MAX_HIGH_SCORES: usize = 100;

/// Rows returned by a leaderboard query
pub const LEADERBOARD_SIZE: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub player_id: String,
    pub score: u32,
    pub obstacles_passed: u32,
    pub play_time_seconds: f64,
    /// Unix timestamp (ms) when achieved
    pub updated_at: u64,
    /// Integrity hash of id, score and timestamp
    pub hash: String,
}

/// Per-player best scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    const STORAGE_KEY: &'static str = "santa_flappy_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Best recorded score of a player (0 if none)
    pub fn best_for(&self, player_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.player_id == player_id)
            .map(|e| e.score)
            .unwrap_or(0)
    }

    /// Whether a score would replace the player's current entry
    pub fn qualifies(&self, player_id: &str, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        match self.entries.iter().find(|e| e.player_id == player_id) {
            Some(existing) => score > existing.score,
            None => true,
        }
    }

    /// Record an entry if it beats the player's previous best
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify
    pub fn record(&mut self, entry: HighScoreEntry) -> Option<usize> {
        if !self.qualifies(&entry.player_id, entry.score) {
            return None;
        }
        self.entries.retain(|e| e.player_id != entry.player_id);

        // Find insertion point (sorted descending by score)
        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        (rank <= MAX_HIGH_SCORES).then_some(rank)
    }

    /// Load the board, starting fresh on missing or corrupt data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<HighScores>(&json) {
                Ok(scores) => {
                    log::info!("Loaded {} high scores", scores.entries.len());
                    scores
                }
                Err(e) => {
                    log::warn!("Discarding corrupt high scores: {}", e);
                    Self::new()
                }
            },
            Ok(None) => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
            Err(e) => {
                log::warn!("High scores unavailable: {}", e);
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}

/// This device's best score, stored as a bare integer string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalBest {
    pub score: u32,
}

impl LocalBest {
    pub const STORAGE_KEY: &'static str = "santaFlappyHighScore";

    pub fn load(store: &dyn KeyValueStore) -> Self {
        let score = match store.get(Self::STORAGE_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring malformed local high score {:?}", raw);
                0
            }),
            Ok(None) => 0,
            Err(e) => {
                log::warn!("Local high score unavailable: {}", e);
                0
            }
        };
        Self { score }
    }

    /// Raise the best if `score` beats it. Returns true when it changed.
    pub fn offer(&mut self, score: u32, store: &mut dyn KeyValueStore) -> bool {
        if score <= self.score {
            return false;
        }
        self.score = score;
        if let Err(e) = store.set(Self::STORAGE_KEY, &score.to_string()) {
            log::warn!("Failed to save local high score: {}", e);
        }
        true
    }
}
