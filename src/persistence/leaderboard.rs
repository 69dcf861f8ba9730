//! Leaderboard service
//!
//! [`Leaderboard`] is the seam the session talks to. [`LocalLeaderboard`] keeps
//! each player's best in a key-value store and enforces the same checks a
//! remote backend would.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rate_limit::RateLimiter;
use super::validation::{MAX_SCORE, PlayerId, ValidationError, validate_run, validate_score};
use crate::highscores::{HighScoreEntry, HighScores, LEADERBOARD_SIZE};
use crate::platform::{KeyValueStore, StorageError};
use crate::sim::RunSummary;

/// Longest player id shown on the board
const DISPLAY_ID_LEN: usize = 10;

/// A finished run offered to the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub player_id: String,
    pub score: u32,
    pub obstacles_passed: u32,
    pub play_time_seconds: f64,
    pub run_ended: bool,
}

impl ScoreSubmission {
    pub fn from_run(player_id: &str, summary: &RunSummary) -> Self {
        Self {
            player_id: player_id.to_string(),
            score: summary.score,
            obstacles_passed: summary.obstacles_passed,
            play_time_seconds: summary.play_time_seconds(),
            run_ended: true,
        }
    }
}

/// One row of the public board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub score: u32,
}

/// Result of an accepted submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// New personal best, stored at this rank
    Recorded { rank: usize },
    /// Valid, but not above the stored best
    NotHigher { best: u32 },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Invalid(#[from] ValidationError),
    #[error("too many save attempts")]
    RateLimited,
    #[error("leaderboard storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// Score sink and top-N query
pub trait Leaderboard {
    fn submit(
        &mut self,
        submission: &ScoreSubmission,
        now_ms: u64,
    ) -> Result<SubmitOutcome, SubmitError>;

    /// Highest scores first, at most `limit` rows
    fn top(&self, limit: usize) -> Vec<LeaderboardEntry>;

    /// Stored best of a player (0 when unknown or invalid)
    fn best_for(&self, player_id: &str) -> u32;
}

/// Integrity hash over `"{id}_{score}_{timestamp}"`
///
/// 32-bit `h = h * 31 + unit` over UTF-16 code units, rendered as base 36 of
/// the absolute value.
pub fn data_hash(player_id: &str, score: u32, timestamp_ms: u64) -> String {
    let text = format!("{}_{}_{}", player_id, score, timestamp_ms);
    let hash = text.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    to_base36(i64::from(hash).unsigned_abs())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.iter().rev().map(|&b| b as char).collect()
}

/// Leaderboard persisted through a key-value store
pub struct LocalLeaderboard<S: KeyValueStore> {
    store: S,
    board: HighScores,
    limiter: RateLimiter,
}

impl<S: KeyValueStore> LocalLeaderboard<S> {
    pub fn new(store: S) -> Self {
        Self::with_limiter(store, RateLimiter::default())
    }

    pub fn with_limiter(store: S, limiter: RateLimiter) -> Self {
        let board = HighScores::load(&store);
        Self {
            store,
            board,
            limiter,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> Leaderboard for LocalLeaderboard<S> {
    fn submit(
        &mut self,
        submission: &ScoreSubmission,
        now_ms: u64,
    ) -> Result<SubmitOutcome, SubmitError> {
        let player = PlayerId::parse(&submission.player_id)?;
        if !self.limiter.check(&mut self.store, &player, now_ms as f64) {
            return Err(SubmitError::RateLimited);
        }
        validate_run(
            submission.score,
            submission.obstacles_passed,
            submission.play_time_seconds,
            submission.run_ended,
        )?;

        let previous = self.board.best_for(player.as_str());
        validate_score(submission.score, previous)?;
        if !self.board.qualifies(player.as_str(), submission.score) {
            return Ok(SubmitOutcome::NotHigher { best: previous });
        }

        let entry = HighScoreEntry {
            player_id: player.to_string(),
            score: submission.score,
            obstacles_passed: submission.obstacles_passed,
            play_time_seconds: submission.play_time_seconds,
            updated_at: now_ms,
            hash: data_hash(player.as_str(), submission.score, now_ms),
        };
        let rank = self.board.record(entry).unwrap_or(usize::MAX);
        self.board.save(&mut self.store)?;
        log::info!(
            "Recorded score {} for {} (rank {})",
            submission.score,
            player,
            rank
        );
        Ok(SubmitOutcome::Recorded { rank })
    }

    fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.board
            .entries
            .iter()
            .filter(|e| e.score > 0 && e.score <= MAX_SCORE)
            .take(limit.min(LEADERBOARD_SIZE))
            .map(|e| LeaderboardEntry {
                player_id: e.player_id.chars().take(DISPLAY_ID_LEN).collect(),
                score: e.score,
            })
            .collect()
    }

    fn best_for(&self, player_id: &str) -> u32 {
        match PlayerId::parse(player_id) {
            Ok(id) => self.board.best_for(id.as_str()),
            Err(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    fn submission(id: &str, score: u32) -> ScoreSubmission {
        ScoreSubmission {
            player_id: id.to_string(),
            score,
            obstacles_passed: score,
            play_time_seconds: 30.0,
            run_ended: true,
        }
    }

    #[test]
    fn test_data_hash_matches_reference_values() {
        assert_eq!(data_hash("AB12", 42, 1_700_000_000_000), "org89y");
        assert_eq!(data_hash("ZZZZ", 10_000, 1_734_567_890_123), "rg36ij");
    }

    #[test]
    fn test_submit_keeps_personal_best() {
        let mut board = LocalLeaderboard::new(MemoryStore::default());
        assert_eq!(
            board.submit(&submission("ab12", 20), 1).unwrap(),
            SubmitOutcome::Recorded { rank: 1 }
        );
        assert_eq!(
            board.submit(&submission("AB12", 5), 2).unwrap(),
            SubmitOutcome::NotHigher { best: 20 }
        );
        assert_eq!(board.best_for("ab12"), 20);
        assert_eq!(board.top(10).len(), 1);
    }

    #[test]
    fn test_top_is_sorted_and_capped() {
        let mut board = LocalLeaderboard::new(MemoryStore::default());
        for i in 0..15u32 {
            let id = format!("P{:03}", i);
            board.submit(&submission(&id, i + 1), u64::from(i)).unwrap();
        }
        let top = board.top(50);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].score, 15);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_invalid_submissions_rejected() {
        let mut board = LocalLeaderboard::new(MemoryStore::default());
        assert!(matches!(
            board.submit(&submission("bad!", 3), 0),
            Err(SubmitError::Invalid(ValidationError::InvalidPlayerId(_)))
        ));
        let mut quick = submission("AB12", 3);
        quick.play_time_seconds = 1.0;
        assert!(matches!(
            board.submit(&quick, 0),
            Err(SubmitError::Invalid(ValidationError::PlayTooShort { .. }))
        ));
        assert!(board.top(10).is_empty());
    }

    #[test]
    fn test_rate_limited() {
        let limiter = RateLimiter::new(2, 1000.0);
        let mut board = LocalLeaderboard::with_limiter(MemoryStore::default(), limiter);
        board.submit(&submission("AB12", 1), 0).unwrap();
        board.submit(&submission("AB12", 2), 1).unwrap();
        assert!(matches!(
            board.submit(&submission("AB12", 3), 2),
            Err(SubmitError::RateLimited)
        ));
    }

    #[test]
    fn test_board_survives_reload() {
        let mut board = LocalLeaderboard::new(MemoryStore::default());
        board.submit(&submission("AB12", 9), 0).unwrap();
        let reloaded = LocalLeaderboard::new(board.store().clone());
        assert_eq!(reloaded.best_for("AB12"), 9);
    }
}
