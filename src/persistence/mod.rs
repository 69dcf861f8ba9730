//! Score submission and leaderboard
//!
//! Features:
//! - Player id sanitation
//! - Anti-tamper validation of finished runs
//! - Per-player rate limiting over a rolling hour
//! - Integrity hash stored with each entry
//!
//! Nothing here feeds back into the simulation; the session logs and swallows
//! every error at this boundary.

pub mod leaderboard;
pub mod rate_limit;
pub mod validation;

pub use leaderboard::{
    Leaderboard, LeaderboardEntry, LocalLeaderboard, ScoreSubmission, SubmitError, SubmitOutcome,
    data_hash,
};
pub use rate_limit::RateLimiter;
pub use validation::{PlayerId, ValidationError};
