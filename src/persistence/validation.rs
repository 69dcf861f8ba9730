//! Validation of player ids and submitted scores

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest score any run may report
pub const MAX_SCORE: u32 = 10_000;
/// Largest improvement over a player's previous best in one run
pub const MAX_SCORE_INCREASE: u32 = 1_000;
/// Shortest run accepted, in seconds
pub const MIN_PLAY_TIME_SECONDS: f64 = 2.0;
/// Points a run may earn beyond one per obstacle (collectibles)
pub const MAX_BONUS_SCORE: u32 = 50;
/// Length of a player id
pub const PLAYER_ID_LEN: usize = 4;

/// Why a submission was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("player id must be {len} letters or digits, got {0:?}", len = PLAYER_ID_LEN)]
    InvalidPlayerId(String),
    #[error("score {score} exceeds the maximum of {max}", max = MAX_SCORE)]
    ScoreTooHigh { score: u32 },
    #[error("score {score} jumps more than {limit} over previous best {previous}", limit = MAX_SCORE_INCREASE)]
    ScoreJump { score: u32, previous: u32 },
    #[error("run lasted {seconds:.2}s, minimum is {min}s", min = MIN_PLAY_TIME_SECONDS)]
    PlayTooShort { seconds: f64 },
    #[error("score {score} is not reachable after passing {obstacles_passed} obstacles")]
    ScoreExceedsProgress { score: u32, obstacles_passed: u32 },
    #[error("run has not ended")]
    RunNotFinished,
}

/// Sanitized player id: four upper-case ASCII letters or digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    /// Trim, upper-case and keep the first four characters, then check the pattern
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let sanitized: String = raw
            .trim()
            .to_uppercase()
            .chars()
            .take(PLAYER_ID_LEN)
            .collect();
        let valid = sanitized.len() == PLAYER_ID_LEN
            && sanitized
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if valid {
            Ok(Self(sanitized))
        } else {
            Err(ValidationError::InvalidPlayerId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bounds on a score relative to the player's previous best
pub fn validate_score(score: u32, previous_best: u32) -> Result<(), ValidationError> {
    if score > MAX_SCORE {
        return Err(ValidationError::ScoreTooHigh { score });
    }
    if score > previous_best.saturating_add(MAX_SCORE_INCREASE) {
        return Err(ValidationError::ScoreJump {
            score,
            previous: previous_best,
        });
    }
    Ok(())
}

/// Checks on the finished run itself
pub fn validate_run(
    score: u32,
    obstacles_passed: u32,
    play_time_seconds: f64,
    run_ended: bool,
) -> Result<(), ValidationError> {
    if !run_ended {
        return Err(ValidationError::RunNotFinished);
    }
    validate_score(score, 0)?;
    if !(play_time_seconds >= MIN_PLAY_TIME_SECONDS) {
        return Err(ValidationError::PlayTooShort {
            seconds: play_time_seconds,
        });
    }
    if score > obstacles_passed.saturating_add(MAX_BONUS_SCORE) {
        return Err(ValidationError::ScoreExceedsProgress {
            score,
            obstacles_passed,
        });
    }
    Ok(())
}
