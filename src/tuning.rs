//! Data-driven game balance
//!
//! Every number here is in reference-resolution units. The simulation scales
//! them through [`crate::sim::scale::Scaled`] before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::settings::PerformanceProfile;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("reference resolution must be positive, got {width}x{height}")]
    InvalidReference { width: f32, height: f32 },
    #[error("tuning value `{0}` must be positive")]
    NonPositive(&'static str),
}

/// Gameplay balance knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub reference_width: f32,
    pub reference_height: f32,

    // === Player ===
    pub gravity: f32,
    pub jump_impulse: f32,
    pub player_size: f32,
    pub hitbox_padding: f32,
    pub player_x_fraction: f32,
    pub start_y: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_speed: f32,
    pub pipe_gap: f32,
    pub ground_height: f32,
    pub obstacle_spacing: f32,
    pub obstacle_spacing_tolerance: f32,

    // === Falling gifts ===
    pub gift_size: f32,
    pub gift_gravity: f32,
    /// Ticks a gift spends breaking before removal
    pub gift_break_ticks: f32,
    pub gift_fall_margin: f32,
    pub gift_first_drop_ms: f64,
    pub gift_drop_interval_ms: f64,

    // === Floating collectibles ===
    pub floating_size: f32,
    pub floating_top_margin: f32,
    pub floating_min_spacing: f32,
    pub floating_interval_min_ms: f64,
    pub floating_interval_max_ms: f64,

    // === Effects ===
    pub smoke_enabled: bool,
    pub decor_enabled: bool,
    pub decor_interval_min_ms: f64,
    pub decor_interval_max_ms: f64,

    // === Delayed transitions ===
    pub death_cue_delay_ms: f64,
    pub game_over_delay_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            reference_width: REFERENCE_WIDTH,
            reference_height: REFERENCE_HEIGHT,

            gravity: GRAVITY,
            jump_impulse: JUMP_IMPULSE,
            player_size: PLAYER_SIZE,
            hitbox_padding: PLAYER_HITBOX_PADDING,
            player_x_fraction: PLAYER_X_FRACTION,
            start_y: START_Y,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_speed: OBSTACLE_SPEED,
            pipe_gap: PIPE_GAP_DESKTOP,
            ground_height: GROUND_HEIGHT,
            obstacle_spacing: OBSTACLE_SPACING,
            obstacle_spacing_tolerance: OBSTACLE_SPACING_TOLERANCE,

            gift_size: GIFT_SIZE,
            gift_gravity: GIFT_GRAVITY,
            gift_break_ticks: GIFT_BREAK_TICKS,
            gift_fall_margin: GIFT_FALL_MARGIN,
            gift_first_drop_ms: GIFT_FIRST_DROP_MS,
            gift_drop_interval_ms: GIFT_DROP_INTERVAL_MS,

            floating_size: FLOATING_SIZE,
            floating_top_margin: FLOATING_TOP_MARGIN,
            floating_min_spacing: FLOATING_MIN_SPACING,
            floating_interval_min_ms: FLOATING_INTERVAL_MIN_MS,
            floating_interval_max_ms: FLOATING_INTERVAL_MAX_MS,

            smoke_enabled: true,
            decor_enabled: true,
            decor_interval_min_ms: 500.0,
            decor_interval_max_ms: 1200.0,

            death_cue_delay_ms: DEATH_CUE_DELAY_MS,
            game_over_delay_ms: GAME_OVER_DELAY_MS,
        }
    }
}

impl Tuning {
    /// Defaults adjusted for a performance profile
    pub fn for_profile(profile: PerformanceProfile) -> Self {
        let mut tuning = Self::default();
        tuning.apply_profile(profile);
        tuning
    }

    /// Apply profile-dependent values on top of the current tuning
    pub fn apply_profile(&mut self, profile: PerformanceProfile) {
        self.pipe_gap = profile.pipe_gap();
        self.smoke_enabled = profile.smoke_enabled();
        let (min, max) = profile.decor_interval_ms();
        self.decor_interval_min_ms = min;
        self.decor_interval_max_ms = max;
    }

    /// Parse a tuning file; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make the scale resolver or spawners divide by zero
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.reference_width > 0.0 && self.reference_height > 0.0) {
            return Err(TuningError::InvalidReference {
                width: self.reference_width,
                height: self.reference_height,
            });
        }
        let positive = [
            ("obstacle_width", self.obstacle_width),
            ("obstacle_speed", self.obstacle_speed),
            ("player_size", self.player_size),
            ("gift_size", self.gift_size),
            ("floating_size", self.floating_size),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(TuningError::NonPositive(name));
            }
        }
        if self.gift_drop_interval_ms <= 0.0 || self.floating_interval_min_ms <= 0.0 {
            return Err(TuningError::NonPositive("spawn interval"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "gravity": 0.7 }"#).unwrap();
        assert_eq!(tuning.gravity, 0.7);
        assert_eq!(tuning.obstacle_width, OBSTACLE_WIDTH);
    }

    #[test]
    fn test_rejects_bad_reference() {
        let err = Tuning::from_json(r#"{ "reference_width": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::InvalidReference { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ gravity"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_mobile_profile_narrows_gap_and_disables_smoke() {
        let tuning = Tuning::for_profile(PerformanceProfile::Mobile);
        assert_eq!(tuning.pipe_gap, PIPE_GAP_MOBILE);
        assert!(!tuning.smoke_enabled);
        assert!(tuning.decor_interval_min_ms >= 1000.0);
    }
}
