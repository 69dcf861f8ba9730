//! Resolution independence
//!
//! Gameplay constants live at a fixed reference resolution. Each tick they are
//! multiplied by one uniform factor derived from the current playfield so the
//! game feels the same on any window shape.

use serde::{Deserialize, Serialize};

use super::state::TowerSize;
use crate::consts::{
    DECOR_DESPAWN_X, DECOR_MIN_SPACING, DECOR_TREE_CLEARANCE, DECOR_TREE_FOOTPRINT,
    SMOKE_OFFSET, SMOKE_OFFSET_FIRST, SMOKE_SIZE,
};
use crate::tuning::Tuning;

/// Smallest playfield edge accepted, keeps the scale factor positive
const MIN_PLAYFIELD_EDGE: f32 = 1.0;

/// Current playfield dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        let edge = |v: f32| {
            if v.is_finite() {
                v.max(MIN_PLAYFIELD_EDGE)
            } else {
                MIN_PLAYFIELD_EDGE
            }
        };
        Self {
            width: edge(width),
            height: edge(height),
        }
    }

    /// Playfield at exactly the reference resolution (scale 1.0)
    pub fn reference(tuning: &Tuning) -> Self {
        Self::new(tuning.reference_width, tuning.reference_height)
    }
}

/// Uniform scale: `min(width / ref_width, height / ref_height)`
pub fn resolve_scale(playfield: Playfield, reference_width: f32, reference_height: f32) -> f32 {
    (playfield.width / reference_width).min(playfield.height / reference_height)
}

/// Every tuning value the tick needs, already multiplied by the scale factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaled {
    pub scale: f32,
    pub width: f32,
    pub height: f32,
    /// Top edge of the ground strip
    pub ground_top: f32,

    pub gravity: f32,
    pub jump_impulse: f32,
    pub player_size: f32,
    pub hitbox_padding: f32,
    /// Fixed left edge of the player sprite
    pub player_x: f32,
    pub start_y: f32,

    pub obstacle_width: f32,
    pub obstacle_speed: f32,
    pub pipe_gap: f32,
    pub obstacle_spacing: f32,
    pub spacing_tolerance: f32,

    pub gift_size: f32,
    pub gift_gravity: f32,
    pub gift_fall_margin: f32,

    pub floating_size: f32,
    pub floating_top_margin: f32,
    pub floating_min_spacing: f32,

    pub smoke_size: f32,
    pub smoke_offset_first: f32,
    pub smoke_offset: f32,

    pub decor_min_spacing: f32,
    pub decor_tree_clearance: f32,
    pub decor_tree_footprint: f32,
    pub decor_despawn_x: f32,
}

impl Scaled {
    pub fn resolve(tuning: &Tuning, playfield: Playfield) -> Self {
        let s = resolve_scale(playfield, tuning.reference_width, tuning.reference_height);
        Self {
            scale: s,
            width: playfield.width,
            height: playfield.height,
            ground_top: playfield.height - tuning.ground_height * s,

            gravity: tuning.gravity * s,
            jump_impulse: tuning.jump_impulse * s,
            player_size: tuning.player_size * s,
            hitbox_padding: tuning.hitbox_padding * s,
            player_x: playfield.width * tuning.player_x_fraction,
            start_y: tuning.start_y * s,

            obstacle_width: tuning.obstacle_width * s,
            obstacle_speed: tuning.obstacle_speed * s,
            pipe_gap: tuning.pipe_gap * s,
            obstacle_spacing: tuning.obstacle_spacing * s,
            spacing_tolerance: tuning.obstacle_spacing_tolerance * s,

            gift_size: tuning.gift_size * s,
            gift_gravity: tuning.gift_gravity * s,
            gift_fall_margin: tuning.gift_fall_margin * s,

            floating_size: tuning.floating_size * s,
            floating_top_margin: tuning.floating_top_margin * s,
            floating_min_spacing: tuning.floating_min_spacing * s,

            smoke_size: SMOKE_SIZE * s,
            smoke_offset_first: SMOKE_OFFSET_FIRST * s,
            smoke_offset: SMOKE_OFFSET * s,

            decor_min_spacing: DECOR_MIN_SPACING * s,
            decor_tree_clearance: DECOR_TREE_CLEARANCE * s,
            decor_tree_footprint: DECOR_TREE_FOOTPRINT * s,
            decor_despawn_x: DECOR_DESPAWN_X * s,
        }
    }

    /// Height of a tower variant at the current scale
    pub fn tower_height(&self, size: TowerSize) -> f32 {
        size.reference_height() * self.scale
    }

    /// Highest the player sprite may go (top edge of the padded hitbox at y = 0)
    pub fn player_min_y(&self) -> f32 {
        -self.hitbox_padding
    }

    /// Lowest the player sprite may go (bottom of the padded hitbox on the ground)
    pub fn player_max_y(&self) -> f32 {
        self.ground_top - self.player_size + self.hitbox_padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_uses_smaller_axis() {
        let tuning = Tuning::default();
        // Wide window: height is the constraint
        let wide = Playfield::new(1600.0, 450.0);
        assert_eq!(resolve_scale(wide, 800.0, 900.0), 0.5);
        // Tall window: width is the constraint
        let tall = Playfield::new(400.0, 1800.0);
        assert_eq!(resolve_scale(tall, 800.0, 900.0), 0.5);

        let scaled = Scaled::resolve(&tuning, Playfield::reference(&tuning));
        assert_eq!(scaled.scale, 1.0);
    }

    #[test]
    fn test_scaled_constants() {
        let tuning = Tuning::default();
        let scaled = Scaled::resolve(&tuning, Playfield::new(400.0, 450.0));
        assert_eq!(scaled.scale, 0.5);
        assert_eq!(scaled.gravity, tuning.gravity * 0.5);
        assert_eq!(scaled.obstacle_width, 45.0);
        assert_eq!(scaled.ground_top, 450.0 - 40.0);
        assert_eq!(scaled.player_x, 60.0);
        assert_eq!(scaled.tower_height(TowerSize::Large), 175.0);
    }

    #[test]
    fn test_player_bounds() {
        let tuning = Tuning::default();
        let scaled = Scaled::resolve(&tuning, Playfield::reference(&tuning));
        assert_eq!(scaled.player_min_y(), -20.0);
        // 900 - 80 - 100 + 20
        assert_eq!(scaled.player_max_y(), 740.0);
    }

    #[test]
    fn test_degenerate_playfield_is_clamped() {
        let field = Playfield::new(0.0, f32::NAN);
        assert_eq!(field.width, 1.0);
        assert_eq!(field.height, 1.0);
        assert!(resolve_scale(field, 800.0, 900.0) > 0.0);
    }
}
