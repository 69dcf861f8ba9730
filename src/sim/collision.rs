//! Axis-aligned collision tests
//!
//! Screen coordinates: x grows right, y grows down. All overlaps are strict,
//! so touching edges do not collide.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::scale::Scaled;
use super::state::{FallingGift, FloatingGift, Obstacle, Player};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    /// Shrink every side by `pad`
    pub fn inset(self, pad: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(pad),
            max: self.max - Vec2::splat(pad),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Strict overlap with the horizontal span `[left, right]`
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }

    /// Strict overlap with the vertical span `[top, bottom]`
    pub fn overlaps_y(&self, top: f32, bottom: f32) -> bool {
        self.max.y > top && self.min.y < bottom
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other.min.x, other.max.x) && self.overlaps_y(other.min.y, other.max.y)
    }
}

/// Player sprite bounds shrunk by the hitbox padding
pub fn player_hitbox(player: &Player, scaled: &Scaled) -> Rect {
    Rect::from_xywh(
        player.pos.x,
        player.pos.y,
        scaled.player_size,
        scaled.player_size,
    )
    .inset(scaled.hitbox_padding)
}

pub fn gift_rect(gift: &FallingGift, scaled: &Scaled) -> Rect {
    Rect::from_xywh(gift.pos.x, gift.pos.y, scaled.gift_size, scaled.gift_size)
}

pub fn floating_rect(gift: &FloatingGift, scaled: &Scaled) -> Rect {
    Rect::from_xywh(
        gift.pos.x,
        gift.pos.y,
        scaled.floating_size,
        scaled.floating_size,
    )
}

fn obstacle_span(obstacle: &Obstacle, scaled: &Scaled) -> (f32, f32) {
    (obstacle.x, obstacle.x + scaled.obstacle_width)
}

/// The player's padded right edge is past the obstacle's trailing edge
pub fn has_passed(hitbox: &Rect, obstacle: &Obstacle, scaled: &Scaled) -> bool {
    let (_, right) = obstacle_span(obstacle, scaled);
    hitbox.max.x > right
}

/// Hitbox reaches above the gap while inside the obstacle's span
pub fn hits_pipe(hitbox: &Rect, obstacle: &Obstacle, scaled: &Scaled) -> bool {
    let (left, right) = obstacle_span(obstacle, scaled);
    hitbox.overlaps_x(left, right) && hitbox.min.y < obstacle.gap_top
}

/// Hitbox overlaps the tower band `[ground_top - tower_height, ground_top]`
pub fn hits_tower(hitbox: &Rect, obstacle: &Obstacle, scaled: &Scaled) -> bool {
    let (left, right) = obstacle_span(obstacle, scaled);
    let top = scaled.ground_top - scaled.tower_height(obstacle.size);
    hitbox.overlaps_x(left, right) && hitbox.overlaps_y(top, scaled.ground_top)
}

/// A gift crossing either gap boundary inside the obstacle's span breaks
pub fn gift_breaks_on(gift: &Rect, obstacle: &Obstacle, scaled: &Scaled) -> bool {
    let (left, right) = obstacle_span(obstacle, scaled);
    gift.overlaps_x(left, right)
        && (gift.min.y < obstacle.gap_top || gift.max.y > obstacle.gap_top + scaled.pipe_gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scale::Playfield;
    use crate::sim::state::{TowerSize, TowerStyle};
    use crate::tuning::Tuning;

    fn scaled() -> Scaled {
        let tuning = Tuning::default();
        Scaled::resolve(&tuning, Playfield::reference(&tuning))
    }

    fn obstacle(x: f32, gap_top: f32) -> Obstacle {
        Obstacle {
            id: 1,
            x,
            gap_top,
            size: TowerSize::Medium,
            style: TowerStyle::Green,
            scored: false,
        }
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::from_xywh(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::from_xywh(10.0, 0.0, 10.0, 10.0);
        let inside = Rect::from_xywh(9.0, 9.0, 10.0, 10.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
    }

    #[test]
    fn test_inset() {
        let r = Rect::from_xywh(100.0, 300.0, 100.0, 100.0).inset(20.0);
        assert_eq!(r.min, Vec2::new(120.0, 320.0));
        assert_eq!(r.width(), 60.0);
        assert_eq!(r.height(), 60.0);
    }

    #[test]
    fn test_pipe_hit_needs_horizontal_overlap() {
        let s = scaled();
        let hitbox = Rect::from_xywh(140.0, 100.0, 60.0, 60.0);
        // Gap starts below the player's top edge
        assert!(hits_pipe(&hitbox, &obstacle(150.0, 200.0), &s));
        // Same height, obstacle far to the right
        assert!(!hits_pipe(&hitbox, &obstacle(400.0, 200.0), &s));
        // Player top exactly at gap top is safe
        assert!(!hits_pipe(&hitbox, &obstacle(150.0, 100.0), &s));
    }

    #[test]
    fn test_tower_band() {
        let s = scaled();
        // Medium tower: band [820 - 300, 820] = [520, 820]
        let high = Rect::from_xywh(140.0, 400.0, 60.0, 60.0);
        let low = Rect::from_xywh(140.0, 500.0, 60.0, 60.0);
        let o = obstacle(150.0, 340.0);
        assert!(!hits_tower(&high, &o, &s));
        assert!(hits_tower(&low, &o, &s));
    }

    #[test]
    fn test_gift_edge_is_not_breaking() {
        let s = scaled();
        let o = obstacle(100.0, 300.0);
        let at_edge = Rect::from_xywh(110.0, 300.0, s.gift_size, s.gift_size);
        let above = Rect::from_xywh(110.0, 299.0, s.gift_size, s.gift_size);
        assert!(!gift_breaks_on(&at_edge, &o, &s));
        assert!(gift_breaks_on(&above, &o, &s));

        // Bottom boundary: gift bottom exactly on gap bottom is safe, one unit past breaks
        let bottom = 300.0 + s.pipe_gap - s.gift_size;
        let resting = Rect::from_xywh(110.0, bottom, s.gift_size, s.gift_size);
        let past = Rect::from_xywh(110.0, bottom + 1.0, s.gift_size, s.gift_size);
        assert!(!gift_breaks_on(&resting, &o, &s));
        assert!(gift_breaks_on(&past, &o, &s));
    }

    #[test]
    fn test_gift_rect_tracks_scaled_size() {
        let tuning = Tuning::default();
        let half = Scaled::resolve(&tuning, Playfield::new(400.0, 450.0));
        let gift = FallingGift {
            id: 3,
            pos: Vec2::new(50.0, 80.0),
            velocity: 2.0,
            breaking: false,
            breaking_ticks: 0.0,
            variant: 0,
        };
        let r = gift_rect(&gift, &half);
        assert_eq!(r.min, Vec2::new(50.0, 80.0));
        assert_eq!(r.width(), 30.0);
        assert_eq!(r.height(), 30.0);
    }

    #[test]
    fn test_passed_uses_padded_right_edge() {
        let s = scaled();
        let o = obstacle(0.0, 300.0);
        // Obstacle right edge at 90
        assert!(!has_passed(&Rect::from_xywh(0.0, 0.0, 90.0, 10.0), &o, &s));
        assert!(has_passed(&Rect::from_xywh(0.0, 0.0, 90.5, 10.0), &o, &s));
    }
}
