//! Read-only view of the simulation for the renderer and UI

use serde::{Deserialize, Serialize};

use super::collision::{Rect, player_hitbox};
use super::state::{DecorKind, GamePhase, GameState, TowerSize, TowerStyle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Degrees
    pub rotation: f32,
    pub dead: bool,
    pub hitbox: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleView {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub gap_top: f32,
    pub gap: f32,
    pub tower_height: f32,
    pub size: TowerSize,
    pub style: TowerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GiftView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub breaking: bool,
    pub variant: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatingView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmokeView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub frame: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecorView {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub kind: DecorKind,
}

/// Everything a frame needs to draw, copied out of the state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub time_ms: f64,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub ground_top: f32,
    pub score: u32,
    pub high_score: u32,
    pub show_hitbox: bool,
    pub player: PlayerView,
    pub obstacles: Vec<ObstacleView>,
    pub gifts: Vec<GiftView>,
    pub floating: Vec<FloatingView>,
    pub smoke: Vec<SmokeView>,
    pub decor: Vec<DecorView>,
}

impl Snapshot {
    pub fn capture(state: &GameState, high_score: u32, show_hitbox: bool) -> Self {
        let scaled = state.scaled();
        let player = PlayerView {
            x: state.player.pos.x,
            y: state.player.pos.y,
            size: scaled.player_size,
            rotation: state.player.rotation,
            dead: !state.player.alive,
            hitbox: player_hitbox(&state.player, &scaled),
        };

        Self {
            phase: state.phase,
            time_ms: state.time_ms,
            width: scaled.width,
            height: scaled.height,
            scale: scaled.scale,
            ground_top: scaled.ground_top,
            score: state.score,
            high_score: high_score.max(state.score),
            show_hitbox,
            player,
            obstacles: state
                .obstacles
                .iter()
                .map(|o| ObstacleView {
                    id: o.id,
                    x: o.x,
                    width: scaled.obstacle_width,
                    gap_top: o.gap_top,
                    gap: scaled.pipe_gap,
                    tower_height: scaled.tower_height(o.size),
                    size: o.size,
                    style: o.style,
                })
                .collect(),
            gifts: state
                .gifts
                .iter()
                .map(|g| GiftView {
                    id: g.id,
                    x: g.pos.x,
                    y: g.pos.y,
                    size: scaled.gift_size,
                    breaking: g.breaking,
                    variant: g.variant,
                })
                .collect(),
            floating: state
                .floating
                .iter()
                .map(|g| FloatingView {
                    id: g.id,
                    x: g.pos.x,
                    y: g.pos.y,
                    size: scaled.floating_size,
                })
                .collect(),
            smoke: state
                .smoke
                .iter()
                .map(|s| SmokeView {
                    id: s.id,
                    x: s.pos.x,
                    y: s.pos.y,
                    size: scaled.smoke_size,
                    frame: s.frame,
                })
                .collect(),
            decor: state
                .decor
                .iter()
                .map(|d| DecorView {
                    id: d.id,
                    x: d.x,
                    width: d.kind.reference_width() * scaled.scale,
                    height: crate::consts::DECOR_HEIGHT * scaled.scale,
                    kind: d.kind,
                })
                .collect(),
        }
    }
}
