//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes only from the scheduler's frame plans
//! - Seeded RNG only
//! - Append-only entity stores, pruned by predicate
//! - No rendering or platform dependencies

pub mod collision;
pub mod scale;
pub mod scheduler;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use scale::{Playfield, Scaled, resolve_scale};
pub use scheduler::{FrameClock, FramePlan, run_plan};
pub use snapshot::Snapshot;
pub use state::{
    DeathCause, Decor, DecorKind, FallingGift, FloatingGift, GameEvent, GamePhase, GameState,
    Obstacle, Player, RunSummary, ScoreSource, Smoke, TowerSize, TowerStyle,
};
pub use tick::tick;
