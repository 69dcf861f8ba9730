//! Game state and core simulation types
//!
//! Everything one run needs lives in [`GameState`], the context object the
//! scheduler owns and hands to every tick. Nothing here reads global state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::scale::{Playfield, Scaled};
use super::spawn;
use crate::consts::*;
use crate::tuning::Tuning;

/// Slack for comparing accumulated sim time against deadlines
pub const TIME_EPSILON_MS: f64 = 1e-6;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first jump
    Idle,
    /// Active gameplay
    Running,
    /// Player hit something; still falling, world still scrolling
    DeadFalling,
    /// Run finished, score final; needs an explicit reset
    Ended,
}

impl GamePhase {
    /// Whether ticks advance the world in this phase
    pub fn is_active(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::DeadFalling)
    }
}

/// What killed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Ceiling,
    Ground,
    Pipe,
    Tower,
}

/// What earned a point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreSource {
    Obstacle,
    Collectible,
}

/// Final numbers of a run, handed to persistence on game over
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u32,
    pub obstacles_passed: u32,
    pub collectibles: u32,
    pub jumps: u32,
    /// Simulated milliseconds between the first jump and game over
    pub play_time_ms: f64,
}

impl RunSummary {
    pub fn play_time_seconds(&self) -> f64 {
        self.play_time_ms / 1000.0
    }
}

/// Side effects produced by the simulation, drained by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Jumped,
    Scored { source: ScoreSource },
    Hit { cause: DeathCause },
    /// Delayed death cue, follows `Hit`
    Died,
    Restarted,
    RunEnded { summary: RunSummary },
}

/// The player character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the sprite; x stays fixed during a run
    pub pos: Vec2,
    /// Vertical velocity (pixels per tick, positive is down)
    pub velocity: f32,
    /// Visual tilt in degrees
    pub rotation: f32,
    pub alive: bool,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            velocity: 0.0,
            rotation: 0.0,
            alive: true,
        }
    }
}

/// Tower size variant, sets the height of the lower barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerSize {
    Small,
    Medium,
    Large,
}

impl TowerSize {
    pub const ALL: [TowerSize; 3] = [TowerSize::Small, TowerSize::Medium, TowerSize::Large];

    /// Height at the reference resolution
    pub fn reference_height(&self) -> f32 {
        match self {
            TowerSize::Small => TOWER_HEIGHT_SMALL,
            TowerSize::Medium => TOWER_HEIGHT_MEDIUM,
            TowerSize::Large => TOWER_HEIGHT_LARGE,
        }
    }
}

/// Cosmetic tower variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerStyle {
    Fantasy,
    Green,
    GreenTeal,
}

impl TowerStyle {
    pub const ALL: [TowerStyle; 3] = [TowerStyle::Fantasy, TowerStyle::Green, TowerStyle::GreenTeal];
}

/// A pipe + tower pair with a passable gap between them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Bottom of the upper pipe
    pub gap_top: f32,
    pub size: TowerSize,
    pub style: TowerStyle,
    pub scored: bool,
}

/// A gift dropped from under the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingGift {
    pub id: u32,
    /// Top-left
    pub pos: Vec2,
    pub velocity: f32,
    pub breaking: bool,
    /// Ticks spent breaking (fractional under speed multipliers)
    pub breaking_ticks: f32,
    /// Sprite variant index
    pub variant: u8,
}

/// A bonus item drifting toward the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatingGift {
    pub id: u32,
    /// Top-left
    pub pos: Vec2,
    pub collected: bool,
}

/// Jump smoke puff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Smoke {
    pub id: u32,
    pub pos: Vec2,
    pub created_at_ms: f64,
    /// Animation frame derived from age
    pub frame: u32,
}

/// Ground prop width variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecorKind {
    Narrow,
    Wide,
}

impl DecorKind {
    pub fn reference_width(&self) -> f32 {
        match self {
            DecorKind::Narrow => DECOR_WIDTH_NARROW,
            DecorKind::Wide => DECOR_WIDTH_WIDE,
        }
    }
}

/// Cosmetic ground decoration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decor {
    pub id: u32,
    pub x: f32,
    pub kind: DecorKind,
}

/// Sim-time deadlines of the spawners; `None` means disarmed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnTimers {
    pub next_gift_at_ms: Option<f64>,
    pub next_floating_at_ms: Option<f64>,
    pub next_decor_at_ms: Option<f64>,
}

/// Delayed state-machine transitions armed by timestamps
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingTransitions {
    /// Emit `Died` at this time
    pub death_cue_at_ms: Option<f64>,
    /// End the run at this time
    pub game_over_at_ms: Option<f64>,
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub playfield: Playfield,
    pub phase: GamePhase,
    /// Simulated milliseconds (advances only while the world is active)
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub run_started_at_ms: f64,

    pub score: u32,
    pub obstacles_passed: u32,
    pub collectibles: u32,
    pub jumps: u32,

    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub gifts: Vec<FallingGift>,
    pub floating: Vec<FloatingGift>,
    pub smoke: Vec<Smoke>,
    pub decor: Vec<Decor>,

    pub timers: SpawnTimers,
    pub pending: PendingTransitions,
    pub last_run: Option<RunSummary>,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, playfield: Playfield) -> Self {
        let scaled = Scaled::resolve(&tuning, playfield);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            playfield,
            phase: GamePhase::Idle,
            time_ms: 0.0,
            time_ticks: 0,
            run_started_at_ms: 0.0,
            score: 0,
            obstacles_passed: 0,
            collectibles: 0,
            jumps: 0,
            player: Player::new(scaled.player_x, scaled.start_y),
            obstacles: Vec::new(),
            gifts: Vec::new(),
            floating: Vec::new(),
            smoke: Vec::new(),
            decor: Vec::new(),
            timers: SpawnTimers::default(),
            pending: PendingTransitions::default(),
            last_run: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Constants resolved against the current playfield
    pub fn scaled(&self) -> Scaled {
        Scaled::resolve(&self.tuning, self.playfield)
    }

    /// Jump input: starts the run from `Idle`, flaps while alive, ignored otherwise
    pub fn jump(&mut self) {
        let scaled = self.scaled();
        match self.phase {
            GamePhase::Idle => {
                self.phase = GamePhase::Running;
                self.run_started_at_ms = self.time_ms;
                self.flap(&scaled, scaled.smoke_offset_first);
                spawn::start_run(self, &scaled);
                log::info!("Run started (scale {:.3})", scaled.scale);
            }
            GamePhase::Running if self.player.alive => {
                self.flap(&scaled, scaled.smoke_offset);
            }
            _ => {}
        }
    }

    fn flap(&mut self, scaled: &Scaled, smoke_offset: f32) {
        self.player.velocity = scaled.jump_impulse;
        self.jumps += 1;
        self.events.push(GameEvent::Jumped);
        if self.tuning.smoke_enabled {
            let id = self.next_entity_id();
            self.smoke.push(Smoke {
                id,
                pos: Vec2::new(self.player.pos.x - smoke_offset, self.player.pos.y),
                created_at_ms: self.time_ms,
                frame: 0,
            });
        }
    }

    /// Mark the player dead. Returns false if already dead (no side effects).
    pub fn kill(&mut self, cause: DeathCause) -> bool {
        if !self.player.alive {
            return false;
        }
        self.player.alive = false;
        self.phase = GamePhase::DeadFalling;
        self.pending.death_cue_at_ms = Some(self.time_ms + self.tuning.death_cue_delay_ms);
        self.events.push(GameEvent::Hit { cause });
        log::info!("Player died: {:?} (score {})", cause, self.score);
        true
    }

    /// Arm the delayed game over once the player rests on the ground while dead
    pub fn arm_game_over(&mut self) {
        if self.pending.game_over_at_ms.is_none() {
            self.pending.game_over_at_ms = Some(self.time_ms + self.tuning.game_over_delay_ms);
        }
    }

    /// Fire any pending transition whose time has come
    pub fn process_pending(&mut self) {
        if self
            .pending
            .death_cue_at_ms
            .is_some_and(|at| self.time_ms + TIME_EPSILON_MS >= at)
        {
            self.pending.death_cue_at_ms = None;
            self.events.push(GameEvent::Died);
        }
        if self
            .pending
            .game_over_at_ms
            .is_some_and(|at| self.time_ms + TIME_EPSILON_MS >= at)
        {
            self.pending.game_over_at_ms = None;
            self.end_run();
        }
    }

    fn end_run(&mut self) {
        let summary = self.summary();
        self.phase = GamePhase::Ended;
        self.timers = SpawnTimers::default();
        self.last_run = Some(summary);
        self.events.push(GameEvent::RunEnded { summary });
        log::info!(
            "Game over - score {} ({} obstacles, {} collectibles, {:.1}s)",
            summary.score,
            summary.obstacles_passed,
            summary.collectibles,
            summary.play_time_seconds()
        );
    }

    /// Award one point
    pub fn add_score(&mut self, source: ScoreSource) {
        self.score += 1;
        match source {
            ScoreSource::Obstacle => self.obstacles_passed += 1,
            ScoreSource::Collectible => self.collectibles += 1,
        }
        self.events.push(GameEvent::Scored { source });
    }

    /// Numbers of the current (or just finished) run
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            obstacles_passed: self.obstacles_passed,
            collectibles: self.collectibles,
            jumps: self.jumps,
            play_time_ms: (self.time_ms - self.run_started_at_ms).max(0.0),
        }
    }

    /// Back to `Idle`: clears entity stores, score, timers and pending transitions
    pub fn reset(&mut self) {
        let scaled = self.scaled();
        self.phase = GamePhase::Idle;
        self.score = 0;
        self.obstacles_passed = 0;
        self.collectibles = 0;
        self.jumps = 0;
        self.player = Player::new(scaled.player_x, scaled.start_y);
        self.obstacles.clear();
        self.gifts.clear();
        self.floating.clear();
        self.smoke.clear();
        self.decor.clear();
        self.timers = SpawnTimers::default();
        self.pending = PendingTransitions::default();
        self.events.push(GameEvent::Restarted);
        log::info!("Game reset");
    }

    /// Apply a new playfield size. Placed obstacles keep their geometry.
    pub fn resize(&mut self, playfield: Playfield) {
        if playfield == self.playfield {
            return;
        }
        self.playfield = playfield;
        let scaled = self.scaled();
        self.player.pos.x = scaled.player_x;
        if self.phase == GamePhase::Idle {
            self.player.pos.y = scaled.start_y;
        }
        log::info!(
            "Playfield resized to {}x{} (scale {:.3})",
            playfield.width,
            playfield.height,
            scaled.scale
        );
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
