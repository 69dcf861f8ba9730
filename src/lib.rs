//! Santa Flappy - A holiday side-scrolling arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `session`: Context object tying the core to audio, high scores and the leaderboard
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Score submission with validation and rate limiting
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{HighScores, LocalBest};
pub use session::GameSession;
pub use settings::{PerformanceProfile, Settings};
pub use tuning::Tuning;

/// Game configuration constants
///
/// Every length, speed and acceleration is expressed at the reference
/// resolution and multiplied by the scale factor before use.
pub mod consts {
    /// Nominal logical tick rate (ticks per second)
    pub const NOMINAL_TICK_RATE: f64 = 60.0;
    /// Nominal logical tick interval in milliseconds
    pub const NOMINAL_TICK_MS: f64 = 1000.0 / NOMINAL_TICK_RATE;
    /// Upper bound on the speed multiplier of a single frame (backgrounded tab guard)
    pub const MAX_SPEED_MULTIPLIER: f32 = 3.0;

    /// Reference playfield the constants below were tuned against
    pub const REFERENCE_WIDTH: f32 = 800.0;
    pub const REFERENCE_HEIGHT: f32 = 900.0;

    /// Player physics (pixels per tick, pixels per tick²)
    pub const GRAVITY: f32 = 0.5;
    pub const JUMP_IMPULSE: f32 = -8.0;
    pub const PLAYER_SIZE: f32 = 100.0;
    pub const PLAYER_HITBOX_PADDING: f32 = 20.0;
    /// Player's fixed horizontal position as a fraction of playfield width
    pub const PLAYER_X_FRACTION: f32 = 0.15;
    pub const START_Y: f32 = 300.0;

    /// Banking and death spin (degrees)
    pub const TILT_FACTOR: f32 = 5.0;
    pub const MAX_TILT: f32 = 45.0;
    pub const DEATH_SPIN_PER_TICK: f32 = 10.0;

    /// Obstacles (pipe + tower pairs)
    pub const OBSTACLE_WIDTH: f32 = 90.0;
    pub const OBSTACLE_SPEED: f32 = 3.0;
    pub const PIPE_GAP_DESKTOP: f32 = 180.0;
    pub const PIPE_GAP_MOBILE: f32 = 155.0;
    pub const GROUND_HEIGHT: f32 = 80.0;
    pub const TOWER_HEIGHT_SMALL: f32 = 250.0;
    pub const TOWER_HEIGHT_MEDIUM: f32 = 300.0;
    pub const TOWER_HEIGHT_LARGE: f32 = 350.0;
    /// Target horizontal distance between consecutive obstacles' facing edges
    pub const OBSTACLE_SPACING: f32 = 270.0;
    pub const OBSTACLE_SPACING_TOLERANCE: f32 = 30.0;

    /// Falling gifts
    pub const GIFT_SIZE: f32 = 60.0;
    pub const GIFT_GRAVITY: f32 = 0.3;
    pub const GIFT_BREAK_TICKS: f32 = 30.0;
    pub const GIFT_FALL_MARGIN: f32 = 100.0;
    pub const GIFT_FIRST_DROP_MS: f64 = 1000.0;
    pub const GIFT_DROP_INTERVAL_MS: f64 = 3000.0;
    pub const GIFT_VARIANTS: u8 = 8;

    /// Floating collectibles
    pub const FLOATING_SIZE: f32 = 50.0;
    pub const FLOATING_TOP_MARGIN: f32 = 100.0;
    pub const FLOATING_MIN_SPACING: f32 = 200.0;
    pub const FLOATING_INTERVAL_MIN_MS: f64 = 3000.0;
    pub const FLOATING_INTERVAL_MAX_MS: f64 = 5000.0;

    /// Jump smoke
    pub const SMOKE_SIZE: f32 = 80.0;
    pub const SMOKE_FRAME_MS: f64 = 50.0;
    pub const SMOKE_FRAMES: u32 = 7;
    pub const SMOKE_OFFSET_FIRST: f32 = 50.0;
    pub const SMOKE_OFFSET: f32 = 60.0;

    /// Ground decorations
    pub const DECOR_HEIGHT: f32 = 96.0;
    pub const DECOR_WIDTH_NARROW: f32 = 48.0;
    pub const DECOR_WIDTH_WIDE: f32 = 152.0;
    pub const DECOR_CHANCE: f32 = 0.6;
    pub const DECOR_MIN_SPACING: f32 = 150.0;
    pub const DECOR_TREE_CLEARANCE: f32 = 20.0;
    pub const DECOR_TREE_FOOTPRINT: f32 = 200.0;
    pub const DECOR_DESPAWN_X: f32 = -200.0;

    /// Delayed transitions (milliseconds of simulated time)
    pub const DEATH_CUE_DELAY_MS: f64 = 100.0;
    pub const GAME_OVER_DELAY_MS: f64 = 500.0;
}

