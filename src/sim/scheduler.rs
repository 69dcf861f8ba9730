//! Frame-driven scheduler
//!
//! The display refresh callback only wakes the simulation up. Each wake-up is
//! turned into a [`FramePlan`]: how many ticks to run and the speed multiplier
//! of each, so the world moves at the same pace on a 30 Hz or 144 Hz display.

use super::state::GameState;
use super::tick::tick;
use crate::consts::NOMINAL_TICK_MS;

/// Wake-ups shorter than the tick interval by less than this still run
const INTERVAL_SLACK_MS: f64 = 1e-3;

/// Work to do for one wake-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    /// Number of ticks to run
    pub steps: u32,
    /// Speed multiplier of each tick (at most 1.0)
    pub multiplier: f32,
    /// Whether the frame delta was cut down to the multiplier cap
    pub clamped: bool,
}

impl FramePlan {
    pub const IDLE: FramePlan = FramePlan {
        steps: 0,
        multiplier: 0.0,
        clamped: false,
    };

    pub fn is_idle(&self) -> bool {
        self.steps == 0
    }

    /// Total nominal ticks covered by this plan
    pub fn total_multiplier(&self) -> f32 {
        self.steps as f32 * self.multiplier
    }
}

/// Converts wall-clock wake-ups into tick plans
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval_ms: f64,
    max_multiplier: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(max_multiplier: f32) -> Self {
        Self {
            interval_ms: NOMINAL_TICK_MS,
            max_multiplier: f64::from(max_multiplier.max(1.0)),
            last_ms: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }

    /// Forget the last wake-up; the next one only primes the clock
    pub fn stop(&mut self) {
        self.last_ms = None;
    }

    /// Plan the ticks for a wake-up at `now_ms`
    pub fn advance(&mut self, now_ms: f64) -> FramePlan {
        let Some(last) = self.last_ms else {
            self.last_ms = Some(now_ms);
            return FramePlan::IDLE;
        };

        let delta = now_ms - last;
        if delta < 0.0 {
            log::warn!("Frame clock went backwards by {:.1}ms", -delta);
            self.last_ms = Some(now_ms);
            return FramePlan::IDLE;
        }
        if delta + INTERVAL_SLACK_MS < self.interval_ms {
            // Too early: keep accumulating from the last accepted tick
            return FramePlan::IDLE;
        }
        self.last_ms = Some(now_ms);

        let mut multiplier = delta / self.interval_ms;
        let clamped = multiplier > self.max_multiplier;
        if clamped {
            log::warn!(
                "Frame delta {:.1}ms clamped to {:.1}x nominal tick",
                delta,
                self.max_multiplier
            );
            multiplier = self.max_multiplier;
        }

        let steps = (multiplier - 1e-6).ceil().max(1.0);
        FramePlan {
            steps: steps as u32,
            multiplier: (multiplier / steps) as f32,
            clamped,
        }
    }
}

/// Run the ticks of a plan against the state
pub fn run_plan(state: &mut GameState, plan: FramePlan) {
    for _ in 0..plan.steps {
        tick(state, plan.multiplier);
    }
}
