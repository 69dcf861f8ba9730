//! Procedural spawning
//!
//! Obstacles are gated by distance from the last one; gifts, floating
//! collectibles and decorations by sim-time deadlines held in
//! [`SpawnTimers`](super::state::SpawnTimers). Everything appends to the tail of
//! its store and draws from the state's seeded RNG.

use glam::Vec2;
use rand::Rng;

use super::scale::Scaled;
use super::state::{
    Decor, DecorKind, FallingGift, FloatingGift, GameState, Obstacle, TowerSize, TowerStyle,
};
use crate::consts::{DECOR_CHANCE, GIFT_VARIANTS};

/// Bottom of the upper pipe for a tower variant; the gap below it is always `pipe_gap`
pub fn gap_top(size: TowerSize, scaled: &Scaled) -> f32 {
    scaled.ground_top - scaled.tower_height(size) - scaled.pipe_gap
}

/// Distance from the last obstacle's trailing edge to the right screen edge
pub fn trailing_gap(state: &GameState, scaled: &Scaled) -> Option<f32> {
    state
        .obstacles
        .last()
        .map(|last| scaled.width - (last.x + scaled.obstacle_width))
}

/// Whether the next obstacle should enter now
///
/// The gap grows by at most one tick of scroll per check, so spawning once it
/// reaches the target spacing lands it in `[spacing, spacing + scroll)`, inside the
/// tolerance window. A gap already past the window (stalled ticks, or an empty
/// store) also spawns immediately.
pub fn obstacle_due(state: &GameState, scaled: &Scaled) -> bool {
    match trailing_gap(state, scaled) {
        None => true,
        Some(gap) => gap >= scaled.obstacle_spacing,
    }
}

/// Append an obstacle at the right edge. Skipped when the gap would start above the screen.
pub fn spawn_obstacle(state: &mut GameState, scaled: &Scaled) -> Option<u32> {
    let size = TowerSize::ALL[state.rng.random_range(0..TowerSize::ALL.len())];
    let style = TowerStyle::ALL[state.rng.random_range(0..TowerStyle::ALL.len())];
    let gap_top = gap_top(size, scaled);
    if gap_top < 0.0 {
        log::debug!("Skipping {:?} obstacle: gap top {:.1} is off screen", size, gap_top);
        return None;
    }

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        x: scaled.width,
        gap_top,
        size,
        style,
        scored: false,
    });
    log::debug!("Spawned obstacle {} ({:?}, gap top {:.1})", id, size, gap_top);
    Some(id)
}

/// Drop a gift centered under the player
pub fn spawn_gift(state: &mut GameState, scaled: &Scaled) -> u32 {
    let variant = state.rng.random_range(0..GIFT_VARIANTS);
    let id = state.next_entity_id();
    let pos = Vec2::new(
        state.player.pos.x + scaled.player_size / 2.0 - scaled.gift_size / 2.0,
        state.player.pos.y + scaled.player_size,
    );
    state.gifts.push(FallingGift {
        id,
        pos,
        velocity: 0.0,
        breaking: false,
        breaking_ticks: 0.0,
        variant,
    });
    id
}

/// Place a floating collectible in the band between the top margin and the ground
pub fn spawn_floating(state: &mut GameState, scaled: &Scaled) -> Option<u32> {
    let low = scaled.floating_top_margin;
    let high = scaled.ground_top - scaled.floating_size;
    if high <= low {
        log::debug!("Skipping collectible: empty spawn band");
        return None;
    }
    if let Some(last) = state.floating.last()
        && scaled.width - last.pos.x < scaled.floating_min_spacing
    {
        return None;
    }

    let y = state.rng.random_range(low..high);
    let id = state.next_entity_id();
    state.floating.push(FloatingGift {
        id,
        pos: Vec2::new(scaled.width, y),
        collected: false,
    });
    Some(id)
}

/// Maybe place a ground decoration, keeping clear of other props and towers
pub fn spawn_decor(state: &mut GameState, scaled: &Scaled) -> Option<u32> {
    if !state.tuning.decor_enabled || state.rng.random::<f32>() >= DECOR_CHANCE {
        return None;
    }
    let kind = if state.rng.random_bool(0.5) {
        DecorKind::Narrow
    } else {
        DecorKind::Wide
    };

    if let Some(last) = state.decor.last()
        && scaled.width - last.x < scaled.decor_min_spacing
    {
        return None;
    }
    let left = scaled.width;
    let right = scaled.width + scaled.decor_tree_footprint;
    let near_tower = state.obstacles.iter().any(|o| {
        left < o.x + scaled.decor_tree_footprint + scaled.decor_tree_clearance
            && right > o.x - scaled.decor_tree_clearance
    });
    if near_tower {
        return None;
    }

    let id = state.next_entity_id();
    state.decor.push(Decor {
        id,
        x: scaled.width,
        kind,
    });
    Some(id)
}

fn uniform_ms<R: Rng>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// First obstacle and timer arming at the start of a run
pub fn start_run(state: &mut GameState, scaled: &Scaled) {
    spawn_obstacle(state, scaled);

    let now = state.time_ms;
    let floating_delay = uniform_ms(
        &mut state.rng,
        state.tuning.floating_interval_min_ms,
        state.tuning.floating_interval_max_ms,
    );
    let decor_delay = uniform_ms(
        &mut state.rng,
        state.tuning.decor_interval_min_ms,
        state.tuning.decor_interval_max_ms,
    );
    state.timers.next_gift_at_ms = Some(now + state.tuning.gift_first_drop_ms);
    state.timers.next_floating_at_ms = Some(now + floating_delay);
    state.timers.next_decor_at_ms = Some(now + decor_delay);
}

/// Run every spawner whose gate is open. Called once at the end of each tick.
pub fn run(state: &mut GameState, scaled: &Scaled) {
    if !state.phase.is_active() {
        return;
    }

    if obstacle_due(state, scaled) {
        spawn_obstacle(state, scaled);
    }

    let now = state.time_ms;
    if let Some(at) = state.timers.next_gift_at_ms.filter(|&at| now >= at) {
        state.timers.next_gift_at_ms = Some(at + state.tuning.gift_drop_interval_ms);
        spawn_gift(state, scaled);
    }
    if state.timers.next_floating_at_ms.is_some_and(|at| now >= at) {
        let delay = uniform_ms(
            &mut state.rng,
            state.tuning.floating_interval_min_ms,
            state.tuning.floating_interval_max_ms,
        );
        state.timers.next_floating_at_ms = Some(now + delay);
        spawn_floating(state, scaled);
    }
    if state.timers.next_decor_at_ms.is_some_and(|at| now >= at) {
        let delay = uniform_ms(
            &mut state.rng,
            state.tuning.decor_interval_min_ms,
            state.tuning.decor_interval_max_ms,
        );
        state.timers.next_decor_at_ms = Some(now + delay);
        spawn_decor(state, scaled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scale::Playfield;
    use crate::sim::state::GamePhase;
    use crate::tuning::Tuning;

    fn running_state(playfield: Playfield) -> GameState {
        let mut state = GameState::new(42, Tuning::default(), playfield);
        state.phase = GamePhase::Running;
        state
    }

    #[test]
    fn test_gap_invariant_for_every_variant() {
        let tuning = Tuning::default();
        for scale in [0.25_f32, 0.5, 1.0, 1.5, 2.0] {
            let field = Playfield::new(800.0 * scale, 900.0 * scale);
            let scaled = Scaled::resolve(&tuning, field);
            for size in TowerSize::ALL {
                let top = gap_top(size, &scaled);
                let tower_top = scaled.ground_top - scaled.tower_height(size);
                assert!((top + scaled.pipe_gap - tower_top).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_degenerate_gap_skips_spawn() {
        let mut tuning = Tuning::default();
        tuning.pipe_gap = 700.0;
        let field = Playfield::reference(&tuning);
        let mut state = GameState::new(1, tuning, field);
        let scaled = state.scaled();
        assert_eq!(spawn_obstacle(&mut state, &scaled), None);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_spacing_within_window_over_many_spawns() {
        let tuning = Tuning::default();
        let mut state = running_state(Playfield::new(1200.0, 700.0));
        let scaled = state.scaled();
        let target = tuning.obstacle_spacing * scaled.scale;
        let tol = tuning.obstacle_spacing_tolerance * scaled.scale;

        spawn_obstacle(&mut state, &scaled);
        let mut gaps = Vec::new();
        while gaps.len() < 60 {
            for o in &mut state.obstacles {
                o.x -= scaled.obstacle_speed;
            }
            if obstacle_due(&state, &scaled) {
                let gap = trailing_gap(&state, &scaled).unwrap_or(f32::MAX);
                spawn_obstacle(&mut state, &scaled);
                gaps.push(gap);
            }
            state.obstacles.retain(|o| o.x > -2.0 * scaled.obstacle_width);
        }
        for &gap in &gaps {
            assert!(gap >= target - tol && gap <= target + tol, "gap {gap}");
        }
        let mean = gaps.iter().sum::<f32>() / gaps.len() as f32;
        assert!(
            mean >= target - 1e-3 && mean < target + scaled.obstacle_speed,
            "mean gap {mean} vs target {target}"
        );
    }

    #[test]
    fn test_spawn_gate_opens_at_target() {
        let mut state = running_state(Playfield::new(800.0, 900.0));
        let scaled = state.scaled();
        let w = scaled.obstacle_width;
        let target = scaled.obstacle_spacing;
        let tol = scaled.spacing_tolerance;

        spawn_obstacle(&mut state, &scaled);
        // Inside the window but short of the target
        state.obstacles[0].x = scaled.width - w - (target - tol);
        assert!(!obstacle_due(&state, &scaled));
        state.obstacles[0].x = scaled.width - w - target + 0.5;
        assert!(!obstacle_due(&state, &scaled));
        // Target reached
        state.obstacles[0].x = scaled.width - w - target;
        assert!(obstacle_due(&state, &scaled));
        // Maximum allowed gap
        state.obstacles[0].x = scaled.width - w - (target + tol);
        assert!(obstacle_due(&state, &scaled));
        // Past the window (stalled) still spawns immediately
        state.obstacles[0].x = scaled.width - w - (target + tol) * 3.0;
        assert!(obstacle_due(&state, &scaled));
    }

    #[test]
    fn test_gift_timer_cadence() {
        let mut state = running_state(Playfield::new(800.0, 900.0));
        let scaled = state.scaled();
        start_run(&mut state, &scaled);
        state.obstacles.clear();

        state.time_ms = 999.0;
        run(&mut state, &scaled);
        assert!(state.gifts.is_empty());

        state.time_ms = 1000.0;
        run(&mut state, &scaled);
        assert_eq!(state.gifts.len(), 1);
        assert_eq!(state.timers.next_gift_at_ms, Some(4000.0));

        let gift = state.gifts[0];
        assert_eq!(gift.pos.x, scaled.player_x + 50.0 - 30.0);
        assert_eq!(gift.pos.y, state.player.pos.y + 100.0);
        assert!(gift.variant < GIFT_VARIANTS);
    }

    #[test]
    fn test_floating_band_and_spacing() {
        let mut state = running_state(Playfield::new(800.0, 900.0));
        let scaled = state.scaled();
        for _ in 0..20 {
            state.floating.clear();
            let id = spawn_floating(&mut state, &scaled);
            assert!(id.is_some());
            let y = state.floating[0].pos.y;
            assert!(y >= scaled.floating_top_margin);
            assert!(y < scaled.ground_top - scaled.floating_size);
        }
        // Last collectible still near the right edge
        assert_eq!(spawn_floating(&mut state, &scaled), None);
        state.floating[0].pos.x = scaled.width - scaled.floating_min_spacing;
        assert!(spawn_floating(&mut state, &scaled).is_some());
    }

    #[test]
    fn test_decor_disabled() {
        let mut tuning = Tuning::default();
        tuning.decor_enabled = false;
        let field = Playfield::reference(&tuning);
        let mut state = GameState::new(3, tuning, field);
        let scaled = state.scaled();
        for _ in 0..50 {
            assert_eq!(spawn_decor(&mut state, &scaled), None);
        }
    }

    #[test]
    fn test_decor_keeps_clear_of_towers() {
        let mut state = running_state(Playfield::new(800.0, 900.0));
        let scaled = state.scaled();
        spawn_obstacle(&mut state, &scaled);
        for _ in 0..50 {
            assert_eq!(spawn_decor(&mut state, &scaled), None);
        }
        state.obstacles.clear();
        let spawned = (0..50).filter_map(|_| {
            state.decor.clear();
            spawn_decor(&mut state, &scaled)
        });
        assert!(spawned.count() > 0);
    }

    #[test]
    fn test_spawners_idle_outside_run() {
        let mut state = GameState::new(5, Tuning::default(), Playfield::new(800.0, 900.0));
        let scaled = state.scaled();
        run(&mut state, &scaled);
        assert!(state.obstacles.is_empty());
    }
}
