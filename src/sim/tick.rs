//! Simulation tick
//!
//! One logical step of the world. Every per-tick delta is multiplied by the
//! speed multiplier `m` (1.0 at the nominal 60 Hz rate) so a step of `m`
//! covers `m` nominal ticks.

use glam::Vec2;

use super::collision::{
    floating_rect, gift_breaks_on, gift_rect, has_passed, hits_pipe, hits_tower, player_hitbox,
};
use super::scale::Scaled;
use super::spawn;
use super::state::{DeathCause, FallingGift, GamePhase, GameState, ScoreSource};
use crate::consts::{
    DEATH_SPIN_PER_TICK, MAX_TILT, NOMINAL_TICK_MS, SMOKE_FRAME_MS, SMOKE_FRAMES, TILT_FACTOR,
};

/// Advance the game state by one step scaled by `multiplier`
pub fn tick(state: &mut GameState, multiplier: f32) {
    if !state.phase.is_active() {
        return;
    }

    state.time_ms += multiplier as f64 * NOMINAL_TICK_MS;
    state.time_ticks += 1;
    state.process_pending();
    if state.phase == GamePhase::Ended {
        return;
    }

    let scaled = state.scaled();
    integrate_player(state, &scaled, multiplier);
    update_obstacles(state, &scaled, multiplier);
    update_floating(state, &scaled, multiplier);
    update_gifts(state, &scaled, multiplier);
    update_smoke(state);
    update_decor(state, &scaled, multiplier);

    spawn::run(state, &scaled);
}

fn integrate_player(state: &mut GameState, scaled: &Scaled, m: f32) {
    let min_y = scaled.player_min_y();
    let max_y = scaled.player_max_y();

    state.player.pos.y += state.player.velocity * m;

    if state.player.pos.y < min_y {
        state.player.pos.y = min_y;
        state.player.velocity = state.player.velocity.max(0.0);
        state.kill(DeathCause::Ceiling);
    }

    let grounded = state.player.pos.y >= max_y;
    if grounded {
        state.player.pos.y = max_y;
        state.player.velocity = 0.0;
        state.kill(DeathCause::Ground);
        state.arm_game_over();
    } else {
        state.player.velocity += scaled.gravity * m;
    }

    state.player.rotation = if state.player.alive {
        (state.player.velocity * TILT_FACTOR).clamp(-MAX_TILT, MAX_TILT)
    } else {
        state.player.rotation + DEATH_SPIN_PER_TICK * m
    };
}

fn update_obstacles(state: &mut GameState, scaled: &Scaled, m: f32) {
    let dx = scaled.obstacle_speed * m;
    for obstacle in &mut state.obstacles {
        obstacle.x -= dx;
    }
    let limit = -2.0 * scaled.obstacle_width;
    state.obstacles.retain(|o| o.x > limit);

    let hitbox = player_hitbox(&state.player, scaled);
    let mut passed = 0;
    let mut cause = None;
    for obstacle in &mut state.obstacles {
        if !obstacle.scored && has_passed(&hitbox, obstacle, scaled) {
            obstacle.scored = true;
            passed += 1;
        }
        if cause.is_none() {
            if hits_pipe(&hitbox, obstacle, scaled) {
                cause = Some(DeathCause::Pipe);
            } else if hits_tower(&hitbox, obstacle, scaled) {
                cause = Some(DeathCause::Tower);
            }
        }
    }

    for _ in 0..passed {
        state.add_score(ScoreSource::Obstacle);
    }
    if let Some(cause) = cause {
        state.kill(cause);
    }
}

fn update_floating(state: &mut GameState, scaled: &Scaled, m: f32) {
    let dx = scaled.obstacle_speed * m;
    let hitbox = player_hitbox(&state.player, scaled);
    let alive = state.player.alive;
    let mut collected = 0;
    for gift in &mut state.floating {
        gift.pos.x -= dx;
        if alive && !gift.collected && hitbox.overlaps(&floating_rect(gift, scaled)) {
            gift.collected = true;
            collected += 1;
        }
    }
    let limit = -scaled.floating_size;
    state.floating.retain(|g| !g.collected && g.pos.x > limit);

    for _ in 0..collected {
        state.add_score(ScoreSource::Collectible);
    }
}

fn update_gifts(state: &mut GameState, scaled: &Scaled, m: f32) {
    let break_after = state.tuning.gift_break_ticks;
    for gift in &mut state.gifts {
        if !gift.breaking {
            let velocity = gift.velocity + scaled.gift_gravity * m;
            let y = gift.pos.y + velocity * m;
            let next = gift_rect(
                &FallingGift {
                    pos: Vec2::new(gift.pos.x, y),
                    ..*gift
                },
                scaled,
            );
            if state
                .obstacles
                .iter()
                .any(|o| gift_breaks_on(&next, o, scaled))
            {
                gift.breaking = true;
                gift.velocity = 0.0;
            } else {
                gift.velocity = velocity;
                gift.pos.y = y;
            }
        }
        if gift.breaking {
            gift.breaking_ticks += m;
        }
    }

    let floor = scaled.height + scaled.gift_fall_margin;
    state
        .gifts
        .retain(|g| !(g.breaking && g.breaking_ticks > break_after) && g.pos.y < floor);
}

fn update_smoke(state: &mut GameState) {
    let now = state.time_ms;
    for smoke in &mut state.smoke {
        smoke.frame = ((now - smoke.created_at_ms) / SMOKE_FRAME_MS).floor().max(0.0) as u32;
    }
    state.smoke.retain(|s| s.frame < SMOKE_FRAMES);
}

fn update_decor(state: &mut GameState, scaled: &Scaled, m: f32) {
    let dx = scaled.obstacle_speed * m;
    for decor in &mut state.decor {
        decor.x -= dx;
    }
    let limit = scaled.decor_despawn_x;
    state.decor.retain(|d| d.x > limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::scale::Playfield;
    use crate::sim::state::{FloatingGift, GameEvent, Obstacle, TowerSize, TowerStyle};
    use crate::tuning::Tuning;

    /// Running state at reference scale with spawners and effects switched off
    fn quiet_state() -> GameState {
        let mut tuning = Tuning::default();
        tuning.smoke_enabled = false;
        tuning.decor_enabled = false;
        let field = Playfield::reference(&tuning);
        let mut state = GameState::new(12345, tuning, field);
        state.phase = GamePhase::Running;
        // Far-off deadlines so only the obstacle spawner could fire
        state.timers.next_gift_at_ms = None;
        state
    }

    fn park_obstacle(state: &mut GameState, x: f32) {
        // Keeps the obstacle spawner quiet by leaving no trailing gap
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            x,
            gap_top: 0.0,
            size: TowerSize::Small,
            style: TowerStyle::Fantasy,
            scored: true,
        });
    }

    #[test]
    fn test_gravity_scenario() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.player.pos.y = 300.0;
        state.player.velocity = 0.0;

        let mut expected_y = 300.0;
        for _ in 0..10 {
            expected_y += state.player.velocity;
            tick(&mut state, 1.0);
        }
        assert!((state.player.velocity - 10.0 * GRAVITY).abs() < 1e-5);
        assert!((state.player.pos.y - expected_y).abs() < 1e-4);
        assert!((state.player.pos.y - (300.0 + 45.0 * GRAVITY)).abs() < 1e-4);
        assert!(state.player.alive);
    }

    #[test]
    fn test_obstacle_advances_and_is_removed() {
        let mut state = quiet_state();
        let scaled = state.scaled();
        // Keep the player out of harm's way
        state.player.pos.y = 500.0;
        state.obstacles.push(Obstacle {
            id: 99,
            x: scaled.width,
            gap_top: -10_000.0,
            size: TowerSize::Small,
            style: TowerStyle::Green,
            scored: true,
        });

        for n in 1..=10 {
            state.player.velocity = 0.0;
            state.player.pos.y = 200.0;
            tick(&mut state, 1.0);
            let x = state.obstacles[0].x;
            assert!((x - (scaled.width - n as f32 * OBSTACLE_SPEED)).abs() < 1e-3);
        }

        let removal_x = -2.0 * scaled.obstacle_width;
        state.obstacles.truncate(1);
        state.obstacles[0].x = removal_x + OBSTACLE_SPEED + 0.5;
        state.player.pos.y = 200.0;
        state.player.velocity = 0.0;
        tick(&mut state, 1.0);
        assert!(state.obstacles.iter().any(|o| o.id == 99));

        state.player.pos.y = 200.0;
        state.player.velocity = 0.0;
        tick(&mut state, 1.0);
        assert!(state.obstacles.iter().all(|o| o.id != 99));
    }

    #[test]
    fn test_scoring_passes_obstacle_once() {
        let mut state = quiet_state();
        let scaled = state.scaled();
        park_obstacle(&mut state, 790.0);
        let id = state.next_entity_id();
        // Right edge just left of the padded right edge after one tick of scroll
        let hitbox_right = scaled.player_x + scaled.player_size - scaled.hitbox_padding;
        state.obstacles.insert(
            0,
            Obstacle {
                id,
                x: hitbox_right - scaled.obstacle_width + 1.0,
                gap_top: -10_000.0,
                size: TowerSize::Small,
                style: TowerStyle::Green,
                scored: false,
            },
        );
        state.obstacles[1].gap_top = -10_000.0;

        tick(&mut state, 1.0);
        assert_eq!(state.score, 1);
        assert_eq!(state.obstacles_passed, 1);
        tick(&mut state, 1.0);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_pipe_collision_kills_once() {
        let mut state = quiet_state();
        let scaled = state.scaled();
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            x: scaled.player_x,
            gap_top: 500.0,
            size: TowerSize::Small,
            style: TowerStyle::Green,
            scored: false,
        });
        state.player.pos.y = 300.0;

        tick(&mut state, 1.0);
        assert!(!state.player.alive);
        assert_eq!(state.phase, GamePhase::DeadFalling);
        for _ in 0..5 {
            tick(&mut state, 1.0);
        }
        let hits = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Hit { .. }))
            .count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_ground_contact_ends_after_delay() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        let scaled = state.scaled();
        state.player.pos.y = scaled.player_max_y() - 1.0;
        state.player.velocity = 5.0;

        tick(&mut state, 1.0);
        assert!(!state.player.alive);
        assert_eq!(state.player.pos.y, scaled.player_max_y());
        assert_eq!(state.player.velocity, 0.0);
        let armed = state.pending.game_over_at_ms.unwrap_or_default();
        assert!((armed - (state.time_ms + GAME_OVER_DELAY_MS)).abs() < 1e-9);

        let mut ticks = 0;
        while state.phase != GamePhase::Ended {
            tick(&mut state, 1.0);
            ticks += 1;
            assert!(ticks < 100);
        }
        // 500 ms at 16.67 ms per tick
        assert_eq!(ticks, 30);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Died));
        assert!(matches!(events.last(), Some(GameEvent::RunEnded { .. })));

        // Ended is terminal until reset
        let time = state.time_ms;
        tick(&mut state, 1.0);
        assert_eq!(state.time_ms, time);
    }

    #[test]
    fn test_ceiling_clamps_and_kills() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.player.pos.y = 0.0;
        state.player.velocity = -50.0;

        tick(&mut state, 1.0);
        assert_eq!(state.player.pos.y, -PLAYER_HITBOX_PADDING);
        assert!(!state.player.alive);
        assert!(state.player.velocity >= 0.0);
    }

    #[test]
    fn test_dead_player_spins() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.kill(DeathCause::Pipe);
        let before = state.player.rotation;
        tick(&mut state, 1.0);
        assert_eq!(state.player.rotation, before + DEATH_SPIN_PER_TICK);
    }

    #[test]
    fn test_tilt_is_clamped() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.player.velocity = 20.0;
        tick(&mut state, 1.0);
        assert_eq!(state.player.rotation, MAX_TILT);
    }

    #[test]
    fn test_gift_breaks_and_is_removed() {
        let mut state = quiet_state();
        let scaled = state.scaled();
        state.player.pos.y = 200.0;
        let id = state.next_entity_id();
        state.obstacles.push(Obstacle {
            id,
            x: 790.0,
            gap_top: 100.0,
            size: TowerSize::Small,
            style: TowerStyle::Green,
            scored: true,
        });
        // Gift inside the obstacle span, falling onto the tower below the gap
        let bottom_of_gap = 100.0 + scaled.pipe_gap;
        state.gifts.push(FallingGift {
            id: 500,
            pos: Vec2::new(720.0, bottom_of_gap - scaled.gift_size - 0.1),
            velocity: 0.0,
            breaking: false,
            breaking_ticks: 0.0,
            variant: 0,
        });

        // The obstacle scrolls under the gift on the way
        let mut ticks = 0;
        while !state.gifts.iter().any(|g| g.id == 500 && g.breaking) {
            state.player.pos.y = 200.0;
            state.player.velocity = 0.0;
            tick(&mut state, 1.0);
            ticks += 1;
            assert!(ticks < 60, "gift never broke");
        }
        let y = state.gifts[0].pos.y;
        for _ in 0..29 {
            state.player.pos.y = 200.0;
            state.player.velocity = 0.0;
            tick(&mut state, 1.0);
        }
        // Held in place while breaking, counter now at 30
        assert_eq!(state.gifts.len(), 1);
        assert_eq!(state.gifts[0].pos.y, y);
        assert_eq!(state.gifts[0].velocity, 0.0);

        state.player.pos.y = 200.0;
        state.player.velocity = 0.0;
        tick(&mut state, 1.0);
        assert!(state.gifts.is_empty());
    }

    #[test]
    fn test_gift_falls_off_screen() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.gifts.push(FallingGift {
            id: 600,
            pos: Vec2::new(10.0, 950.0),
            velocity: 60.0,
            breaking: false,
            breaking_ticks: 0.0,
            variant: 3,
        });
        state.player.pos.y = 200.0;
        tick(&mut state, 1.0);
        assert!(state.gifts.is_empty());
    }

    #[test]
    fn test_collectible_scores_only_while_alive() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        let pos = Vec2::new(state.player.pos.x + 30.0, state.player.pos.y + 30.0);
        state.floating.push(FloatingGift {
            id: 700,
            pos,
            collected: false,
        });
        tick(&mut state, 1.0);
        assert_eq!(state.score, 1);
        assert_eq!(state.collectibles, 1);
        assert!(state.floating.is_empty());

        state.kill(DeathCause::Pipe);
        let pos = Vec2::new(state.player.pos.x + 30.0, state.player.pos.y + 30.0);
        state.floating.push(FloatingGift {
            id: 701,
            pos,
            collected: false,
        });
        tick(&mut state, 1.0);
        assert_eq!(state.score, 1);
        assert_eq!(state.floating.len(), 1);
    }

    #[test]
    fn test_smoke_expires_after_seven_frames() {
        let mut state = quiet_state();
        park_obstacle(&mut state, 790.0);
        state.obstacles[0].gap_top = -1000.0;
        state.tuning.smoke_enabled = true;
        state.jump();
        assert_eq!(state.smoke.len(), 1);

        // 7 frames * 50 ms = 350 ms, about 21 ticks
        for _ in 0..20 {
            tick(&mut state, 1.0);
        }
        assert_eq!(state.smoke.len(), 1);
        assert_eq!(state.smoke[0].frame, 6);
        tick(&mut state, 1.0);
        tick(&mut state, 1.0);
        assert!(state.smoke.is_empty());
    }

    #[test]
    fn test_idle_does_not_advance() {
        let tuning = Tuning::default();
        let field = Playfield::reference(&tuning);
        let mut state = GameState::new(1, tuning, field);
        let y = state.player.pos.y;
        tick(&mut state, 1.0);
        assert_eq!(state.player.pos.y, y);
        assert_eq!(state.time_ms, 0.0);
    }

    #[test]
    fn test_multiplier_scales_deltas() {
        let mut a = quiet_state();
        park_obstacle(&mut a, 790.0);
        a.obstacles[0].gap_top = -1000.0;
        a.player.velocity = 2.0;
        let mut b = a.clone();

        tick(&mut a, 0.5);
        tick(&mut b, 1.0);
        assert!((a.player.pos.y - 301.0).abs() < 1e-5);
        assert!((b.player.pos.y - 302.0).abs() < 1e-5);
        assert!((a.player.velocity - (2.0 + 0.5 * GRAVITY)).abs() < 1e-6);
    }
}
