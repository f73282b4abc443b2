//! The simulation step
//!
//! `tick` is called once per display frame with that frame's timestamp.
//! While playing it runs one full step; in the menu and game over screens it
//! only services lifecycle actions and the game over sequence.

use super::collision::{actor_rect, collect_pickups, lethal_hit};
use super::input::{Intent, TickInput};
use super::run::GlideTick;
use super::state::{GameEvent, GameState, Lifecycle};
use crate::consts::*;
use crate::tuning::Tuning;

/// What a call to `tick` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// In the menu, nothing simulated
    Idle,
    /// A step ran (or a run just started); schedule the next one
    Continue,
    /// A lethal collision ended the run on this step
    Crashed,
    /// Simulation halted (game over screen)
    Halted,
}

/// Scroll speed from the square-root difficulty curve, before boosts
pub fn difficulty_speed(score: u32, tuning: &Tuning) -> f32 {
    let bonus = tuning.difficulty_coefficient * (score as f32).sqrt();
    tuning.base_speed + bonus.min(tuning.difficulty_cap)
}

/// Advance the game by one frame
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) -> StepOutcome {
    if input.toggle_collisions {
        state.toggle_collisions();
    }
    if input.toggle_hitboxes {
        state.toggle_hitboxes();
    }

    match state.lifecycle {
        Lifecycle::Menu => {
            if input.primary && state.start(now_ms) {
                carry_holds(state, input);
                StepOutcome::Continue
            } else {
                StepOutcome::Idle
            }
        }
        Lifecycle::GameOver => {
            state.poll_game_over(now_ms);
            if (input.restart || input.primary) && state.restart(now_ms) {
                carry_holds(state, input);
                StepOutcome::Continue
            } else {
                StepOutcome::Halted
            }
        }
        Lifecycle::Playing => step(state, input, now_ms),
    }
}

/// Holds already down when a run begins are not fresh edges
fn carry_holds(state: &mut GameState, input: &TickInput) {
    state.prev_ascend = input.ascend;
    state.prev_both = input.ascend && input.descend;
}

fn step(state: &mut GameState, input: &TickInput, now_ms: f64) -> StepOutcome {
    let tuning = &state.tuning;
    let dt = state.clock.advance(now_ms, tuning.max_dt);

    // Recomputed every step so charge changes apply immediately
    let intent = Intent::arbitrate(input.ascend, input.descend, state.run.glide_charges);
    let multiplier = intent.speed_multiplier(
        state.run.glide_active,
        tuning.boost_multiplier,
        tuning.glide_boost_multiplier,
    );
    let speed = difficulty_speed(state.run.score, tuning) * multiplier;
    state.speed = speed;
    state.bg_offset = (state.bg_offset + speed * dt * PARALLAX_FACTOR).rem_euclid(WORLD_WIDTH);

    if state.run.tick_glide(dt, now_ms, tuning) == GlideTick::Ended {
        log::debug!("Glide ended");
        state.events.push(GameEvent::GlideEnded);
    }

    let newly_both = intent.both_raw && !state.prev_both;
    if newly_both && state.run.try_activate_glide(now_ms, tuning) {
        log::debug!("Glide activated ({} charges left)", state.run.glide_charges);
        state.events.push(GameEvent::GlideActivated);
    }

    if intent.ascend && !state.prev_ascend {
        state.actor.jump(tuning.jump_impulse);
    }
    state.prev_ascend = intent.ascend;
    state.prev_both = intent.both_raw;

    state
        .actor
        .step(dt, &intent, state.run.glide_active, tuning);

    let distance = speed * dt;
    for obstacle in &mut state.obstacles {
        obstacle.advance(distance);
    }
    state.obstacles.retain(|o| !o.is_offscreen());
    if let Some(obstacle) = state.spawner.advance(distance, tuning) {
        state.obstacles.push(obstacle);
    }

    state.run.add_distance(dt, tuning.score_rate);

    let hitbox = actor_rect(&state.actor);
    let pickups = collect_pickups(&hitbox, &mut state.obstacles);
    for _ in 0..pickups.sticks {
        state.run.collect_stick();
        state.events.push(GameEvent::StickCollected);
    }
    for _ in 0..pickups.charges {
        state.run.collect_charge();
        state.events.push(GameEvent::ChargeCollected);
    }

    state.steps += 1;

    if state.collisions_enabled && lethal_hit(&hitbox, &state.obstacles) {
        state.crash(now_ms);
        return StepOutcome::Crashed;
    }
    StepOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::HighScore;
    use crate::sim::collision::obstacle_rect;
    use crate::sim::gameover::GameOverPhase;
    use crate::sim::obstacle::{Collectible, Obstacle, ObstacleKind, ObstacleType};
    use proptest::prelude::*;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn playing_state() -> GameState {
        let mut state = GameState::new(12345, Tuning::default(), HighScore::default(), 0.0);
        state.assets.mark_loaded();
        let input = TickInput {
            primary: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &input, 0.0), StepOutcome::Continue);
        state
    }

    fn held(ascend: bool, descend: bool) -> TickInput {
        TickInput {
            ascend,
            descend,
            ..Default::default()
        }
    }

    #[test]
    fn difficulty_curve() {
        let tuning = Tuning::default();
        assert_eq!(difficulty_speed(0, &tuning), 30.0);
        assert!((difficulty_speed(625, &tuning) - 45.0).abs() < 1e-4);
        assert_eq!(difficulty_speed(10_000, &tuning), 54.0);
    }

    #[test]
    fn menu_ignores_steps_until_primary() {
        let mut state = GameState::new(1, Tuning::default(), HighScore::default(), 0.0);
        state.assets.mark_loaded();
        assert_eq!(tick(&mut state, &held(true, false), 16.0), StepOutcome::Idle);
        assert_eq!(state.lifecycle, Lifecycle::Menu);
        assert_eq!(state.steps, 0);
    }

    #[test]
    fn floor_obstacle_ends_run_on_the_exact_step() {
        let mut state = playing_state();
        let hitbox = actor_rect(&state.actor);
        // Just right of the hitbox; one 50ms step at 30 u/s moves it 1.5 left
        let mut wall = Obstacle::with_type(900, 0.0, ObstacleType::Floor);
        wall.x = hitbox.max.x + 1.0;
        state.obstacles.push(wall);

        let steps_before = state.steps;
        let outcome = tick(&mut state, &TickInput::default(), 50.0);
        assert_eq!(outcome, StepOutcome::Crashed);
        assert_eq!(state.lifecycle, Lifecycle::GameOver);
        assert_eq!(state.steps, steps_before + 1);

        let frozen_actor = state.actor.clone();
        let frozen_obstacles = state.obstacles.clone();
        for i in 1..30 {
            let outcome = tick(&mut state, &held(true, false), 50.0 + i as f64 * FRAME_MS);
            assert_eq!(outcome, StepOutcome::Halted);
        }
        assert_eq!(state.steps, steps_before + 1);
        assert_eq!(state.actor, frozen_actor);
        assert_eq!(state.obstacles, frozen_obstacles);
    }

    #[test]
    fn collisions_can_be_disabled() {
        let mut state = playing_state();
        let toggle = TickInput {
            toggle_collisions: true,
            ..Default::default()
        };
        tick(&mut state, &toggle, 1.0);
        assert!(!state.collisions_enabled);

        let mut wall = Obstacle::with_type(900, 0.0, ObstacleType::Floor);
        wall.x = ACTOR_X;
        state.obstacles.push(wall);
        assert_eq!(tick(&mut state, &TickInput::default(), 17.0), StepOutcome::Continue);
        assert!(state.is_playing());
    }

    #[test]
    fn pickups_still_work_with_collisions_disabled() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        let mut tree = Obstacle::with_type(900, 0.0, ObstacleType::Middle);
        tree.x = ACTOR_X - 8.0;
        if let ObstacleKind::Middle { stick, .. } = &mut tree.kind {
            *stick = Some(Collectible::stick());
        }
        state.obstacles.push(tree);

        tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(state.run.sticks, 1);
        assert!(state.drain_events().contains(&GameEvent::StickCollected));
    }

    #[test]
    fn collected_pickups_never_count_twice() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        let mut slot = Obstacle::with_type(900, 0.0, ObstacleType::Empty);
        slot.kind = ObstacleKind::Empty {
            charge: Some(Collectible::charge()),
        };
        slot.x = ACTOR_X - 6.0;
        state.obstacles.push(slot);

        // Park the actor at the ceiling where the charge hangs
        let mut now = 0.0;
        for _ in 0..300 {
            now += FRAME_MS;
            tick(&mut state, &held(true, false), now);
            state.obstacles.retain(|o| o.id == 900);
            if let Some(slot) = state.obstacles.first_mut() {
                slot.x = ACTOR_X - 6.0;
            }
        }
        assert_eq!(state.run.glide_charges, 1);
        assert_eq!(state.run.charges_collected, 1);
    }

    #[test]
    fn glide_freezes_and_boosts() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        state.run.glide_charges = 1;
        state.actor.y = 30.0;
        state.actor.on_ground = false;

        tick(&mut state, &held(true, true), 16.0);
        assert!(state.run.glide_active);
        assert_eq!(state.run.glide_charges, 0);
        assert!(state.actor.gliding);
        let base = difficulty_speed(state.run.score, &state.tuning);
        // Speed for this step was computed before activation
        tick(&mut state, &held(true, true), 32.0);
        assert_eq!(state.speed, base * 3.0);
        assert_eq!(state.actor.y, 30.0);
    }

    #[test]
    fn glide_does_not_retrigger_while_held() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        state.run.glide_charges = 2;

        let mut now = 0.0;
        // 7s of continuous double hold: one 5s glide, then nothing new
        for _ in 0..420 {
            now += FRAME_MS;
            tick(&mut state, &held(true, true), now);
        }
        assert_eq!(state.run.glide_charges, 1);
        assert!(!state.run.glide_active);

        // Release and press again after the cooldown
        now += FRAME_MS;
        tick(&mut state, &TickInput::default(), now);
        now += FRAME_MS;
        tick(&mut state, &held(true, true), now);
        assert!(state.run.glide_active);
        assert_eq!(state.run.glide_charges, 0);
    }

    #[test]
    fn ascend_from_ground_jumps_once() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        tick(&mut state, &held(true, false), 16.0);
        assert!(!state.actor.on_ground);
        assert!(state.actor.vy > 0.0);
    }

    #[test]
    fn descend_without_charges_blocks_ascend() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        state.tuning.difficulty_coefficient = 0.0;
        let mut now = 0.0;
        for _ in 0..60 {
            now += FRAME_MS;
            tick(&mut state, &held(true, true), now);
            assert_eq!(state.actor.y, state.tuning.floor_level);
        }
        assert!(state.actor.ducking);
        assert_eq!(state.speed, 30.0 * 1.5);
    }

    #[test]
    fn parallax_wraps() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        let mut now = 0.0;
        for _ in 0..2000 {
            now += 50.0;
            tick(&mut state, &TickInput::default(), now);
            assert!((0.0..WORLD_WIDTH).contains(&state.bg_offset));
        }
    }

    #[test]
    fn recap_timing_from_crash() {
        let mut state = playing_state();
        state.crash(0.0);

        tick(&mut state, &TickInput::default(), 1499.0);
        assert_eq!(state.game_over.as_ref().unwrap().phase, GameOverPhase::Panel);
        tick(&mut state, &TickInput::default(), 1500.0);
        assert_eq!(state.game_over.as_ref().unwrap().phase, GameOverPhase::Recap);
        tick(&mut state, &TickInput::default(), 3600.0);
        assert_eq!(state.game_over.as_ref().unwrap().recap_step, 4);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &restart, 3899.0), StepOutcome::Halted);
        assert_eq!(tick(&mut state, &restart, 3900.0), StepOutcome::Continue);
        assert!(state.is_playing());
    }

    #[test]
    fn restart_mid_recap_leaves_nothing_behind() {
        let mut state = playing_state();
        state.run.score = 5000;
        state.crash(0.0);
        tick(&mut state, &TickInput::default(), 3900.0);
        // Final score was revealed at 3600 but is still counting up
        assert_eq!(state.high_score.best, 5000);
        assert!(!state.game_over.as_ref().unwrap().show_record_message);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &restart, 3900.0), StepOutcome::Continue);
        state.collisions_enabled = false;
        // Later frames only ever see the new run
        for i in 1..200 {
            tick(&mut state, &TickInput::default(), 3900.0 + i as f64 * FRAME_MS);
            assert!(state.game_over.is_none());
        }
        assert_eq!(state.high_score.best, 5000);
    }

    #[test]
    fn new_record_weighted() {
        let mut state = GameState::new(1, Tuning::default(), HighScore { best: 1000 }, 0.0);
        state.assets.mark_loaded();
        state.start(0.0);
        state.run.score = 800;
        state.run.sticks = 2;
        state.run.charges_collected = 4;
        state.crash(0.0);

        tick(&mut state, &TickInput::default(), 3599.0);
        assert_eq!(state.high_score.best, 1000);
        tick(&mut state, &TickInput::default(), 3600.0);
        assert_eq!(state.game_over.as_ref().unwrap().is_new_record, Some(true));
        assert_eq!(state.high_score.best, 1200);
        assert!(state.drain_events().contains(&GameEvent::NewRecord(1200)));
    }

    #[test]
    fn deterministic_for_same_seed() {
        let run = || {
            let mut state = playing_state();
            let mut now = 0.0;
            for i in 0..2000 {
                now += FRAME_MS;
                let input = held(i % 90 < 20, i % 130 > 120);
                if tick(&mut state, &input, now) == StepOutcome::Crashed {
                    break;
                }
            }
            (state.steps, state.run.clone(), state.obstacles.clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn start_key_held_as_ascend_does_not_jump() {
        let mut state = GameState::new(3, Tuning::default(), HighScore::default(), 0.0);
        state.assets.mark_loaded();
        state.collisions_enabled = false;
        let space = TickInput {
            ascend: true,
            primary: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &space, 0.0), StepOutcome::Continue);
        tick(&mut state, &held(true, false), 16.0);
        assert!(state.actor.vy < state.tuning.jump_impulse);

        // Releasing and pressing again is a real jump
        state.actor = crate::sim::Actor::new(state.tuning.floor_level);
        tick(&mut state, &held(false, false), 32.0);
        tick(&mut state, &held(true, false), 48.0);
        assert!(state.actor.vy >= state.tuning.jump_impulse);
    }

    #[test]
    fn restart_key_held_as_ascend_does_not_jump() {
        let mut state = playing_state();
        state.collisions_enabled = false;
        state.crash(0.0);
        tick(&mut state, &TickInput::default(), 3900.0);
        let space = TickInput {
            ascend: true,
            primary: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &space, 3900.0), StepOutcome::Continue);
        tick(&mut state, &held(true, false), 3916.0);
        assert!(state.actor.vy < state.tuning.jump_impulse);
    }

    proptest! {
        #[test]
        fn actor_stays_in_bounds_and_empties_never_kill(
            holds in proptest::collection::vec((any::<bool>(), any::<bool>()), 1..400),
            frame in 1.0f64..120.0,
        ) {
            let mut state = playing_state();
            let mut now = 0.0;
            for (ascend, descend) in holds {
                now += frame;
                let outcome = tick(&mut state, &held(ascend, descend), now);
                let actor = &state.actor;
                prop_assert!(actor.y >= state.tuning.floor_level);
                prop_assert!(actor.y <= state.tuning.ceiling_level);
                if actor.y == state.tuning.floor_level {
                    prop_assert!(actor.on_ground);
                    prop_assert_eq!(actor.vy, 0.0);
                }
                if outcome == StepOutcome::Crashed {
                    let hitbox = actor_rect(actor);
                    let killer = state
                        .obstacles
                        .iter()
                        .filter(|o| hitbox.overlaps(&obstacle_rect(o)))
                        .any(|o| o.obstacle_type() != ObstacleType::Empty);
                    prop_assert!(killer);
                    break;
                }
            }
        }
    }
}
