//! Game state and lifecycle
//!
//! Everything the step function reads or writes across frames lives on
//! `GameState`; there is no other hidden state.

use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::clock::SimClock;
use super::gameover::GameOverSequence;
use super::obstacle::{Obstacle, Spawner};
use super::run::{FinalRun, RunState};
use crate::highscores::HighScore;
use crate::tuning::Tuning;

/// Top-level lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Waiting for the primary action
    Menu,
    /// Simulation running
    Playing,
    /// Run ended; see `GameState::game_over`
    GameOver,
}

/// Notable things that happened during a step, drained by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { run: u32 },
    GlideActivated,
    GlideEnded,
    StickCollected,
    ChargeCollected,
    Crashed(FinalRun),
    /// Session record beaten; the driver persists it
    NewRecord(u32),
}

/// Holds the menu until required assets load, or the fallback deadline passes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetGate {
    mounted_at_ms: f64,
    loaded: bool,
}

impl AssetGate {
    pub fn new(mounted_at_ms: f64) -> Self {
        Self {
            mounted_at_ms,
            loaded: false,
        }
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn is_ready(&self, now_ms: f64, fallback_ms: f64) -> bool {
        self.loaded || now_ms - self.mounted_at_ms >= fallback_ms
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Session seed; each run derives its own spawner seed from it
    pub seed: u64,
    pub lifecycle: Lifecycle,
    pub clock: SimClock,
    pub actor: Actor,
    pub run: RunState,
    /// Active obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    pub spawner: Spawner,
    /// Present only while `lifecycle == GameOver`
    pub game_over: Option<GameOverSequence>,
    pub assets: AssetGate,
    pub high_score: HighScore,
    /// Debug: lethal collisions on/off (pickups are unaffected)
    pub collisions_enabled: bool,
    /// Debug: include hitboxes in frame snapshots
    pub show_hitboxes: bool,
    /// Scroll speed of the last step (units/s)
    pub speed: f32,
    /// Background parallax offset, wraps at the world width
    pub bg_offset: f32,
    /// Simulation steps taken this run
    pub steps: u64,
    /// Runs started this session
    pub runs: u32,
    pub(crate) prev_ascend: bool,
    pub(crate) prev_both: bool,
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(seed: u64, tuning: Tuning, high_score: HighScore, now_ms: f64) -> Self {
        Self {
            actor: Actor::new(tuning.floor_level),
            speed: tuning.base_speed,
            tuning,
            seed,
            lifecycle: Lifecycle::Menu,
            clock: SimClock::new(),
            run: RunState::new(),
            obstacles: Vec::new(),
            spawner: Spawner::new(seed),
            game_over: None,
            assets: AssetGate::new(now_ms),
            high_score,
            collisions_enabled: true,
            show_hitboxes: false,
            bg_offset: 0.0,
            steps: 0,
            runs: 0,
            prev_ascend: false,
            prev_both: false,
            events: Vec::new(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lifecycle == Lifecycle::Playing
    }

    /// True once the player died this run
    pub fn is_crashed(&self) -> bool {
        self.lifecycle == Lifecycle::GameOver
    }

    pub fn assets_ready(&self, now_ms: f64) -> bool {
        self.assets.is_ready(now_ms, self.tuning.asset_fallback_ms)
    }

    /// Menu -> Playing. Ignored outside the menu or while assets are loading.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.lifecycle != Lifecycle::Menu || !self.assets_ready(now_ms) {
            return false;
        }
        self.begin_run(now_ms);
        true
    }

    /// GameOver -> Playing. Ignored until the restart gate opens.
    pub fn restart(&mut self, now_ms: f64) -> bool {
        let gate_open = self
            .game_over
            .as_ref()
            .is_some_and(|seq| seq.allow_restart);
        if self.lifecycle != Lifecycle::GameOver || !gate_open {
            return false;
        }
        self.begin_run(now_ms);
        true
    }

    /// Reset every per-run field and start stepping from `now_ms`
    fn begin_run(&mut self, now_ms: f64) {
        self.runs += 1;
        self.actor = Actor::new(self.tuning.floor_level);
        self.run = RunState::new();
        self.obstacles.clear();
        self.spawner = Spawner::new(self.seed.wrapping_add(self.runs as u64));
        self.game_over = None;
        self.speed = self.tuning.base_speed;
        self.bg_offset = 0.0;
        self.steps = 0;
        self.prev_ascend = false;
        self.prev_both = false;
        self.clock.reset(now_ms);
        self.lifecycle = Lifecycle::Playing;
        self.events.push(GameEvent::RunStarted { run: self.runs });
        log::info!("Run {} started", self.runs);
    }

    /// Playing -> GameOver
    pub(crate) fn crash(&mut self, now_ms: f64) {
        let final_run = self.run.finish(&self.tuning);
        log::info!(
            "Crashed at distance {} (sticks {}, charges {}, weighted {})",
            final_run.score,
            final_run.sticks,
            final_run.charges,
            final_run.weighted
        );
        self.game_over = Some(GameOverSequence::new(now_ms, final_run));
        self.lifecycle = Lifecycle::GameOver;
        self.events.push(GameEvent::Crashed(final_run));
    }

    /// Advance the game over sequence; records a new high score when the
    /// final score is revealed
    pub(crate) fn poll_game_over(&mut self, now_ms: f64) {
        let Some(seq) = self.game_over.as_mut() else {
            return;
        };
        let Some(is_record) = seq.update(now_ms, &self.tuning, self.high_score.best) else {
            return;
        };
        if is_record && self.high_score.submit(seq.final_run.weighted) {
            log::info!("New session record: {}", self.high_score.best);
            self.events.push(GameEvent::NewRecord(self.high_score.best));
        }
    }

    pub fn toggle_collisions(&mut self) {
        self.collisions_enabled = !self.collisions_enabled;
        log::info!("Collisions: {}", self.collisions_enabled);
    }

    pub fn toggle_hitboxes(&mut self) {
        self.show_hitboxes = !self.show_hitboxes;
        log::info!("Hitboxes: {}", self.show_hitboxes);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> GameState {
        GameState::new(1, Tuning::default(), HighScore::default(), 0.0)
    }

    #[test]
    fn start_waits_for_assets_or_fallback() {
        let mut state = new_state();
        assert!(!state.start(100.0));
        assert_eq!(state.lifecycle, Lifecycle::Menu);

        assert!(state.start(1500.0));
        assert_eq!(state.lifecycle, Lifecycle::Playing);
    }

    #[test]
    fn loaded_assets_start_immediately() {
        let mut state = new_state();
        state.assets.mark_loaded();
        assert!(state.start(1.0));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::RunStarted { run: 1 }]
        );
    }

    #[test]
    fn start_only_from_menu() {
        let mut state = new_state();
        state.assets.mark_loaded();
        assert!(state.start(0.0));
        assert!(!state.start(10.0));
        assert_eq!(state.runs, 1);
    }

    #[test]
    fn restart_waits_for_gate() {
        let mut state = new_state();
        state.assets.mark_loaded();
        state.start(0.0);
        state.crash(1000.0);
        assert!(state.is_crashed());

        assert!(!state.restart(1100.0));
        state.poll_game_over(1000.0 + 3899.0);
        assert!(!state.restart(1000.0 + 3899.0));
        state.poll_game_over(1000.0 + 3900.0);
        assert!(state.restart(1000.0 + 3900.0));
        assert!(state.is_playing());
        assert!(state.game_over.is_none());
    }

    #[test]
    fn restart_resets_run() {
        let mut state = new_state();
        state.assets.mark_loaded();
        state.start(0.0);
        state.run.score = 99;
        state.run.sticks = 3;
        state.obstacles.push(Obstacle::with_type(
            1,
            50.0,
            crate::sim::obstacle::ObstacleType::Floor,
        ));
        state.crash(0.0);
        state.poll_game_over(10_000.0);
        assert!(state.restart(10_000.0));

        assert_eq!(state.run, RunState::new());
        assert!(state.obstacles.is_empty());
        assert_eq!(state.actor, Actor::new(state.tuning.floor_level));
        assert_eq!(state.runs, 2);
    }
}
