//! Frame driver
//!
//! Owns the simulation plus its collaborators: the session store and the
//! render surface gate. The browser loop (or the headless demo) calls
//! `frame` once per display refresh and draws the returned snapshot.

use crate::highscores::HighScore;
use crate::persistence::SessionStore;
use crate::sim::{FrameSnapshot, GameEvent, GameState, StepOutcome, TickInput, tick};
use crate::tuning::Tuning;

pub struct PlayChannel<S: SessionStore> {
    state: GameState,
    store: S,
    surface_attached: bool,
    last_outcome: StepOutcome,
}

impl<S: SessionStore> PlayChannel<S> {
    /// Mount: read the session record once
    pub fn new(store: S, tuning: Tuning, seed: u64, now_ms: f64) -> Self {
        let high_score = HighScore::load(&store);
        log::info!("PlayChannel mounted with seed {seed}");
        Self {
            state: GameState::new(seed, tuning, high_score, now_ms),
            store,
            surface_attached: false,
            last_outcome: StepOutcome::Idle,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn attach_surface(&mut self) {
        self.surface_attached = true;
    }

    pub fn detach_surface(&mut self) {
        self.surface_attached = false;
    }

    pub fn mark_assets_loaded(&mut self) {
        log::info!("Assets loaded");
        self.state.assets.mark_loaded();
    }

    /// Lifecycle action: menu -> playing
    pub fn start(&mut self, now_ms: f64) -> bool {
        self.surface_attached && self.state.start(now_ms)
    }

    /// Lifecycle action: game over -> playing, once the gate is open
    pub fn restart(&mut self, now_ms: f64) -> bool {
        self.surface_attached && self.state.restart(now_ms)
    }

    pub fn toggle_collisions(&mut self) {
        self.state.toggle_collisions();
    }

    pub fn toggle_hitboxes(&mut self) {
        self.state.toggle_hitboxes();
    }

    pub fn last_outcome(&self) -> StepOutcome {
        self.last_outcome
    }

    /// Run one frame. Nothing happens until a render surface is attached.
    pub fn frame(&mut self, input: &TickInput, now_ms: f64) -> Option<FrameSnapshot> {
        if !self.surface_attached {
            return None;
        }
        self.last_outcome = tick(&mut self.state, input, now_ms);
        for event in self.state.drain_events() {
            self.handle_event(event);
        }
        Some(FrameSnapshot::capture(&self.state))
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::NewRecord(score) => HighScore { best: score }.save(&mut self.store),
            GameEvent::Crashed(final_run) => {
                log::debug!("Final run: {final_run:?}");
            }
            other => log::trace!("{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::HIGH_SCORE_KEY;
    use crate::persistence::MemoryStore;
    use crate::sim::Lifecycle;

    fn primary() -> TickInput {
        TickInput {
            primary: true,
            ..Default::default()
        }
    }

    #[test]
    fn nothing_runs_without_a_surface() {
        let mut game = PlayChannel::new(MemoryStore::new(), Tuning::default(), 1, 0.0);
        game.mark_assets_loaded();
        assert!(game.frame(&primary(), 10.0).is_none());
        assert!(!game.start(10.0));
        assert_eq!(game.state().lifecycle, Lifecycle::Menu);

        game.attach_surface();
        let frame = game.frame(&primary(), 20.0).unwrap();
        assert_eq!(frame.lifecycle, Lifecycle::Playing);
    }

    #[test]
    fn detached_surface_pauses_the_loop() {
        let mut game = PlayChannel::new(MemoryStore::new(), Tuning::default(), 1, 0.0);
        game.attach_surface();
        game.mark_assets_loaded();
        game.frame(&primary(), 0.0);
        let steps = game.state().steps;

        game.detach_surface();
        assert!(game.frame(&TickInput::default(), 16.0).is_none());
        assert_eq!(game.state().steps, steps);

        game.attach_surface();
        assert!(game.frame(&TickInput::default(), 32.0).is_some());
        assert_eq!(game.state().steps, steps + 1);
    }

    #[test]
    fn menu_proceeds_after_asset_fallback() {
        let mut game = PlayChannel::new(MemoryStore::new(), Tuning::default(), 1, 0.0);
        game.attach_surface();
        assert!(!game.start(1000.0));
        assert!(game.start(1500.0));
    }

    #[test]
    fn new_record_is_persisted() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, 1000).unwrap();
        let mut game = PlayChannel::new(store, Tuning::default(), 1, 0.0);
        assert_eq!(game.state().high_score.best, 1000);
        game.attach_surface();
        game.mark_assets_loaded();
        assert!(game.start(0.0));

        game.state.run.score = 800;
        game.state.run.sticks = 2;
        game.state.run.charges_collected = 4;
        game.state.crash(0.0);

        let idle = TickInput::default();
        game.frame(&idle, 3599.0);
        assert_eq!(game.store().get(HIGH_SCORE_KEY), Some(1000));
        let frame = game.frame(&idle, 3600.0).unwrap();
        assert_eq!(frame.game_over.unwrap().is_new_record, Some(true));
        assert_eq!(game.store().get(HIGH_SCORE_KEY), Some(1200));
        assert_eq!(frame.high_score, 1200);
    }

    #[test]
    fn lower_score_keeps_record() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, 5000).unwrap();
        let mut game = PlayChannel::new(store, Tuning::default(), 1, 0.0);
        game.attach_surface();
        game.mark_assets_loaded();
        game.start(0.0);
        game.state.run.score = 10;
        game.state.crash(0.0);

        let frame = game.frame(&TickInput::default(), 10_000.0).unwrap();
        assert_eq!(frame.game_over.unwrap().is_new_record, Some(false));
        assert_eq!(game.store().get(HIGH_SCORE_KEY), Some(5000));
    }

    #[test]
    fn restart_is_ignored_before_gate() {
        let mut game = PlayChannel::new(MemoryStore::new(), Tuning::default(), 1, 0.0);
        game.attach_surface();
        game.mark_assets_loaded();
        game.start(0.0);
        game.state.crash(0.0);

        game.frame(&TickInput::default(), 2000.0);
        assert!(!game.restart(2000.0));
        assert_eq!(game.state().lifecycle, Lifecycle::GameOver);

        game.frame(&TickInput::default(), 4000.0);
        assert!(game.restart(4000.0));
        assert_eq!(game.state().lifecycle, Lifecycle::Playing);
    }
}
