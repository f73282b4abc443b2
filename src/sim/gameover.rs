//! Game over sequence
//!
//! A terminal panel followed by a staged recap. Progress is derived from the
//! time elapsed since entry each time `update` is polled, so there are no
//! timers to cancel: dropping the sequence is enough.

use serde::{Deserialize, Serialize};

use super::run::FinalRun;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverPhase {
    /// Terminal message
    Panel,
    /// Staged summary reveal
    Recap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOverSequence {
    entered_at_ms: f64,
    pub phase: GameOverPhase,
    /// Reveal steps shown so far (0..=4); step 4 reveals the final score
    pub recap_step: u8,
    /// Final score as currently counted up
    pub displayed_score: u32,
    pub show_record_message: bool,
    /// Restart gate
    pub allow_restart: bool,
    /// Decided once, when the final score is revealed
    pub is_new_record: Option<bool>,
    pub final_run: FinalRun,
}

impl GameOverSequence {
    pub fn new(now_ms: f64, final_run: FinalRun) -> Self {
        Self {
            entered_at_ms: now_ms,
            phase: GameOverPhase::Panel,
            recap_step: 0,
            displayed_score: 0,
            show_record_message: false,
            allow_restart: false,
            is_new_record: None,
            final_run,
        }
    }

    /// Bring the sequence up to `now_ms`.
    ///
    /// Returns `Some(is_new_record)` on the one poll where the final score is
    /// first revealed; the record comparison is made against `best`.
    pub fn update(&mut self, now_ms: f64, tuning: &Tuning, best: u32) -> Option<bool> {
        let elapsed = now_ms - self.entered_at_ms;
        if elapsed < tuning.panel_ms {
            return None;
        }
        self.phase = GameOverPhase::Recap;
        let recap = elapsed - tuning.panel_ms;

        self.recap_step = tuning
            .recap_step_offsets_ms
            .iter()
            .filter(|&&offset| recap >= offset)
            .count() as u8;

        let reveal_at = tuning.recap_step_offsets_ms[3];
        let mut decided = None;
        if self.recap_step >= 4 {
            if self.is_new_record.is_none() {
                let record = self.final_run.weighted > best;
                self.is_new_record = Some(record);
                decided = Some(record);
            }
            self.displayed_score = self.count_up(recap - reveal_at, tuning);
        }

        let count_up_done = recap >= reveal_at + 3.0 * tuning.count_up_segment_ms;
        self.show_record_message =
            self.recap_step >= 4 && count_up_done && recap >= tuning.record_message_ms;
        self.allow_restart = recap >= tuning.restart_gate_ms;

        decided
    }

    /// Three-segment count-up: distance, plus sticks, plus glide charges
    fn count_up(&self, since_reveal: f64, tuning: &Tuning) -> u32 {
        let targets = self.final_run.count_up_targets(tuning);
        let segment_ms = tuning.count_up_segment_ms;
        if segment_ms <= 0.0 {
            return targets[2];
        }
        let segment = (since_reveal / segment_ms).floor() as usize;
        if segment >= targets.len() {
            return targets[2];
        }
        let from = if segment == 0 { 0 } else { targets[segment - 1] };
        let to = targets[segment];
        let t = (since_reveal - segment as f64 * segment_ms) / segment_ms;
        from + (to.saturating_sub(from) as f64 * t).floor() as u32
    }
}
