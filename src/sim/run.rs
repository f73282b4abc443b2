//! Per-run score, collectibles and the glide resource

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// Everything that resets when a run starts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Fractional distance; `score` is its integer part
    pub distance: f32,
    pub score: u32,
    pub sticks: u32,
    /// Glide charges picked up over the run (scored as a bonus)
    pub charges_collected: u32,
    /// Glide charges currently available
    pub glide_charges: u32,
    pub glide_active: bool,
    /// Seconds left on the active glide
    pub glide_remaining: f32,
    /// No new glide before this timestamp (ms)
    pub glide_cooldown_until: f64,
}

/// Outcome of ticking the glide timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlideTick {
    Idle,
    Running,
    Ended,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate distance points for `dt` seconds
    pub fn add_distance(&mut self, dt: f32, rate: f32) {
        self.distance += dt * rate;
        self.score = self.score.max(self.distance as u32);
    }

    /// Count down an active glide; ending it starts the cooldown
    pub fn tick_glide(&mut self, dt: f32, now_ms: f64, tuning: &Tuning) -> GlideTick {
        if !self.glide_active {
            return GlideTick::Idle;
        }
        self.glide_remaining -= dt;
        if self.glide_remaining > 0.0 {
            return GlideTick::Running;
        }
        self.glide_active = false;
        self.glide_remaining = 0.0;
        self.glide_cooldown_until = now_ms + tuning.glide_cooldown as f64 * 1000.0;
        GlideTick::Ended
    }

    pub fn can_activate_glide(&self, now_ms: f64) -> bool {
        !self.glide_active && self.glide_charges > 0 && now_ms >= self.glide_cooldown_until
    }

    /// Spend one charge on a glide window; returns false when not eligible
    pub fn try_activate_glide(&mut self, now_ms: f64, tuning: &Tuning) -> bool {
        if !self.can_activate_glide(now_ms) {
            return false;
        }
        self.glide_charges -= 1;
        self.glide_active = true;
        self.glide_remaining = tuning.glide_duration;
        true
    }

    pub fn collect_stick(&mut self) {
        self.sticks += 1;
    }

    pub fn collect_charge(&mut self) {
        self.glide_charges += 1;
        self.charges_collected += 1;
    }

    /// Freeze the counters for the game over screen
    pub fn finish(&self, tuning: &Tuning) -> FinalRun {
        FinalRun {
            score: self.score,
            sticks: self.sticks,
            charges: self.charges_collected,
            weighted: tuning.weighted_score(self.score, self.sticks, self.charges_collected),
        }
    }
}

/// Snapshot of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRun {
    pub score: u32,
    pub sticks: u32,
    pub charges: u32,
    /// Distance plus weighted bonuses
    pub weighted: u32,
}

impl FinalRun {
    /// Running totals the final score counts up through
    pub fn count_up_targets(&self, tuning: &Tuning) -> [u32; 3] {
        let with_sticks = self
            .score
            .saturating_add(self.sticks.saturating_mul(tuning.stick_bonus));
        [self.score, with_sticks, self.weighted]
    }
}
