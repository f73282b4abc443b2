//! Session high score
//!
//! Read once at mount, written at most once per run when the final score is
//! revealed. Never decreases.

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORE_KEY;
use crate::persistence::SessionStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    /// Best weighted score this session
    pub best: u32,
}

impl HighScore {
    pub fn new() -> Self {
        Self { best: 0 }
    }

    /// Check if a weighted score beats the record (ties do not)
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.best
    }

    /// Replace the record if `score` beats it; returns whether it did
    pub fn submit(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.best = score;
        true
    }

    /// Load from the session store; missing or malformed values read as 0
    pub fn load(store: &impl SessionStore) -> Self {
        match store.get(HIGH_SCORE_KEY).map(u32::try_from) {
            Some(Ok(best)) => {
                log::info!("Loaded session high score {best}");
                Self { best }
            }
            Some(Err(_)) => {
                log::warn!("Ignoring out-of-range stored high score");
                Self::new()
            }
            None => {
                log::info!("No session high score, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut impl SessionStore) {
        match store.set(HIGH_SCORE_KEY, self.best as i64) {
            Ok(()) => log::info!("High score saved ({})", self.best),
            Err(e) => log::warn!("Could not save high score: {e}"),
        }
    }
}
