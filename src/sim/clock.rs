//! Frame clock
//!
//! Converts monotonically increasing frame timestamps (milliseconds, as
//! handed to `requestAnimationFrame`) into clamped step deltas.

use serde::{Deserialize, Serialize};

/// Deltas above this many seconds are worth a log line (tab was backgrounded)
const SUSPEND_WARN_DT: f64 = 1.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Timestamp of the previous step (ms)
    last_ms: Option<f64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Restart measuring from `now_ms`; the next step sees only the time since
    pub fn reset(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }

    /// Delta in seconds since the previous step, clamped to `[0, max_dt]`
    pub fn advance(&mut self, now_ms: f64, max_dt: f32) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms.max(self.last_ms.unwrap_or(now_ms)));

        if dt > SUSPEND_WARN_DT {
            log::warn!("Frame delta {dt:.2}s clamped to {max_dt}s");
        }
        (dt as f32).min(max_dt)
    }

    pub fn last_ms(&self) -> Option<f64> {
        self.last_ms
    }
}
