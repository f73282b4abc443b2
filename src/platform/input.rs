//! Raw keyboard, pointer and touch events to `TickInput`
//!
//! Event handlers feed this collector as events arrive; the frame loop polls
//! it once per frame. Edge events are consumed by the poll.

use std::collections::HashSet;

use crate::sim::TickInput;
use crate::tuning::Tuning;

fn is_ascend_key(code: &str) -> bool {
    matches!(code, "ArrowUp" | "KeyW" | "Space")
}

fn is_descend_key(code: &str) -> bool {
    matches!(code, "ArrowDown" | "KeyS")
}

fn is_primary_key(code: &str) -> bool {
    matches!(code, "Space" | "Enter")
}

#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    held_keys: HashSet<String>,
    pointer_held: bool,
    touch_held: bool,
    /// Reference point for swipe detection (CSS px, y grows downward)
    touch_anchor_y: Option<f32>,
    /// Swipe-down keeps descend held until this timestamp (ms)
    descend_pulse_until: f64,
    pulse_ms: f64,
    swipe_threshold: f32,
    primary: bool,
    restart: bool,
    toggle_collisions: bool,
    toggle_hitboxes: bool,
}

impl InputCollector {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pulse_ms: tuning.descend_pulse_ms,
            swipe_threshold: tuning.swipe_threshold_px,
            ..Default::default()
        }
    }

    /// Returns true if the key is one the game uses (caller may prevent default)
    pub fn key_down(&mut self, code: &str) -> bool {
        let fresh = self.held_keys.insert(code.to_string());
        if fresh {
            match code {
                c if is_primary_key(c) => self.primary = true,
                "KeyR" => self.restart = true,
                "KeyC" => self.toggle_collisions = true,
                "KeyH" => self.toggle_hitboxes = true,
                _ => {}
            }
        }
        is_ascend_key(code) || is_descend_key(code) || is_primary_key(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.held_keys.remove(code);
    }

    pub fn pointer_down(&mut self) {
        self.pointer_held = true;
    }

    pub fn pointer_up(&mut self) {
        self.pointer_held = false;
    }

    pub fn click(&mut self) {
        self.primary = true;
    }

    pub fn touch_start(&mut self, y: f32) {
        self.touch_held = true;
        self.touch_anchor_y = Some(y);
    }

    /// A long enough downward move triggers (or extends) a descend pulse
    pub fn touch_move(&mut self, y: f32, now_ms: f64) {
        let Some(anchor) = self.touch_anchor_y else {
            return;
        };
        if y - anchor >= self.swipe_threshold {
            self.descend_pulse_until = now_ms + self.pulse_ms;
            self.touch_anchor_y = Some(y);
        } else if y < anchor {
            // Moving back up re-arms from the new position
            self.touch_anchor_y = Some(y);
        }
    }

    pub fn touch_end(&mut self) {
        self.touch_held = false;
        self.touch_anchor_y = None;
        self.primary = true;
    }

    /// Release everything, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.pointer_held = false;
        self.touch_held = false;
        self.touch_anchor_y = None;
        self.descend_pulse_until = 0.0;
    }

    pub fn ascend_held(&self) -> bool {
        self.pointer_held || self.touch_held || self.held_keys.iter().any(|k| is_ascend_key(k))
    }

    pub fn descend_held(&self, now_ms: f64) -> bool {
        now_ms < self.descend_pulse_until || self.held_keys.iter().any(|k| is_descend_key(k))
    }

    /// Current hold states plus any edges since the last poll
    pub fn poll(&mut self, now_ms: f64) -> TickInput {
        TickInput {
            ascend: self.ascend_held(),
            descend: self.descend_held(now_ms),
            primary: std::mem::take(&mut self.primary),
            restart: std::mem::take(&mut self.restart),
            toggle_collisions: std::mem::take(&mut self.toggle_collisions),
            toggle_hitboxes: std::mem::take(&mut self.toggle_hitboxes),
        }
    }
}
