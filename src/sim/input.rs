//! Per-step input and intent arbitration

use serde::{Deserialize, Serialize};

/// Input polled once per step (already normalized by the platform layer)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Ascend is held (key, pointer, or touch)
    pub ascend: bool,
    /// Descend is held (key or swipe pulse)
    pub descend: bool,
    /// Primary action pressed this frame (start from the menu)
    pub primary: bool,
    /// Restart pressed this frame
    pub restart: bool,
    /// Debug: toggle lethal collisions
    pub toggle_collisions: bool,
    /// Debug: toggle hitbox overlay
    pub toggle_hitboxes: bool,
}

/// Movement intent after arbitration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    /// Effective ascend (suppressed by descend when out of glide charges)
    pub ascend: bool,
    pub descend: bool,
    /// Both raw holds asserted, regardless of suppression
    pub both_raw: bool,
}

impl Intent {
    /// Descend overrides ascend while the player has nothing to glide with
    pub fn arbitrate(raw_ascend: bool, raw_descend: bool, glide_charges: u32) -> Self {
        let suppressed = raw_descend && glide_charges == 0;
        Self {
            ascend: raw_ascend && !suppressed,
            descend: raw_descend,
            both_raw: raw_ascend && raw_descend,
        }
    }

    /// World scroll multiplier for this intent
    pub fn speed_multiplier(&self, glide_active: bool, boost: f32, glide_boost: f32) -> f32 {
        if self.both_raw && glide_active {
            glide_boost
        } else if self.descend {
            // Covers descend alone, ascend suppressed by descend, and a
            // double hold with no active glide
            boost
        } else {
            1.0
        }
    }
}
