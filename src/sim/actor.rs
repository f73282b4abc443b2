//! Player actor and its vertical physics

use serde::{Deserialize, Serialize};

use super::input::Intent;
use crate::consts::*;
use crate::tuning::Tuning;

/// The player-controlled runner. Horizontal position is fixed; the world
/// scrolls past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub x: f32,
    /// Bottom of the sprite (world units, bottom-up)
    pub y: f32,
    /// Vertical velocity (units/s, positive is up)
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub ducking: bool,
    pub on_ground: bool,
    pub gliding: bool,
    /// Height frozen for the current glide; only set while `gliding`
    pub glide_lock_y: Option<f32>,
}

impl Actor {
    /// Fresh actor standing on the floor
    pub fn new(floor_level: f32) -> Self {
        Self {
            x: ACTOR_X,
            y: floor_level,
            vy: 0.0,
            width: ACTOR_WIDTH,
            height: ACTOR_HEIGHT,
            ducking: false,
            on_ground: true,
            gliding: false,
            glide_lock_y: None,
        }
    }

    /// Instant upward kick, only from the ground
    pub fn jump(&mut self, impulse: f32) {
        if self.on_ground {
            self.vy = impulse;
            self.on_ground = false;
        }
    }

    /// Integrate one step
    pub fn step(&mut self, dt: f32, intent: &Intent, glide_active: bool, tuning: &Tuning) {
        if intent.both_raw && glide_active {
            let lock = *self.glide_lock_y.get_or_insert(self.y);
            self.gliding = true;
            self.y = lock;
            self.vy = 0.0;
            self.on_ground = self.y <= tuning.floor_level;
            self.ducking = false;
            return;
        }

        if self.gliding {
            self.gliding = false;
            self.glide_lock_y = None;
        }

        if intent.ascend {
            if self.y >= tuning.ceiling_level {
                self.y = tuning.ceiling_level;
                self.vy = 0.0;
                self.on_ground = false;
                self.ducking = false;
                return;
            }
            self.vy = (self.vy + tuning.ascend_acceleration * dt).min(tuning.max_rise_speed);
        } else {
            self.vy -= tuning.gravity * dt;
        }

        if intent.descend && self.y > tuning.floor_level && self.vy > -tuning.max_fall_speed {
            self.vy = (self.vy - tuning.descend_acceleration * dt).max(-tuning.max_fall_speed);
        }

        self.y += self.vy * dt;

        if self.y <= tuning.floor_level {
            self.y = tuning.floor_level;
            self.vy = 0.0;
            self.on_ground = true;
        } else if self.y >= tuning.ceiling_level {
            self.y = tuning.ceiling_level;
            self.vy = 0.0;
            self.on_ground = false;
        } else {
            self.on_ground = false;
        }

        self.ducking = self.on_ground && intent.descend;
    }
}
