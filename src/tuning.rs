//! Game balance and timing
//!
//! Every number that shapes how a run feels lives here so it can be
//! overridden from JSON without touching the simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunable parameters for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World bounds ===
    /// Lowest actor `y`
    pub floor_level: f32,
    /// Highest actor `y`
    pub ceiling_level: f32,

    // === Clock ===
    /// Upper bound on a single step's delta (seconds)
    pub max_dt: f32,

    // === Scroll speed ===
    /// World units per second at distance 0
    pub base_speed: f32,
    /// Coefficient of the square-root difficulty curve
    pub difficulty_coefficient: f32,
    /// Maximum speed added by the difficulty curve
    pub difficulty_cap: f32,
    /// Multiplier while dropping, or holding both without an active glide
    pub boost_multiplier: f32,
    /// Multiplier while holding both with an active glide
    pub glide_boost_multiplier: f32,
    /// Distance points per second
    pub score_rate: f32,

    // === Actor physics (units/s and units/s²) ===
    pub gravity: f32,
    pub ascend_acceleration: f32,
    pub max_rise_speed: f32,
    /// Upward velocity set when ascending from the ground
    pub jump_impulse: f32,
    pub descend_acceleration: f32,
    pub max_fall_speed: f32,

    // === Glide ===
    /// Seconds a glide lasts once activated
    pub glide_duration: f32,
    /// Seconds after a glide ends before another may start
    pub glide_cooldown: f32,

    // === Spawning ===
    /// Edge-to-edge gap between two obstacles of the same type
    pub same_type_gap: f32,
    /// Edge-to-edge gap between obstacles of different types
    pub different_type_gap: f32,
    /// Chance a tree carries a stick
    pub stick_chance: f64,
    /// Chance an empty slot carries a glide charge
    pub charge_chance: f64,

    // === Game over sequence (milliseconds) ===
    pub panel_ms: f64,
    /// Recap reveal steps 1..=4, relative to recap entry
    pub recap_step_offsets_ms: [f64; 4],
    /// Duration of each count-up segment of the final score
    pub count_up_segment_ms: f64,
    /// Record comparison message, relative to recap entry
    pub record_message_ms: f64,
    /// Restart gate, relative to recap entry
    pub restart_gate_ms: f64,

    // === Scoring ===
    pub stick_bonus: u32,
    pub charge_bonus: u32,

    // === Platform ===
    /// Menu proceeds after this long even if assets never finish loading
    pub asset_fallback_ms: f64,
    /// How long a swipe-down keeps descend held
    pub descend_pulse_ms: f64,
    /// Minimum downward travel (CSS px) for a touch move to count as a swipe
    pub swipe_threshold_px: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            floor_level: 2.0,
            ceiling_level: 71.0,

            max_dt: 0.05,

            base_speed: 30.0,
            difficulty_coefficient: 0.6,
            difficulty_cap: 24.0,
            boost_multiplier: 1.5,
            glide_boost_multiplier: 3.0,
            score_rate: 10.0,

            gravity: 140.0,
            ascend_acceleration: 260.0,
            max_rise_speed: 60.0,
            jump_impulse: 40.0,
            descend_acceleration: 220.0,
            max_fall_speed: 120.0,

            glide_duration: 5.0,
            glide_cooldown: 1.0,

            same_type_gap: 3.0,
            different_type_gap: 40.0,
            stick_chance: 0.22,
            charge_chance: 0.33,

            panel_ms: 1500.0,
            recap_step_offsets_ms: [300.0, 900.0, 1500.0, 2100.0],
            count_up_segment_ms: 300.0,
            record_message_ms: 3000.0,
            restart_gate_ms: 2400.0,

            stick_bonus: 150,
            charge_bonus: 25,

            asset_fallback_ms: 1500.0,
            descend_pulse_ms: 400.0,
            swipe_threshold_px: 30.0,
        }
    }
}

impl Tuning {
    /// Overlay a (possibly partial) JSON document on the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse overrides, falling back to defaults on any problem
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.floor_level >= self.ceiling_level {
            return Err(TuningError::Invalid {
                field: "floor_level",
                reason: "must be below ceiling_level",
            });
        }
        if self.max_dt <= 0.0 {
            return Err(TuningError::Invalid {
                field: "max_dt",
                reason: "must be positive",
            });
        }
        if self.base_speed <= 0.0 {
            return Err(TuningError::Invalid {
                field: "base_speed",
                reason: "must be positive",
            });
        }
        if self.glide_duration <= 0.0 {
            return Err(TuningError::Invalid {
                field: "glide_duration",
                reason: "must be positive",
            });
        }
        if !(0.0..=1.0).contains(&self.stick_chance) {
            return Err(TuningError::Invalid {
                field: "stick_chance",
                reason: "must be within [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&self.charge_chance) {
            return Err(TuningError::Invalid {
                field: "charge_chance",
                reason: "must be within [0, 1]",
            });
        }
        if !self.recap_step_offsets_ms.is_sorted() {
            return Err(TuningError::Invalid {
                field: "recap_step_offsets_ms",
                reason: "must be ascending",
            });
        }
        Ok(())
    }

    /// Weighted score used for the session record
    pub fn weighted_score(&self, distance: u32, sticks: u32, charges: u32) -> u32 {
        distance
            .saturating_add(sticks.saturating_mul(self.stick_bonus))
            .saturating_add(charges.saturating_mul(self.charge_bonus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn partial_json_overlays_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 42.0 }"#).unwrap();
        assert_eq!(tuning.base_speed, 42.0);
        assert_eq!(tuning.floor_level, 2.0);
        assert_eq!(tuning.ceiling_level, 71.0);
    }

    #[test]
    fn inverted_bounds_rejected() {
        let err = Tuning::from_json(r#"{ "floor_level": 80.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "floor_level", .. }));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        assert_eq!(Tuning::from_json_or_default("not json"), Tuning::default());
        assert_eq!(
            Tuning::from_json_or_default(r#"{ "stick_chance": 2.0 }"#),
            Tuning::default()
        );
    }

    #[test]
    fn weighted_score_counts_bonuses() {
        let tuning = Tuning::default();
        assert_eq!(tuning.weighted_score(800, 2, 4), 1200);
        assert_eq!(tuning.weighted_score(0, 0, 0), 0);
    }
}
