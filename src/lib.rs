//! PlayChannel - a side-scrolling arcade mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Session high score record
//! - `persistence`: Session-scoped key/value storage
//! - `platform`: Raw browser input normalization
//! - `renderer`: Canvas drawing of frame snapshots (wasm only)

pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use game::PlayChannel;
pub use highscores::HighScore;
pub use tuning::{Tuning, TuningError};

/// World geometry constants.
///
/// All positions and sizes are world units: percent of the play area, with
/// `y = 0` at the world floor and `x = 0` at the left edge.
pub mod consts {
    /// Right edge of the world, where obstacles spawn
    pub const WORLD_WIDTH: f32 = 100.0;
    /// Top edge of the world (ceiling obstacles hang from here)
    pub const WORLD_HEIGHT: f32 = 100.0;

    /// Actor sprite placement (left edge is fixed)
    pub const ACTOR_X: f32 = 12.0;
    pub const ACTOR_WIDTH: f32 = 8.0;
    pub const ACTOR_HEIGHT: f32 = 16.0;

    /// Vertical scale of the sprite while ducking
    pub const DUCK_SCALE: f32 = 0.7;
    /// Hitbox height relative to the (possibly ducked) sprite
    pub const HITBOX_HEIGHT_SCALE: f32 = 0.5;
    /// Hitbox inset from each side of the sprite
    pub const HITBOX_X_INSET: f32 = 2.0;

    /// Low wall standing on the ground
    pub const FLOOR_OBSTACLE_WIDTH: f32 = 10.0;
    pub const FLOOR_OBSTACLE_HEIGHT: f32 = 36.0;
    /// Hanging block, `y` measured down from the world top
    pub const CEILING_OBSTACLE_WIDTH: f32 = 20.0;
    pub const CEILING_OBSTACLE_HEIGHT: f32 = 20.0;
    /// Tree: walk-through trunk with a solid canopy on top
    pub const TREE_WIDTH: f32 = 25.0;
    pub const TREE_TRUNK_HEIGHT: f32 = 14.0;
    pub const TREE_CANOPY_HEIGHT: f32 = 30.0;
    /// Spacer slot, never lethal
    pub const EMPTY_SLOT_WIDTH: f32 = 20.0;
    pub const EMPTY_SLOT_HEIGHT: f32 = 20.0;

    /// Ground line obstacles stand on, and the offset ceiling obstacles
    /// hang below the world top
    pub const OBSTACLE_ANCHOR: f32 = 7.0;
    /// Trees stand directly on the world floor
    pub const TREE_ANCHOR: f32 = 0.0;

    /// Collectible sizes
    pub const STICK_WIDTH: f32 = 4.0;
    pub const STICK_HEIGHT: f32 = 6.0;
    pub const CHARGE_WIDTH: f32 = 6.0;
    pub const CHARGE_HEIGHT: f32 = 8.0;

    /// Obstacles are dropped once their trailing edge passes this far left of 0
    pub const DESPAWN_MARGIN: f32 = 5.0;

    /// Background scroll rate relative to the world
    pub const PARALLAX_FACTOR: f32 = 0.25;

    /// Session storage key for the high score
    pub const HIGH_SCORE_KEY: &str = "playchannel_highscore";
}
