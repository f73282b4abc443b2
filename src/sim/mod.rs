//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only enters through the frame timestamp passed to `tick`
//! - Seeded RNG only
//! - Obstacles iterate in spawn order
//! - No rendering or platform dependencies

pub mod actor;
pub mod clock;
pub mod collision;
pub mod frame;
pub mod gameover;
pub mod input;
pub mod obstacle;
pub mod run;
pub mod state;
pub mod tick;

pub use actor::Actor;
pub use clock::SimClock;
pub use collision::{Rect, actor_rect, obstacle_rect};
pub use frame::{FrameSnapshot, Pose};
pub use gameover::{GameOverPhase, GameOverSequence};
pub use input::{Intent, TickInput};
pub use obstacle::{Collectible, Obstacle, ObstacleKind, ObstacleType, Spawner};
pub use run::{FinalRun, RunState};
pub use state::{AssetGate, GameEvent, GameState, Lifecycle};
pub use tick::{StepOutcome, difficulty_speed, tick};
