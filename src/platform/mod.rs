//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard, pointer, touch gestures)
//! - Storage (sessionStorage on web, see `persistence`)

pub mod input;

pub use input::InputCollector;
