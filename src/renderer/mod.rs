//! Canvas rendering of frame snapshots (wasm only)

pub mod canvas;

pub use canvas::{CanvasRenderer, SPRITE_PATHS};
