//! Rendering adapter: renderer-agnostic interface over the scene graph.
//!
//! # Invariants
//! - Renderers read the scene and view; they never mutate simulation state.
//! - The view is derived from the chase camera pose each frame.

mod renderer;

pub use renderer::{DebugTextRenderer, Hud, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "tankfield-render v0.1.0"
}
