use std::fmt::Write;

use glam::Vec3;
use tankfield_common::{SceneGraph, SceneNode, Transform};
use tankfield_kernel::{CameraPose, FrameReport};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::from(CameraPose::default())
    }
}

impl From<CameraPose> for RenderView {
    fn from(pose: CameraPose) -> Self {
        Self {
            eye: pose.eye,
            target: pose.target,
            fov_degrees: 75.0,
        }
    }
}

/// Overlay values shown on top of the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hud {
    pub tick: u64,
    pub score: u64,
}

impl From<&FrameReport> for Hud {
    fn from(report: &FrameReport) -> Self {
        Self {
            tick: report.tick,
            score: report.score,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene graph and a view, then produces output. It
/// holds no reference to the game, so nothing it does reaches the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and view.
    fn render(&self, scene: &SceneGraph, view: &RenderView, hud: Option<Hud>) -> Self::Output;
}

/// Produces a human-readable dump of the scene.
///
/// Used by the CLI and for testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every node, not just the per-kind counts.
    pub list_nodes: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self { list_nodes: true }
    }

    pub fn summary() -> Self {
        Self { list_nodes: false }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView, hud: Option<Hud>) -> String {
        let mut out = String::new();
        match hud {
            Some(hud) => {
                let _ = writeln!(out, "=== Scene (tick={}, score={}) ===", hud.tick, hud.score);
            }
            None => out.push_str("=== Scene ===\n"),
        }

        let count = |f: fn(&SceneNode) -> bool| scene.count_where(f);
        let _ = writeln!(
            out,
            "Nodes: {} (tanks={}, tiles={}, obstacles={}, projectiles={})",
            scene.len(),
            count(|n| matches!(n, SceneNode::Tank(_))),
            count(|n| matches!(n, SceneNode::Terrain(_))),
            count(|n| matches!(n, SceneNode::Obstacle(_))),
            count(|n| matches!(n, SceneNode::Projectile(_))),
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        if self.list_nodes {
            for (node, transform) in scene.nodes() {
                let _ = writeln!(out, "  {} {}", label(node), pose(transform));
            }
        }

        tracing::trace!(bytes = out.len(), "debug frame rendered");
        out
    }
}

fn label(node: &SceneNode) -> String {
    match node {
        SceneNode::Tank(id) => format!("tank[{}]", id.short()),
        SceneNode::Terrain(c) => format!("tile({}, {})", c.x, c.z),
        SceneNode::Obstacle(id) => format!("obstacle({}, {})#{}", id.tile.x, id.tile.z, id.index),
        SceneNode::Projectile(id) => format!("shell[{}]", id.short()),
    }
}

fn pose(t: &Transform) -> String {
    let p = t.position;
    format!("pos=({:.2}, {:.2}, {:.2}) yaw={:.3}", p.x, p.y, p.z, t.yaw)
}
