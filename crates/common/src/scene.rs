use std::collections::BTreeMap;

use crate::types::{EntityId, ObstacleId, TileCoord, Transform};

/// Renderable identity handed to the scene handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneNode {
    Tank(EntityId),
    Terrain(TileCoord),
    Obstacle(ObstacleId),
    Projectile(EntityId),
}

/// External scene graph the core publishes object lifecycles to.
///
/// The core only ever writes through this trait. It never reads scene state
/// back, so presentation can't feed into the simulation.
pub trait SceneHandle {
    /// A new object entered the simulation.
    fn add(&mut self, node: SceneNode, transform: Transform);

    /// An object left the simulation.
    fn remove(&mut self, node: SceneNode);

    /// An existing object moved this frame.
    fn set_transform(&mut self, node: SceneNode, transform: Transform);
}

/// In-memory scene handle mirroring what a real scene graph would hold.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<SceneNode, Transform>,
    adds: u64,
    removes: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: SceneNode) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn get(&self, node: SceneNode) -> Option<&Transform> {
        self.nodes.get(&node)
    }

    /// All nodes in canonical order.
    pub fn nodes(&self) -> &BTreeMap<SceneNode, Transform> {
        &self.nodes
    }

    /// Total `add` calls received.
    pub fn adds(&self) -> u64 {
        self.adds
    }

    /// Total `remove` calls received.
    pub fn removes(&self) -> u64 {
        self.removes
    }

    pub fn count_where(&self, pred: impl Fn(&SceneNode) -> bool) -> usize {
        self.nodes.keys().filter(|n| pred(*n)).count()
    }
}

impl SceneHandle for SceneGraph {
    fn add(&mut self, node: SceneNode, transform: Transform) {
        if self.nodes.insert(node, transform).is_some() {
            tracing::warn!(?node, "scene node added twice");
        }
        self.adds += 1;
    }

    fn remove(&mut self, node: SceneNode) {
        if self.nodes.remove(&node).is_none() {
            tracing::warn!(?node, "removing unknown scene node");
        }
        self.removes += 1;
    }

    fn set_transform(&mut self, node: SceneNode, transform: Transform) {
        if let Some(t) = self.nodes.get_mut(&node) {
            *t = transform;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn add_move_remove() {
        let mut scene = SceneGraph::new();
        let node = SceneNode::Terrain(TileCoord::new(1, 2));
        scene.add(node, Transform::default());
        assert!(scene.contains(node));

        let moved = Transform::at(Vec3::new(1.0, 0.0, 0.0));
        scene.set_transform(node, moved);
        assert_eq!(scene.get(node), Some(&moved));

        scene.remove(node);
        assert!(scene.is_empty());
        assert_eq!(scene.adds(), 1);
        assert_eq!(scene.removes(), 1);
    }

    #[test]
    fn set_transform_ignores_unknown_nodes() {
        let mut scene = SceneGraph::new();
        scene.set_transform(SceneNode::Projectile(EntityId::new()), Transform::default());
        assert!(scene.is_empty());
    }

    #[test]
    fn count_where_filters_by_kind() {
        let mut scene = SceneGraph::new();
        scene.add(SceneNode::Tank(EntityId::new()), Transform::default());
        scene.add(SceneNode::Terrain(TileCoord::new(0, 0)), Transform::default());
        scene.add(SceneNode::Terrain(TileCoord::new(0, 1)), Transform::default());
        assert_eq!(scene.count_where(|n| matches!(n, SceneNode::Terrain(_))), 2);
    }
}
