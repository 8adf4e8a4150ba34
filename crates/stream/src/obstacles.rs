use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tankfield_common::hash::HashStream;
use tankfield_common::{ObstacleId, SceneHandle, SceneNode, TileCoord, Transform};

use crate::terrain::TerrainTile;

const OBSTACLE_CHANNEL: u32 = 0x4f42_5354;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Crate,
    Barrel,
}

impl ObstacleKind {
    const ALL: [ObstacleKind; 3] = [ObstacleKind::Rock, ObstacleKind::Crate, ObstacleKind::Barrel];

    /// Rocks only block; crates and barrels score when hit.
    pub fn scorable(self) -> bool {
        !matches!(self, ObstacleKind::Rock)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    /// Base of the obstacle, resting on the ground.
    pub position: Vec3,
    /// Bounding circle radius on the XZ plane.
    pub radius: f32,
}

impl Obstacle {
    /// The tile that spawned this obstacle.
    pub fn tile(&self) -> TileCoord {
        self.id.tile
    }

    pub fn scorable(&self) -> bool {
        self.kind.scorable()
    }

    pub fn transform(&self) -> Transform {
        Transform::at(self.position)
    }
}

/// Obstacle placement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleConfig {
    pub min_per_tile: u32,
    pub max_per_tile: u32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Keep obstacle centers this far inside their tile's edges.
    pub edge_margin: f32,
    /// No obstacle overlaps this circle around the world origin (the spawn point).
    pub spawn_clearance: f32,
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            min_per_tile: 1,
            max_per_tile: 4,
            min_radius: 0.8,
            max_radius: 1.6,
            edge_margin: 2.0,
            spawn_clearance: 6.0,
        }
    }
}

impl ObstacleConfig {
    /// Configuration that never places anything.
    pub fn none() -> Self {
        Self {
            min_per_tile: 0,
            max_per_tile: 0,
            ..Self::default()
        }
    }
}

/// Deterministic obstacle layout for one tile.
///
/// Candidates that overlap the spawn clearance or an earlier obstacle are
/// dropped, but every candidate consumes its draws so indices stay stable.
pub fn generate_obstacles(tile: &TerrainTile, config: &ObstacleConfig, seed: u64) -> Vec<Obstacle> {
    let coord = tile.coord();
    let mut rng = HashStream::new(seed, coord.x, coord.z, OBSTACLE_CHANNEL);
    let (min, max) = tile.bounds();

    let spread = config.max_per_tile.saturating_sub(config.min_per_tile) as u64 + 1;
    let count = config.min_per_tile as u64 + rng.next_u64() % spread;
    // Indices must fit the u16 in `ObstacleId`.
    let count = count.min(config.max_per_tile as u64).min(u16::MAX as u64 + 1);

    let margin = config.edge_margin.min(tile.size() * 0.5);
    let mut placed: Vec<Obstacle> = Vec::with_capacity(count as usize);
    for index in 0..count {
        let kind = ObstacleKind::ALL[(rng.next_u64() % ObstacleKind::ALL.len() as u64) as usize];
        let radius = rng.range(config.min_radius, config.max_radius);
        let x = rng.range(min.x + margin, max.x - margin);
        let z = rng.range(min.y + margin, max.y - margin);

        let center = Vec2::new(x, z);
        if center.length() < config.spawn_clearance + radius {
            continue;
        }
        let overlaps = placed
            .iter()
            .any(|o| Vec2::new(o.position.x, o.position.z).distance(center) < o.radius + radius);
        if overlaps {
            continue;
        }

        let y = tile.height_at(x, z).unwrap_or(0.0);
        placed.push(Obstacle {
            id: ObstacleId {
                tile: coord,
                index: index as u16,
            },
            kind,
            position: Vec3::new(x, y, z),
            radius,
        });
    }
    placed
}

/// Owns every live obstacle, grouped by the tile that spawned it.
#[derive(Debug)]
pub struct ObstacleManager {
    config: ObstacleConfig,
    seed: u64,
    by_tile: BTreeMap<TileCoord, Vec<Obstacle>>,
}

impl ObstacleManager {
    pub fn new(config: ObstacleConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            by_tile: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &ObstacleConfig {
        &self.config
    }

    /// Place the obstacles belonging to `tile`. A tile that already has its
    /// obstacles is left alone. Returns how many were spawned.
    pub fn spawn_for(&mut self, tile: &TerrainTile, scene: &mut dyn SceneHandle) -> usize {
        let coord = tile.coord();
        if self.by_tile.contains_key(&coord) {
            return 0;
        }
        let obstacles = generate_obstacles(tile, &self.config, self.seed);
        for o in &obstacles {
            scene.add(SceneNode::Obstacle(o.id), o.transform());
        }
        let spawned = obstacles.len();
        tracing::debug!(?coord, spawned, "obstacles spawned");
        self.by_tile.insert(coord, obstacles);
        spawned
    }

    /// Remove every obstacle spawned by the tile at `coord`.
    pub fn despawn_for(&mut self, coord: TileCoord, scene: &mut dyn SceneHandle) -> usize {
        let Some(obstacles) = self.by_tile.remove(&coord) else {
            return 0;
        };
        for o in &obstacles {
            scene.remove(SceneNode::Obstacle(o.id));
        }
        tracing::debug!(?coord, despawned = obstacles.len(), "obstacles despawned");
        obstacles.len()
    }

    /// Live view of all obstacles in canonical (tile, index) order.
    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.by_tile.values().flatten()
    }

    pub fn obstacles_in(&self, coord: TileCoord) -> &[Obstacle] {
        self.by_tile.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look an obstacle up by id; `None` once its tile has been evicted.
    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles_in(id.tile).iter().find(|o| o.id == id)
    }

    /// Tiles that currently own obstacle groups.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.by_tile.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_tile.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
