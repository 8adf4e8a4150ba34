use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use glam::{Vec2, Vec3};
use tankfield_common::{SceneHandle, SceneNode, TileCoord, Transform};

use crate::grid::TileGrid;
use crate::obstacles::ObstacleManager;
use crate::terrain::{TerrainConfig, TerrainQuery, TerrainTile};

/// Tiles that entered and left the live set during one update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub created: Vec<TileCoord>,
    pub evicted: Vec<TileCoord>,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.evicted.is_empty()
    }
}

/// Per-update streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub tiles_created_this_frame: usize,
    pub tiles_evicted_this_frame: usize,
    pub total_live_tiles: usize,
    pub frame_time: Duration,
}

/// Generates terrain tiles around the player and evicts the ones left behind.
pub struct TerrainManager {
    config: TerrainConfig,
    grid: TileGrid,
    tiles: BTreeMap<TileCoord, TerrainTile>,
    stats: StreamStats,
}

impl TerrainManager {
    pub fn new(config: TerrainConfig) -> Self {
        let grid = TileGrid::new(config.tile_size);
        Self {
            config,
            grid,
            tiles: BTreeMap::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    /// Generate the starting tiles around the spawn point (the origin).
    pub fn create_terrain(
        &mut self,
        scene: &mut dyn SceneHandle,
        obstacles: &mut ObstacleManager,
    ) -> StreamDelta {
        self.update_terrain(Vec3::ZERO, scene, obstacles)
    }

    /// Bring the live tile set in line with the player's position.
    ///
    /// Only tiles within the retention radius of `player` are generated, so a
    /// teleport never fills in the tiles along the way.
    pub fn update_terrain(
        &mut self,
        player: Vec3,
        scene: &mut dyn SceneHandle,
        obstacles: &mut ObstacleManager,
    ) -> StreamDelta {
        let _span = tracing::info_span!("stream_update").entered();
        let frame_start = Instant::now();

        let center = self.grid.position_to_tile(player);
        let desired: BTreeSet<TileCoord> = self
            .grid
            .tiles_in_radius(center, self.config.retention_radius)
            .into_iter()
            .collect();

        let evicted: Vec<TileCoord> = self
            .tiles
            .keys()
            .filter(|c| !desired.contains(*c))
            .copied()
            .collect();
        let created: Vec<TileCoord> = desired
            .iter()
            .filter(|c| !self.tiles.contains_key(*c))
            .copied()
            .collect();

        // Evict first so obstacles never outlive their tile, even briefly.
        for coord in &evicted {
            obstacles.despawn_for(*coord, scene);
            scene.remove(SceneNode::Terrain(*coord));
            self.tiles.remove(coord);
            tracing::debug!(?coord, "tile evicted");
        }
        for coord in &created {
            let tile = TerrainTile::generate(*coord, &self.config);
            scene.add(SceneNode::Terrain(*coord), Transform::at(tile.center()));
            obstacles.spawn_for(&tile, scene);
            self.tiles.insert(*coord, tile);
            tracing::debug!(?coord, "tile created");
        }

        self.stats = StreamStats {
            tiles_created_this_frame: created.len(),
            tiles_evicted_this_frame: evicted.len(),
            total_live_tiles: self.tiles.len(),
            frame_time: frame_start.elapsed(),
        };

        tracing::trace!(
            ?center,
            created = created.len(),
            evicted = evicted.len(),
            total = self.tiles.len(),
            "stream update complete"
        );

        StreamDelta { created, evicted }
    }

    /// Read-only query view over the live tiles.
    pub fn current_terrain(&self) -> TerrainView<'_> {
        TerrainView {
            grid: self.grid,
            tiles: &self.tiles,
        }
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TerrainTile> {
        self.tiles.get(&coord)
    }

    pub fn is_live(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    /// Live tile coordinates in canonical order.
    pub fn live_tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.keys().copied()
    }

    pub fn live_count(&self) -> usize {
        self.tiles.len()
    }

    /// Statistics from the last update.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }
}

/// Borrowed view of the live terrain for one frame.
#[derive(Clone, Copy)]
pub struct TerrainView<'a> {
    grid: TileGrid,
    tiles: &'a BTreeMap<TileCoord, TerrainTile>,
}

impl TerrainView<'_> {
    pub fn tile_at(&self, x: f32, z: f32) -> Option<&TerrainTile> {
        self.tiles.get(&self.grid.point_to_tile(x, z))
    }

    /// (min, max) XZ corners enclosing every live tile.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.tiles.values().map(TerrainTile::bounds).reduce(|(amin, amax), (bmin, bmax)| {
            (amin.min(bmin), amax.max(bmax))
        })
    }
}

impl TerrainQuery for TerrainView<'_> {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.tile_at(x, z)?.height_at(x, z)
    }
}
