use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tankfield_common::TileCoord;
use tankfield_common::hash::{lattice, unit};

use crate::grid::TileGrid;

const HEIGHT_CHANNEL: u32 = 0x4845_4947;

/// Terrain generation and retention settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Edge length of one square tile in world units.
    pub tile_size: f32,
    /// Height samples per tile edge (the tile holds `(resolution + 1)^2` samples).
    pub resolution: u32,
    /// Peak deviation of the ground from zero.
    pub amplitude: f32,
    /// Distance between noise lattice points; larger is smoother.
    pub feature_scale: f32,
    /// Tiles within this many tiles of the player's tile stay live.
    pub retention_radius: i32,
    pub seed: u64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: 20.0,
            resolution: 8,
            amplitude: 1.5,
            feature_scale: 12.0,
            retention_radius: 2,
            seed: 42,
        }
    }
}

impl TerrainConfig {
    /// A perfectly flat configuration, handy for tests and demos.
    pub fn flat() -> Self {
        Self {
            amplitude: 0.0,
            ..Self::default()
        }
    }
}

/// Read-only ground queries used by movement and projectiles.
pub trait TerrainQuery {
    /// Ground height at a point, or `None` where no terrain is generated.
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;

    /// Whether the point lies on generated terrain.
    fn contains(&self, x: f32, z: f32) -> bool {
        self.height_at(x, z).is_some()
    }
}

/// Unbounded flat ground.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl TerrainQuery for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }
}

/// Continuous ground height at a world point.
///
/// Two octaves of value noise over a global lattice, so neighbouring tiles
/// agree along their shared edge.
pub fn sample_height(config: &TerrainConfig, x: f32, z: f32) -> f32 {
    if config.amplitude == 0.0 {
        return 0.0;
    }
    let scale = config.feature_scale.max(f32::EPSILON);
    let coarse = value_noise(config.seed, x / scale, z / scale);
    let fine = value_noise(config.seed.wrapping_add(1), 2.0 * x / scale, 2.0 * z / scale);
    let v = coarse * 0.7 + fine * 0.3;
    (v * 2.0 - 1.0) * config.amplitude
}

fn value_noise(seed: u64, x: f32, z: f32) -> f32 {
    let x0 = x.floor();
    let z0 = z.floor();
    let (ix, iz) = (x0 as i32, z0 as i32);
    let tx = smoothstep(x - x0);
    let tz = smoothstep(z - z0);

    let corner = |dx: i32, dz: i32| unit(lattice(seed, ix + dx, iz + dz, HEIGHT_CHANNEL));
    let top = lerp(corner(0, 0), corner(1, 0), tx);
    let bottom = lerp(corner(0, 1), corner(1, 1), tx);
    lerp(top, bottom, tz)
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// One generated terrain tile: a square grid of height samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainTile {
    coord: TileCoord,
    origin: Vec2,
    size: f32,
    resolution: u32,
    heights: Vec<f32>,
}

impl TerrainTile {
    /// Generate the tile at `coord`. Same inputs always give the same tile.
    pub fn generate(coord: TileCoord, config: &TerrainConfig) -> Self {
        let grid = TileGrid::new(config.tile_size);
        let origin = grid.tile_origin(coord);
        let resolution = config.resolution.max(1);
        let step = config.tile_size / resolution as f32;
        let side = resolution as usize + 1;

        let mut heights = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                let x = origin.x + col as f32 * step;
                let z = origin.y + row as f32 * step;
                heights.push(sample_height(config, x, z));
            }
        }

        Self {
            coord,
            origin,
            size: config.tile_size,
            resolution,
            heights,
        }
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Raw height samples, row-major along +Z.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// (min, max) corners on the XZ plane.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.origin, self.origin + Vec2::splat(self.size))
    }

    /// Center of the tile at ground level zero, used as its scene transform.
    pub fn center(&self) -> Vec3 {
        let half = self.size * 0.5;
        Vec3::new(self.origin.x + half, 0.0, self.origin.y + half)
    }

    /// Bilinear height inside the tile (edges inclusive), `None` outside.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        let step = self.size / self.resolution as f32;
        let fx = (x - self.origin.x) / step;
        let fz = (z - self.origin.y) / step;
        let max = self.resolution as f32;
        if !(0.0..=max).contains(&fx) || !(0.0..=max).contains(&fz) {
            return None;
        }

        let col = (fx.floor() as u32).min(self.resolution - 1);
        let row = (fz.floor() as u32).min(self.resolution - 1);
        let tx = fx - col as f32;
        let tz = fz - row as f32;

        let top = lerp(self.sample(col, row), self.sample(col + 1, row), tx);
        let bottom = lerp(self.sample(col, row + 1), self.sample(col + 1, row + 1), tx);
        Some(lerp(top, bottom, tz))
    }

    fn sample(&self, col: u32, row: u32) -> f32 {
        let side = self.resolution as usize + 1;
        self.heights[row as usize * side + col as usize]
    }
}

impl TerrainQuery for TerrainTile {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        TerrainTile::height_at(self, x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_config_defaults() {
        let config = TerrainConfig::default();
        assert_eq!(config.tile_size, 20.0);
        assert_eq!(config.retention_radius, 2);
        assert_eq!(TerrainConfig::flat().amplitude, 0.0);
    }

    #[test]
    fn generation_is_deterministic() {
        let config = TerrainConfig::default();
        let a = TerrainTile::generate(TileCoord::new(2, 3), &config);
        let b = TerrainTile::generate(TileCoord::new(2, 3), &config);
        assert_eq!(a, b);
        assert_eq!(a.heights().len(), 81);
    }

    #[test]
    fn different_seeds_give_different_ground() {
        let a = TerrainTile::generate(TileCoord::new(0, 0), &TerrainConfig::default());
        let b = TerrainTile::generate(
            TileCoord::new(0, 0),
            &TerrainConfig {
                seed: 7,
                ..TerrainConfig::default()
            },
        );
        assert_ne!(a.heights(), b.heights());
    }

    #[test]
    fn heights_stay_within_amplitude() {
        let config = TerrainConfig::default();
        let tile = TerrainTile::generate(TileCoord::new(-1, 4), &config);
        assert!(tile.heights().iter().all(|h| h.abs() <= config.amplitude + 1e-4));
    }

    #[test]
    fn neighbouring_tiles_share_edges() {
        let config = TerrainConfig::default();
        let left = TerrainTile::generate(TileCoord::new(0, 0), &config);
        let right = TerrainTile::generate(TileCoord::new(1, 0), &config);
        for i in 0..=8 {
            let z = i as f32 * 2.5;
            let a = left.height_at(20.0, z).unwrap();
            let b = right.height_at(20.0, z).unwrap();
            assert!((a - b).abs() < 1e-4, "seam mismatch at z={z}: {a} vs {b}");
        }
    }

    #[test]
    fn height_at_matches_samples_and_rejects_outside() {
        let config = TerrainConfig::default();
        let tile = TerrainTile::generate(TileCoord::new(0, 0), &config);
        let at_corner = tile.height_at(0.0, 0.0).unwrap();
        assert!((at_corner - sample_height(&config, 0.0, 0.0)).abs() < 1e-6);
        assert!(tile.height_at(-0.1, 5.0).is_none());
        assert!(tile.height_at(5.0, 20.1).is_none());
        assert!(!tile.contains(25.0, 5.0));
    }

    #[test]
    fn flat_terrain_is_zero_everywhere() {
        let config = TerrainConfig::flat();
        let tile = TerrainTile::generate(TileCoord::new(3, -2), &config);
        assert!(tile.heights().iter().all(|h| *h == 0.0));
        assert_eq!(FlatGround { height: 1.0 }.height_at(1e6, -1e6), Some(1.0));
    }

    #[test]
    fn bounds_and_center() {
        let config = TerrainConfig::default();
        let tile = TerrainTile::generate(TileCoord::new(1, -1), &config);
        let (min, max) = tile.bounds();
        assert_eq!(min, Vec2::new(20.0, -20.0));
        assert_eq!(max, Vec2::new(40.0, 0.0));
        assert_eq!(tile.center(), Vec3::new(30.0, 0.0, -10.0));
    }
}
