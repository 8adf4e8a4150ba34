use glam::{Vec2, Vec3};
use tankfield_common::TileCoord;

/// Fixed-size square tiling of the XZ ground plane.
///
/// Positions map to tiles by `floor(position / tile_size)` on each axis.
#[derive(Debug, Clone, Copy)]
pub struct TileGrid {
    tile_size: f32,
}

impl TileGrid {
    /// Create a grid with the given tile edge length.
    pub fn new(tile_size: f32) -> Self {
        assert!(tile_size > 0.0, "tile_size must be positive");
        Self { tile_size }
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Convert a world position to the tile containing it.
    pub fn position_to_tile(&self, pos: Vec3) -> TileCoord {
        self.point_to_tile(pos.x, pos.z)
    }

    pub fn point_to_tile(&self, x: f32, z: f32) -> TileCoord {
        TileCoord {
            x: (x / self.tile_size).floor() as i32,
            z: (z / self.tile_size).floor() as i32,
        }
    }

    /// Minimum (x, z) corner of a tile in world space.
    pub fn tile_origin(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(
            coord.x as f32 * self.tile_size,
            coord.z as f32 * self.tile_size,
        )
    }

    /// All tiles within a square radius (in tiles) of a center tile, in
    /// canonical order.
    pub fn tiles_in_radius(&self, center: TileCoord, radius: i32) -> Vec<TileCoord> {
        let radius = radius.max(0);
        let side = (2 * radius + 1) as usize;
        let mut result = Vec::with_capacity(side * side);
        for dx in -radius..=radius {
            for dz in -radius..=radius {
                result.push(TileCoord::new(center.x + dx, center.z + dz));
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_to_tile_basic() {
        let grid = TileGrid::new(16.0);
        let coord = grid.position_to_tile(Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(coord, TileCoord::new(0, 0));

        let coord = grid.position_to_tile(Vec3::new(20.0, 0.0, -5.0));
        assert_eq!(coord, TileCoord::new(1, -1));
    }

    #[test]
    fn tile_edges_belong_to_the_upper_tile() {
        let grid = TileGrid::new(20.0);
        assert_eq!(grid.point_to_tile(20.0, 0.0), TileCoord::new(1, 0));
        assert_eq!(grid.point_to_tile(-0.001, 0.0), TileCoord::new(-1, 0));
    }

    #[test]
    fn tile_origin_is_min_corner() {
        let grid = TileGrid::new(20.0);
        assert_eq!(grid.tile_origin(TileCoord::new(2, -3)), Vec2::new(40.0, -60.0));
    }

    #[test]
    fn tiles_in_radius_is_a_square() {
        let grid = TileGrid::new(20.0);
        let tiles = grid.tiles_in_radius(TileCoord::new(5, 5), 2);
        assert_eq!(tiles.len(), 25);
        assert!(tiles.iter().all(|t| t.chebyshev(TileCoord::new(5, 5)) <= 2));
        assert_eq!(grid.tiles_in_radius(TileCoord::new(0, 0), 0).len(), 1);
    }

    #[test]
    #[should_panic(expected = "tile_size must be positive")]
    fn zero_tile_size_panics() {
        TileGrid::new(0.0);
    }
}
