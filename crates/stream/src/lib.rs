//! Streaming: terrain tiles generated around the player, and their obstacles.
//!
//! # Invariants
//! - At most one live tile per grid coordinate.
//! - Tile content (heights and obstacles) is a pure function of seed and coordinate.
//! - Every live obstacle belongs to a live tile.

mod grid;
mod manager;
mod obstacles;
mod terrain;

pub use grid::TileGrid;
pub use manager::{StreamDelta, StreamStats, TerrainManager, TerrainView};
pub use obstacles::{Obstacle, ObstacleConfig, ObstacleKind, ObstacleManager, generate_obstacles};
pub use terrain::{FlatGround, TerrainConfig, TerrainQuery, TerrainTile, sample_height};

pub fn crate_info() -> &'static str {
    "tankfield-stream v0.1.0"
}
