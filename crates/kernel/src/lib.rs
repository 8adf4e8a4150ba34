//! Game kernel: the per-frame update loop and the entities it drives.
//!
//! # Invariants
//! - One [`Game::frame`] call runs to completion and never fails.
//! - Frame order is fixed: input, tank, terrain, collision cache, projectiles, camera.
//! - Score never decreases.

pub mod camera;
pub mod clock;
pub mod collision;
pub mod config;
pub mod game;
pub mod projectile;
pub mod tank;

pub use camera::{CameraPose, ChaseCamera};
pub use clock::FrameClock;
pub use collision::{Collider, CollisionManager, MoveResolution, ObstacleHit};
pub use config::{CameraConfig, ConfigError, GameConfig, ProjectileConfig, TankConfig};
pub use game::{FrameReport, Game, GameEvent, GameState};
pub use projectile::{ChargeState, FireReport, Projectile, ProjectileFate, ProjectileManager, ProjectileOutcome};
pub use tank::{MoveOutcome, Tank};
