//! Game configuration, loadable from JSON.
//!
//! Every section has `#[serde(default)]`, so a config file only needs the
//! values it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tankfield_stream::{ObstacleConfig, TerrainConfig};

/// Errors from loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Player tank tuning. Speeds are per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    pub move_speed: f32,
    pub rotate_speed: f32,
    /// Bounding circle radius for obstacle collision.
    pub radius: f32,
    /// Height of the tank origin above the ground.
    pub ride_height: f32,
    /// Barrel height above the tank origin.
    pub muzzle_height: f32,
    /// Distance from the tank origin to the barrel tip along the heading.
    pub barrel_length: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.1,
            rotate_speed: 0.02,
            radius: 1.5,
            ride_height: 0.5,
            muzzle_height: 0.85,
            barrel_length: 2.45,
        }
    }
}

/// Weapon and projectile tuning. Speeds are per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Muzzle speed of an uncharged shot.
    pub base_speed: f32,
    /// Charge gained per second of holding the fire key.
    pub charge_rate: f32,
    /// Cap on accumulated charge, added to `base_speed` on release.
    pub max_charge: f32,
    /// Seconds a projectile lives before expiring.
    pub ttl: f32,
    pub radius: f32,
    /// In-flight cap; firing past it drops the oldest projectile.
    pub max_projectiles: usize,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            base_speed: 30.0,
            charge_rate: 20.0,
            max_charge: 40.0,
            ttl: 3.0,
            radius: 0.2,
            max_projectiles: 16,
        }
    }
}

/// Chase camera offsets relative to the tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub height: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 10.0,
            distance: 15.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tank: TankConfig,
    pub terrain: TerrainConfig,
    pub obstacles: ObstacleConfig,
    pub projectiles: ProjectileConfig,
    pub camera: CameraConfig,
}

impl GameConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "config loaded");
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation can't run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
            if v > 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be positive and finite",
                })
            }
        }
        fn non_negative(field: &'static str, v: f32) -> Result<(), ConfigError> {
            if v >= 0.0 && v.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: "must be non-negative and finite",
                })
            }
        }

        positive("tank.move_speed", self.tank.move_speed)?;
        positive("tank.rotate_speed", self.tank.rotate_speed)?;
        positive("tank.radius", self.tank.radius)?;
        non_negative("tank.ride_height", self.tank.ride_height)?;
        non_negative("tank.muzzle_height", self.tank.muzzle_height)?;
        non_negative("tank.barrel_length", self.tank.barrel_length)?;

        positive("terrain.tile_size", self.terrain.tile_size)?;
        positive("terrain.feature_scale", self.terrain.feature_scale)?;
        non_negative("terrain.amplitude", self.terrain.amplitude)?;
        if self.terrain.resolution == 0 {
            return Err(ConfigError::Invalid {
                field: "terrain.resolution",
                reason: "must be at least 1",
            });
        }
        if self.terrain.retention_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "terrain.retention_radius",
                reason: "must not be negative",
            });
        }

        if self.obstacles.min_per_tile > self.obstacles.max_per_tile {
            return Err(ConfigError::Invalid {
                field: "obstacles.min_per_tile",
                reason: "must not exceed max_per_tile",
            });
        }
        // Obstacle ids carry a u16 per-tile index.
        if self.obstacles.max_per_tile > u32::from(u16::MAX) {
            return Err(ConfigError::Invalid {
                field: "obstacles.max_per_tile",
                reason: "must not exceed 65535",
            });
        }
        positive("obstacles.min_radius", self.obstacles.min_radius)?;
        non_negative("obstacles.edge_margin", self.obstacles.edge_margin)?;
        non_negative("obstacles.spawn_clearance", self.obstacles.spawn_clearance)?;
        if self.obstacles.max_radius < self.obstacles.min_radius {
            return Err(ConfigError::Invalid {
                field: "obstacles.max_radius",
                reason: "must not be below min_radius",
            });
        }

        positive("projectiles.base_speed", self.projectiles.base_speed)?;
        non_negative("projectiles.charge_rate", self.projectiles.charge_rate)?;
        non_negative("projectiles.max_charge", self.projectiles.max_charge)?;
        positive("projectiles.ttl", self.projectiles.ttl)?;
        positive("projectiles.radius", self.projectiles.radius)?;
        if self.projectiles.max_projectiles == 0 {
            return Err(ConfigError::Invalid {
                field: "projectiles.max_projectiles",
                reason: "must be at least 1",
            });
        }

        non_negative("camera.height", self.camera.height)?;
        non_negative("camera.distance", self.camera.distance)?;
        Ok(())
    }
}
