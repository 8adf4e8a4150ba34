use glam::Vec3;
use tankfield_common::{EntityId, ObstacleId, Transform};
use tankfield_input::InputSnapshot;
use tankfield_stream::TerrainQuery;

use crate::collision::{CollisionManager, MoveResolution};
use crate::config::TankConfig;

/// What happened to the tank's position this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No translation was requested (nothing held, or forward and back cancel).
    Stationary,
    Moved,
    Blocked(ObstacleId),
}

/// The player tank.
#[derive(Debug, Clone)]
pub struct Tank {
    id: EntityId,
    pub transform: Transform,
    pub move_speed: f32,
    pub rotate_speed: f32,
    pub radius: f32,
    pub ride_height: f32,
    pub muzzle_height: f32,
    pub barrel_length: f32,
}

impl Tank {
    /// A tank at the origin facing +Z, resting at its ride height.
    pub fn new(config: &TankConfig) -> Self {
        Self::spawn_at(config, Transform::at(Vec3::new(0.0, config.ride_height, 0.0)))
    }

    pub fn spawn_at(config: &TankConfig, transform: Transform) -> Self {
        Self {
            id: EntityId::new(),
            transform,
            move_speed: config.move_speed,
            rotate_speed: config.rotate_speed,
            radius: config.radius,
            ride_height: config.ride_height,
            muzzle_height: config.muzzle_height,
            barrel_length: config.barrel_length,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn yaw(&self) -> f32 {
        self.transform.yaw
    }

    /// Barrel tip in world space; projectiles spawn here.
    pub fn muzzle(&self) -> Vec3 {
        self.transform.position
            + Vec3::Y * self.muzzle_height
            + self.transform.forward() * self.barrel_length
    }

    /// Apply one frame of driving input.
    ///
    /// Translation uses the heading from the start of the frame and is only
    /// committed when collision-free. Turning is never blocked.
    pub fn update_movement(
        &mut self,
        input: &InputSnapshot,
        collision: &CollisionManager,
        terrain: &dyn TerrainQuery,
    ) -> MoveOutcome {
        let mut step = 0.0;
        if input.forward {
            step += self.move_speed;
        }
        if input.backward {
            step -= self.move_speed;
        }

        let outcome = if step != 0.0 {
            self.translate(step, collision, terrain)
        } else {
            MoveOutcome::Stationary
        };

        if input.turn_left {
            self.transform.yaw += self.rotate_speed;
        }
        if input.turn_right {
            self.transform.yaw -= self.rotate_speed;
        }

        outcome
    }

    fn translate(
        &mut self,
        step: f32,
        collision: &CollisionManager,
        terrain: &dyn TerrainQuery,
    ) -> MoveOutcome {
        let current = self.transform.position;
        let mut proposed = current + self.transform.forward() * step;
        // Off the generated terrain, keep the last known height.
        proposed.y = terrain
            .height_at(proposed.x, proposed.z)
            .map(|ground| ground + self.ride_height)
            .unwrap_or(current.y);

        match collision.resolve_move(current, proposed, self.radius) {
            MoveResolution::Clear(p) => {
                self.transform.position = p;
                MoveOutcome::Moved
            }
            MoveResolution::Blocked { obstacle, .. } => MoveOutcome::Blocked(obstacle),
        }
    }
}
