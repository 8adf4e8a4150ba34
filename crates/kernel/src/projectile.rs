//! Weapon charge and projectile flight.
//!
//! Weapon state machine: `Idle -> Charging -> (fire) -> Idle`. Each fired
//! projectile then flies until it hits an obstacle, leaves the terrain,
//! drops below the ground or runs out of lifetime.

use glam::Vec3;
use tankfield_common::{EntityId, ObstacleId, SceneHandle, SceneNode, Transform};
use tankfield_stream::TerrainQuery;

use crate::collision::CollisionManager;
use crate::config::ProjectileConfig;
use crate::tank::Tank;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ChargeState {
    #[default]
    Idle,
    Charging {
        power: f32,
    },
}

impl ChargeState {
    pub fn power(&self) -> f32 {
        match *self {
            ChargeState::Idle => 0.0,
            ChargeState::Charging { power } => power,
        }
    }

    pub fn is_charging(&self) -> bool {
        matches!(self, ChargeState::Charging { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    /// Tank that fired it. Only used for attribution; may outlive the tank.
    pub owner: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining lifetime in seconds.
    pub ttl: f32,
    pub radius: f32,
}

impl Projectile {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            yaw: self.velocity.x.atan2(self.velocity.z),
        }
    }
}

/// Why a projectile stopped existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    Impact { obstacle: ObstacleId, scorable: bool },
    LeftTerrain,
    HitGround,
    Expired,
    /// Removed to make room under the in-flight cap.
    Dropped,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileOutcome {
    pub id: EntityId,
    pub owner: EntityId,
    pub position: Vec3,
    pub fate: ProjectileFate,
}

impl ProjectileOutcome {
    /// Whether this outcome is worth a point.
    pub fn scores(&self) -> bool {
        matches!(self.fate, ProjectileFate::Impact { scorable: true, .. })
    }
}

/// Result of one fire event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireReport {
    pub id: EntityId,
    pub speed: f32,
    /// The oldest projectile, if it had to be dropped to stay under the cap.
    pub dropped: Option<ProjectileOutcome>,
}

/// Owns the weapon charge and every projectile in flight.
#[derive(Debug)]
pub struct ProjectileManager {
    config: ProjectileConfig,
    charge: ChargeState,
    projectiles: Vec<Projectile>,
}

impl ProjectileManager {
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            charge: ChargeState::Idle,
            projectiles: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    pub fn charge(&self) -> ChargeState {
        self.charge
    }

    /// In-flight projectiles, oldest first.
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn get(&self, id: EntityId) -> Option<&Projectile> {
        self.projectiles.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.projectiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projectiles.is_empty()
    }

    /// Called every frame the fire key is held.
    ///
    /// The first call starts charging; every call adds `charge_rate * dt`
    /// up to `max_charge`.
    pub fn start_charging(&mut self, dt: f32) {
        let gained = self.config.charge_rate * dt.max(0.0);
        let power = (self.charge.power() + gained).min(self.config.max_charge);
        if !self.charge.is_charging() {
            tracing::trace!("charging started");
        }
        self.charge = ChargeState::Charging { power };
    }

    /// Launch a projectile from the tank's muzzle along its heading.
    ///
    /// Speed is `base_speed` plus whatever charge has built up; an uncharged
    /// release fires at base speed. Charge resets to idle.
    pub fn fire(&mut self, tank: &Tank, scene: &mut dyn SceneHandle) -> FireReport {
        let speed = self.config.base_speed + self.charge.power();
        self.charge = ChargeState::Idle;

        // A zero cap behaves as one, so the new shot always has room.
        let cap = self.config.max_projectiles.max(1);
        let dropped = if self.projectiles.len() >= cap {
            let oldest = self.projectiles.remove(0);
            scene.remove(SceneNode::Projectile(oldest.id));
            tracing::debug!(id = %oldest.id.short(), "projectile dropped at cap");
            Some(ProjectileOutcome {
                id: oldest.id,
                owner: oldest.owner,
                position: oldest.position,
                fate: ProjectileFate::Dropped,
            })
        } else {
            None
        };

        let projectile = Projectile {
            id: EntityId::new(),
            owner: tank.id(),
            position: tank.muzzle(),
            velocity: tank.transform.forward() * speed,
            ttl: self.config.ttl,
            radius: self.config.radius,
        };
        scene.add(SceneNode::Projectile(projectile.id), projectile.transform());
        tracing::debug!(id = %projectile.id.short(), speed, "projectile fired");
        self.projectiles.push(projectile);

        FireReport {
            id: projectile.id,
            speed,
            dropped,
        }
    }

    /// Advance every projectile by `dt` seconds and retire finished ones.
    pub fn update(
        &mut self,
        dt: f32,
        scene: &mut dyn SceneHandle,
        collision: &CollisionManager,
        terrain: &dyn TerrainQuery,
    ) -> Vec<ProjectileOutcome> {
        let mut finished = Vec::new();
        self.projectiles.retain_mut(|p| {
            let from = p.position;
            p.position += p.velocity * dt;
            p.ttl -= dt;

            let fate = flight_check(p, from, collision, terrain);
            match fate {
                Some(fate) => {
                    scene.remove(SceneNode::Projectile(p.id));
                    tracing::debug!(id = %p.id.short(), ?fate, "projectile finished");
                    finished.push(ProjectileOutcome {
                        id: p.id,
                        owner: p.owner,
                        position: p.position,
                        fate,
                    });
                    false
                }
                None => {
                    scene.set_transform(SceneNode::Projectile(p.id), p.transform());
                    true
                }
            }
        });
        finished
    }

    /// Discard any built-up charge without firing.
    pub fn cancel_charge(&mut self) {
        if self.charge.is_charging() {
            tracing::trace!(power = self.charge.power(), "charge cancelled");
        }
        self.charge = ChargeState::Idle;
    }

    /// Drop every projectile and reset the charge.
    pub fn clear(&mut self, scene: &mut dyn SceneHandle) {
        for p in self.projectiles.drain(..) {
            scene.remove(SceneNode::Projectile(p.id));
        }
        self.charge = ChargeState::Idle;
    }
}

/// Obstacles are swept along this frame's whole step, so fast shots can't
/// tunnel through them. On impact `p.position` is moved back to the contact
/// point.
fn flight_check(
    p: &mut Projectile,
    from: Vec3,
    collision: &CollisionManager,
    terrain: &dyn TerrainQuery,
) -> Option<ProjectileFate> {
    if let Some((hit, t)) = collision.sweep(from, p.position, p.radius) {
        p.position = from.lerp(p.position, t);
        return Some(ProjectileFate::Impact {
            obstacle: hit.obstacle,
            scorable: hit.scorable,
        });
    }
    match terrain.height_at(p.position.x, p.position.z) {
        None => return Some(ProjectileFate::LeftTerrain),
        Some(ground) if p.position.y <= ground => return Some(ProjectileFate::HitGround),
        Some(_) => {}
    }
    (p.ttl <= 0.0).then_some(ProjectileFate::Expired)
}
