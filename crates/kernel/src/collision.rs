use glam::{Vec2, Vec3};
use tankfield_common::ObstacleId;
use tankfield_stream::Obstacle;

/// Cached copy of one obstacle's collision footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub id: ObstacleId,
    /// Center on the XZ plane.
    pub center: Vec2,
    pub radius: f32,
    pub scorable: bool,
}

impl From<&Obstacle> for Collider {
    fn from(o: &Obstacle) -> Self {
        Self {
            id: o.id,
            center: Vec2::new(o.position.x, o.position.z),
            radius: o.radius,
            scorable: o.scorable(),
        }
    }
}

/// Result of asking whether an entity may move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveResolution {
    Clear(Vec3),
    /// The move was rejected; `position` is the unchanged current position.
    Blocked { position: Vec3, obstacle: ObstacleId },
}

impl MoveResolution {
    pub fn position(&self) -> Vec3 {
        match *self {
            MoveResolution::Clear(p) => p,
            MoveResolution::Blocked { position, .. } => position,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, MoveResolution::Blocked { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleHit {
    pub obstacle: ObstacleId,
    pub scorable: bool,
}

/// Circle-vs-circle obstacle tests on the ground plane.
///
/// Holds copies, not references, so the obstacle set can change between
/// frames without leaving anything dangling. The cache is rebuilt every frame
/// and scanned exhaustively.
#[derive(Debug, Default)]
pub struct CollisionManager {
    colliders: Vec<Collider>,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with the current obstacle set.
    pub fn update_obstacles<'a>(&mut self, obstacles: impl IntoIterator<Item = &'a Obstacle>) {
        self.colliders.clear();
        self.colliders.extend(obstacles.into_iter().map(Collider::from));
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Accept or reject a move from `current` to `proposed`.
    ///
    /// A rejected move returns `current` unchanged; there is no sliding. An
    /// entity already overlapping an obstacle may still move away from it.
    pub fn resolve_move(&self, current: Vec3, proposed: Vec3, radius: f32) -> MoveResolution {
        let from = Vec2::new(current.x, current.z);
        let to = Vec2::new(proposed.x, proposed.z);
        for c in &self.colliders {
            let reach = c.radius + radius;
            let next = c.center.distance(to);
            if next >= reach {
                continue;
            }
            let now = c.center.distance(from);
            if now < reach && next > now {
                continue;
            }
            tracing::trace!(obstacle = ?c.id, "move blocked");
            return MoveResolution::Blocked {
                position: current,
                obstacle: c.id,
            };
        }
        MoveResolution::Clear(proposed)
    }

    /// First obstacle overlapping a circle at `position`, in cache order.
    pub fn first_hit(&self, position: Vec3, radius: f32) -> Option<ObstacleHit> {
        let p = Vec2::new(position.x, position.z);
        self.colliders
            .iter()
            .find(|c| c.center.distance(p) < c.radius + radius)
            .map(|c| ObstacleHit {
                obstacle: c.id,
                scorable: c.scorable,
            })
    }

    /// Earliest obstacle touched by a circle moving from `from` to `to`.
    ///
    /// Returns the hit and the fraction of the segment travelled before
    /// contact (0 when already overlapping at `from`). Ties go to cache order.
    pub fn sweep(&self, from: Vec3, to: Vec3, radius: f32) -> Option<(ObstacleHit, f32)> {
        let start = Vec2::new(from.x, from.z);
        let delta = Vec2::new(to.x, to.z) - start;
        let mut best: Option<(ObstacleHit, f32)> = None;
        for c in &self.colliders {
            let Some(t) = entry_time(start, delta, c.center, c.radius + radius) else {
                continue;
            };
            if best.is_none_or(|(_, bt)| t < bt) {
                best = Some((
                    ObstacleHit {
                        obstacle: c.id,
                        scorable: c.scorable,
                    },
                    t,
                ));
            }
        }
        best
    }
}

/// Segment parameter in `[0, 1]` at which `start + delta * t` first comes
/// within `reach` of `center`.
fn entry_time(start: Vec2, delta: Vec2, center: Vec2, reach: f32) -> Option<f32> {
    let f = start - center;
    let c = f.length_squared() - reach * reach;
    if c < 0.0 {
        return Some(0.0);
    }
    let a = delta.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let b = f.dot(delta);
    let disc = b * b - a * c;
    if b >= 0.0 || disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / a;
    (t <= 1.0).then_some(t.max(0.0))
}
