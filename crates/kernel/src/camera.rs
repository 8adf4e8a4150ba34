use glam::Vec3;
use tankfield_common::Transform;

use crate::config::CameraConfig;

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, -15.0),
            target: Vec3::ZERO,
        }
    }
}

/// Trailing camera: a fixed offset behind and above the tracked transform.
///
/// Stateless; the pose is a pure function of the transform.
#[derive(Debug, Clone, Copy)]
pub struct ChaseCamera {
    pub height: f32,
    pub distance: f32,
}

impl From<&CameraConfig> for ChaseCamera {
    fn from(config: &CameraConfig) -> Self {
        Self {
            height: config.height,
            distance: config.distance,
        }
    }
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

impl ChaseCamera {
    pub fn follow(&self, target: &Transform) -> CameraPose {
        let eye = target.position - target.forward() * self.distance + Vec3::Y * self.height;
        CameraPose {
            eye,
            target: target.position,
        }
    }
}
