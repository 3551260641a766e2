use glam::Vec3;

use crate::camera::Camera;
use crate::config::CameraRigConfig;

/// Controls how the orbit camera moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrbitMode {
    /// Camera holds its angle.
    Paused,
    /// Camera auto-rotates around the target.
    AutoRotate {
        /// Rotation speed in radians per second (positive = counterclockwise from above).
        speed: f32,
    },
}

/// A camera that circles a target point at a fixed distance and height.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Horizontal distance from target.
    pub distance: f32,
    /// Height above the target.
    pub height: f32,
    /// Horizontal angle in radians.
    pub azimuth: f32,
    pub fov: f32,
    pub mode: OrbitMode,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 60.0,
            height: 18.0,
            azimuth: 0.0,
            fov: std::f32::consts::FRAC_PI_4,
            mode: OrbitMode::AutoRotate { speed: 0.1 },
        }
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraRigConfig) -> Self {
        Self {
            distance: config.distance,
            height: config.height,
            mode: OrbitMode::AutoRotate {
                speed: config.speed,
            },
            ..Self::default()
        }
    }

    pub fn target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Pauses or resumes rotation, keeping the configured speed.
    pub fn toggle_pause(&mut self, speed: f32) {
        self.mode = match self.mode {
            OrbitMode::Paused => OrbitMode::AutoRotate { speed },
            OrbitMode::AutoRotate { .. } => OrbitMode::Paused,
        };
    }

    pub fn update(&mut self, dt: f32) {
        if let OrbitMode::AutoRotate { speed } = self.mode {
            self.azimuth = (self.azimuth + speed * dt) % std::f32::consts::TAU;
        }
    }

    /// Get the current camera state.
    pub fn camera(&self) -> Camera {
        let offset = Vec3::new(
            self.distance * self.azimuth.sin(),
            self.height,
            self.distance * self.azimuth.cos(),
        );

        Camera {
            position: self.target + offset,
            fov: self.fov,
            ..Camera::default()
        }
        .looking_at(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn auto_rotate_advances_azimuth() {
        let mut orbit = OrbitCamera::default();
        orbit.mode = OrbitMode::AutoRotate { speed: 0.5 };
        orbit.update(2.0);
        assert_relative_eq!(orbit.azimuth, 1.0);
    }

    #[test]
    fn paused_orbit_holds_still() {
        let mut orbit = OrbitCamera::default();
        orbit.toggle_pause(0.5);
        let before = orbit.camera();
        orbit.update(3.0);
        assert_eq!(orbit.camera(), before);
    }

    #[test]
    fn camera_keeps_distance_and_height() {
        let orbit = OrbitCamera {
            azimuth: 1.2,
            ..OrbitCamera::default()
        }
        .target(Vec3::new(1.0, 2.0, 3.0));
        let camera = orbit.camera();
        let offset = camera.position - orbit.target;

        assert_relative_eq!(offset.y, orbit.height, epsilon = 1e-4);
        assert_relative_eq!(offset.x.hypot(offset.z), orbit.distance, epsilon = 1e-4);
    }
}
