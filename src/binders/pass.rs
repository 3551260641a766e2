use glam::{Mat4, Vec3};

use super::gpu_matrix;
use crate::frame_history::CameraMatrices;
use crate::shadow::LightMatrices;

/// Per-pass viewpoint uniforms (group 0).
///
/// Filled from the camera for scene passes and from a light's face matrices for shadow passes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PassUniforms {
    /// Combined view-projection matrix for transforming world positions to clip space.
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Eye position in world space; the billboard and specular terms need it.
    pub camera_pos: [f32; 3],
    /// Elapsed time in seconds, for the scrolling water.
    pub time: f32,
}

impl Default for PassUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO, 0.0)
    }
}

impl PassUniforms {
    pub fn new(view: Mat4, projection: Mat4, eye: Vec3, time: f32) -> Self {
        Self {
            view_proj: gpu_matrix(projection * view),
            view: gpu_matrix(view),
            proj: gpu_matrix(projection),
            camera_pos: eye.to_array(),
            time,
        }
    }

    pub fn from_camera(camera: &CameraMatrices, time: f32) -> Self {
        Self::new(camera.view, camera.projection, camera.position, time)
    }

    /// Viewpoint of one shadow map layer.
    pub fn from_light(matrices: &LightMatrices, light_position: Vec3, time: f32) -> Self {
        Self::new(matrices.view, matrices.projection, light_position, time)
    }

    pub fn view_projection(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.view_proj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<PassUniforms>(), 208);
        assert_eq!(std::mem::offset_of!(PassUniforms, camera_pos), 192);
        assert_eq!(std::mem::offset_of!(PassUniforms, time), 204);
    }

    #[test]
    fn view_projection_is_projection_times_view() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let uniforms = PassUniforms::new(view, projection, Vec3::Z * 5.0, 2.0);

        assert_eq!(uniforms.view_projection(), projection * view);
        assert_eq!(uniforms.time, 2.0);
    }
}
