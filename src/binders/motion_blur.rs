use glam::Mat4;

use super::gpu_matrix;
use crate::frame_history::CameraMatrices;
use crate::settings::MotionBlurSettings;

/// Inputs to the velocity reconstruction in the blur shader.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniforms {
    /// Takes this frame's clip position back to world space.
    pub view_proj_inverse: [[f32; 4]; 4],
    /// Takes a world position to last frame's clip space.
    pub previous_view_proj: [[f32; 4]; 4],
    pub strength: f32,
    pub samples: u32,
    pub _pad: [u32; 2],
}

pub struct MotionBlurBinder;

impl MotionBlurBinder {
    /// Blur from `previous` to `current`.
    ///
    /// With no previous frame the current matrices stand in, which reconstructs zero velocity
    /// and leaves the image untouched.
    pub fn uniforms(
        current: &CameraMatrices,
        previous: Option<&CameraMatrices>,
        settings: &MotionBlurSettings,
    ) -> BlurUniforms {
        let view_proj = current.view_projection();
        let previous_view_proj = previous.map_or(view_proj, CameraMatrices::view_projection);
        BlurUniforms {
            view_proj_inverse: gpu_matrix(view_proj.inverse()),
            previous_view_proj: gpu_matrix(previous_view_proj),
            strength: settings.strength,
            samples: settings.samples.max(1),
            _pad: [0; 2],
        }
    }

    pub fn previous_view_projection(uniforms: &BlurUniforms) -> Mat4 {
        Mat4::from_cols_array_2d(&uniforms.previous_view_proj)
    }
}
