use glam::{Mat4, Vec4};

use super::gpu_matrix;

/// Surface parameters shared by the displacement and lighting paths.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceParams {
    pub specular_power: f32,
    /// Height the height map's full range displaces by; 0 for undisplaced meshes.
    pub amplitude: f32,
    /// Grid cells per side; the height map spans the whole grid.
    pub resolution: f32,
    pub wave_frequency: f32,
    pub wave_speed: f32,
}

/// Per-object uniforms (group 1).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniforms {
    /// Model matrix (object to world space transformation).
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals under non-uniform scale.
    pub normal_matrix: [[f32; 4]; 4],
    /// RGBA multiplier on the albedo texture.
    pub tint: [f32; 4],
    /// x specular power, y displacement amplitude, z grid resolution.
    pub surface: [f32; 4],
    /// x wave frequency, y wave speed.
    pub waves: [f32; 4],
}

impl Default for ObjectUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl ObjectUniforms {
    pub fn new(model: Mat4) -> Self {
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: gpu_matrix(model),
            normal_matrix: gpu_matrix(normal_matrix),
            tint: Vec4::ONE.to_array(),
            surface: [0.0; 4],
            waves: [0.0; 4],
        }
    }

    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.tint = tint.to_array();
        self
    }

    pub fn with_surface(mut self, params: SurfaceParams) -> Self {
        self.surface = [params.specular_power, params.amplitude, params.resolution, 0.0];
        self.waves = [params.wave_frequency, params.wave_speed, 0.0, 0.0];
        self
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 176);
        assert_eq!(std::mem::offset_of!(ObjectUniforms, tint), 128);
        assert_eq!(std::mem::offset_of!(ObjectUniforms, surface), 144);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0));
        let uniforms = ObjectUniforms::new(model);
        let normal = Mat4::from_cols_array_2d(&uniforms.normal_matrix);

        approx::assert_relative_eq!(
            normal.transform_vector3(Vec3::X),
            Vec3::new(0.25, 0.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn degenerate_model_gets_identity_normals() {
        let uniforms = ObjectUniforms::new(Mat4::from_scale(Vec3::ZERO));
        assert_eq!(uniforms.normal_matrix, gpu_matrix(Mat4::IDENTITY));
    }

    #[test]
    fn surface_params_are_packed() {
        let uniforms = ObjectUniforms::default().with_surface(SurfaceParams {
            specular_power: 5.0,
            amplitude: 0.4,
            resolution: 50.0,
            wave_frequency: 0.3,
            wave_speed: 0.2,
        });
        assert_eq!(uniforms.surface, [5.0, 0.4, 50.0, 0.0]);
        assert_eq!(uniforms.waves, [0.3, 0.2, 0.0, 0.0]);
    }
}
