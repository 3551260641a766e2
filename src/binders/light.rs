//! Light table and shadow matrices in the layout the lighting shader reads (group 3).

use glam::Vec3;

use super::gpu_matrix;
use crate::lights::{LIGHT_COUNT, LightDescriptor, LightRegistry, MAX_FACES};
use crate::shadow::LightMatrixSet;

/// Number of layers in the shadow map array.
pub const SHADOW_LAYERS: usize = LIGHT_COUNT * MAX_FACES;

/// One light as the shader sees it (128 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// xyz world position, w unused.
    pub position: [f32; 4],
    /// xyz normalised direction, w unused.
    pub direction: [f32; 4],
    /// Constant, linear and quadratic terms.
    pub attenuation: [f32; 4],
    /// x inner cutoff, y outer cutoff (both cosines), z falloff exponent.
    pub cone: [f32; 4],
    /// x enabled, y kind, z first shadow layer.
    pub flags: [u32; 4],
}

impl GpuLight {
    pub fn from_descriptor(slot: usize, light: &LightDescriptor) -> Self {
        let direction = light.direction.normalize_or(Vec3::NEG_Y);
        Self {
            ambient: light.ambient.to_array(),
            diffuse: light.diffuse.to_array(),
            specular: light.specular.to_array(),
            position: light.position.extend(1.0).to_array(),
            direction: direction.extend(0.0).to_array(),
            attenuation: light.attenuation.extend(0.0).to_array(),
            cone: [light.inner_cutoff, light.outer_cutoff, light.falloff, 0.0],
            flags: [
                u32::from(light.enabled),
                light.kind.shader_id(),
                (slot * MAX_FACES) as u32,
                0,
            ],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.flags[0] != 0
    }
}

/// Every light plus the global shading switches.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightBlock {
    pub lights: [GpuLight; LIGHT_COUNT],
    /// Subtracted from the fragment's light-space depth before comparison.
    pub shadow_bias: f32,
    /// Non-zero to output world normals instead of lighting.
    pub render_normals: u32,
    pub _pad: [u32; 2],
}

impl LightBlock {
    pub fn enabled_count(&self) -> usize {
        self.lights.iter().filter(|light| light.is_enabled()).count()
    }
}

/// View-projection of every shadow layer, light-major.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowMatrices {
    pub view_proj: [[[f32; 4]; 4]; SHADOW_LAYERS],
}

pub struct LightBinder;

impl LightBinder {
    pub fn light_block(
        lights: &LightRegistry,
        shadow_bias: f32,
        render_normals: bool,
    ) -> LightBlock {
        LightBlock {
            lights: std::array::from_fn(|slot| GpuLight::from_descriptor(slot, lights.get(slot))),
            shadow_bias,
            render_normals: u32::from(render_normals),
            _pad: [0; 2],
        }
    }

    pub fn shadow_matrices(matrices: &LightMatrixSet) -> ShadowMatrices {
        let mut out = ShadowMatrices {
            view_proj: [[[0.0; 4]; 4]; SHADOW_LAYERS],
        };
        for (slot, matrix) in out.view_proj.iter_mut().zip(matrices.layer_view_projections()) {
            *slot = gpu_matrix(matrix);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::LightKind;
    use crate::shadow::{LightMatrixGenerator, ShadowSettings};

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 128);
        assert_eq!(std::mem::size_of::<LightBlock>(), 528);
        assert_eq!(std::mem::offset_of!(LightBlock, shadow_bias), 512);
        assert_eq!(std::mem::size_of::<ShadowMatrices>(), 24 * 64);
    }

    #[test]
    fn block_mirrors_registry() {
        let lights = LightRegistry::default();
        let block = LightBinder::light_block(&lights, 0.005, false);

        assert_eq!(block.enabled_count(), 3);
        assert_eq!(block.lights[1].flags[1], LightKind::Point.shader_id());
        assert_eq!(block.lights[2].flags[2], 12);
        assert_eq!(block.lights[2].cone[0], 0.95);
        assert_eq!(block.shadow_bias, 0.005);
    }

    #[test]
    fn all_lights_off_leaves_nothing_enabled() {
        let mut lights = LightRegistry::default();
        lights.disable_all();
        let block = LightBinder::light_block(&lights, 0.0, true);

        assert_eq!(block.enabled_count(), 0);
        assert_eq!(block.render_normals, 1);
    }

    #[test]
    fn directions_are_normalised() {
        let lights = LightRegistry::default();
        let block = LightBinder::light_block(&lights, 0.0, false);
        let d = block.lights[0].direction;
        let length = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();

        approx::assert_relative_eq!(length, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn shadow_matrices_follow_layer_order() {
        let lights = LightRegistry::default();
        let set = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());
        let out = LightBinder::shadow_matrices(&set);

        let layer = MAX_FACES + 3;
        assert_eq!(out.view_proj[layer], gpu_matrix(set.get(1, 3).view_projection()));
    }
}
