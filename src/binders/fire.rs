use crate::fire::{FireParticle, FireSimulator};

/// Particle shading parameters (group 1 of the particle pipelines).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleUniforms {
    pub bottom_colour: [f32; 4],
    pub top_colour: [f32; 4],
    /// Height of the flame's base; the colour gradient starts here.
    pub min_height: f32,
    pub max_height: f32,
    pub render_normals: u32,
    pub _pad: u32,
}

impl Default for ParticleUniforms {
    fn default() -> Self {
        Self {
            bottom_colour: [1.0, 0.2, 0.0, 1.0],
            top_colour: [1.0, 1.0, 0.0, 1.0],
            min_height: 0.0,
            max_height: 0.0,
            render_normals: 0,
            _pad: 0,
        }
    }
}

/// One instance per particle: xyz centre, w billboard size.
pub const PARTICLE_INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<FireParticle>() as u64,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[wgpu::VertexAttribute {
        offset: 0,
        shader_location: 0,
        format: wgpu::VertexFormat::Float32x4,
    }],
};

/// Vertices the particle vertex stage expands each instance into (two triangles).
pub const VERTICES_PER_PARTICLE: u32 = 6;

pub struct FireBinder;

impl FireBinder {
    pub fn uniforms<R: rand::Rng>(
        fire: &FireSimulator<R>,
        render_normals: bool,
    ) -> ParticleUniforms {
        let settings = fire.settings();
        ParticleUniforms {
            bottom_colour: settings.bottom_colour.to_array(),
            top_colour: settings.top_colour.to_array(),
            min_height: fire.min_height(),
            max_height: fire.max_height(),
            render_normals: u32::from(render_normals),
            _pad: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fire::FireSettings;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn layout_matches_wgsl() {
        assert_eq!(std::mem::size_of::<ParticleUniforms>(), 48);
        assert_eq!(std::mem::size_of::<FireParticle>(), 16);
    }

    #[test]
    fn gradient_spans_the_flame() {
        let mut fire = FireSimulator::with_rng(FireSettings::default(), StdRng::seed_from_u64(1));
        fire.advance(0.0, Vec3::new(0.0, 2.0, 0.0));

        let uniforms = FireBinder::uniforms(&fire, false);
        assert_eq!(uniforms.min_height, 2.0);
        assert_eq!(uniforms.max_height, 5.0);
        assert_eq!(uniforms.top_colour, [1.0, 1.0, 0.0, 1.0]);
    }
}
