//! CPU-to-GPU parameter marshalling.
//!
//! Every struct in this module is `#[repr(C)]` and [`bytemuck::Pod`], laid out to match the
//! WGSL struct of the same name under `src/shaders/`. Matrices are column-major
//! (`glam::Mat4::to_cols_array_2d`), which is what WGSL expects, so no transpose happens at
//! upload time.
//!
//! Per-draw uniforms (camera and object) are not written to a buffer per draw. Instead every
//! draw pushes its values into a [`UniformArena`] and records the returned offset; the whole
//! arena is uploaded once per frame and each draw binds its slot with a dynamic offset.
//!
//! # Bind group slots
//!
//! | Group | Contents                                            | Used by               |
//! |-------|-----------------------------------------------------|-----------------------|
//! | 0     | [`PassUniforms`] (dynamic offset)                   | every scene pipeline  |
//! | 1     | [`ObjectUniforms`] (dynamic offset) or particles    | every scene pipeline  |
//! | 2     | albedo, height map, filtering sampler               | surface pipelines     |
//! | 3     | [`LightBlock`], [`ShadowMatrices`], shadow array    | lit pipelines         |

pub mod depth;
pub mod fire;
pub mod light;
pub mod motion_blur;
pub mod object;
pub mod pass;
pub mod terrain;
pub mod texture;
pub mod water;

use glam::Mat4;

pub use depth::{DepthBinder, OverlayUniforms};
pub use fire::{FireBinder, PARTICLE_INSTANCE_LAYOUT, ParticleUniforms};
pub use light::{GpuLight, LightBinder, LightBlock, ShadowMatrices};
pub use motion_blur::{BlurUniforms, MotionBlurBinder};
pub use object::{ObjectUniforms, SurfaceParams};
pub use pass::PassUniforms;
pub use terrain::TerrainBinder;
pub use texture::TextureBinder;
pub use water::WaterBinder;

/// Texture slots inside the surface group (group 2).
pub mod slots {
    /// Diffuse colour texture.
    pub const ALBEDO: u32 = 0;
    /// Displacement source for water and terrain; plain white for everything else.
    pub const HEIGHT_MAP: u32 = 1;
    pub const SURFACE_SAMPLER: u32 = 2;

    /// Binding of the shadow map array inside the lighting group (group 3).
    pub const SHADOW_MAP: u32 = 2;
    pub const SHADOW_SAMPLER: u32 = 3;
}

/// Converts a matrix to the column-major layout WGSL reads.
pub fn gpu_matrix(matrix: Mat4) -> [[f32; 4]; 4] {
    matrix.to_cols_array_2d()
}

/// Staging area for one frame's dynamic-offset uniforms.
///
/// Values are appended at offsets aligned to [`UniformArena::ALIGNMENT`], the minimum
/// uniform offset alignment every wgpu backend accepts, so any returned offset can be passed
/// straight to `set_bind_group`.
#[derive(Debug, Default)]
pub struct UniformArena {
    bytes: Vec<u8>,
}

impl UniformArena {
    pub const ALIGNMENT: usize = 256;

    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds a struct size up to a whole number of slots.
    pub const fn slot_size(size: usize) -> usize {
        size.div_ceil(Self::ALIGNMENT) * Self::ALIGNMENT
    }

    /// Forgets last frame's values; the allocation is kept.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Appends `value` in a fresh slot and returns its byte offset.
    pub fn push<T: bytemuck::Pod>(&mut self, value: &T) -> u32 {
        let offset = self.bytes.len();
        let data = bytemuck::bytes_of(value);
        self.bytes.extend_from_slice(data);
        self.bytes.resize(offset + Self::slot_size(data.len()), 0);
        offset as u32
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_aligned_and_disjoint() {
        let mut arena = UniformArena::new();
        let pass = PassUniforms::default();
        let object = ObjectUniforms::default();

        let mut ranges = Vec::new();
        for i in 0..10 {
            let (offset, size) = if i % 3 == 0 {
                (arena.push(&pass), std::mem::size_of::<PassUniforms>())
            } else {
                (arena.push(&object), std::mem::size_of::<ObjectUniforms>())
            };
            assert_eq!(offset as usize % UniformArena::ALIGNMENT, 0);
            ranges.push(offset as usize..offset as usize + size);
        }

        for pair in ranges.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert!(ranges.last().is_some_and(|r| r.end <= arena.len()));
    }

    #[test]
    fn pushed_bytes_are_readable_at_offset() {
        let mut arena = UniformArena::new();
        arena.push(&[1.0f32; 4]);
        let offset = arena.push(&[7u32, 8, 9, 10]) as usize;

        let slot: &[u32] = bytemuck::cast_slice(&arena.as_bytes()[offset..offset + 16]);
        assert_eq!(slot, &[7, 8, 9, 10]);
    }

    #[test]
    fn clear_restarts_at_zero() {
        let mut arena = UniformArena::new();
        arena.push(&PassUniforms::default());
        arena.clear();

        assert!(arena.is_empty());
        assert_eq!(arena.push(&PassUniforms::default()), 0);
    }

    #[test]
    fn matrices_upload_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(gpu_matrix(m)[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
