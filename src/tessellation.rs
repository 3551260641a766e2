//! Level-of-detail selection for the water surface.
//!
//! The water is a grid of unit patches. Each frame every patch gets a tessellation factor,
//! either from its distance to the camera or straight from the edge/inside sliders. Factors
//! snap up to a power of two so only a handful of pre-built patch meshes are needed, and the
//! patches are grouped into one instanced batch per level.

use glam::{Vec2, Vec3, Vec4};

use crate::tunables::Tunables;

/// Highest tessellation factor the hardware path allowed.
pub const MAX_FACTOR: f32 = 64.0;

/// Subdivision levels with a pre-built patch mesh: 1, 2, 4, ..., 64.
pub const LEVELS: [u32; 7] = [1, 2, 4, 8, 16, 32, 64];

/// How patch factors are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TessellationMode {
    /// Factor falls from `max_factor` to `min_factor` with camera distance.
    Distance,
    /// Factor comes from `edge_factor` and `inside_factor` directly.
    Sliders,
    /// Every patch is a single quad.
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TessellationProperties {
    pub mode: TessellationMode,
    pub edge_factor: Vec4,
    pub inside_factor: Vec2,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_factor: f32,
    pub max_factor: f32,
}

impl Default for TessellationProperties {
    fn default() -> Self {
        Self {
            mode: TessellationMode::Distance,
            edge_factor: Vec4::splat(4.0),
            inside_factor: Vec2::splat(4.0),
            min_distance: 0.0,
            max_distance: 30.0,
            min_factor: 1.0,
            max_factor: 10.0,
        }
    }
}

/// Live tessellation settings plus their defaults.
pub type TessellationTunables = Tunables<TessellationProperties>;

pub fn default_tessellation() -> TessellationTunables {
    Tunables::single(TessellationProperties::default())
}

impl TessellationProperties {
    /// Raw factor for a patch whose centre is `distance` from the camera.
    pub fn factor_at(&self, distance: f32) -> f32 {
        let factor = match self.mode {
            TessellationMode::Off => 1.0,
            TessellationMode::Sliders => self
                .edge_factor
                .max_element()
                .max(self.inside_factor.max_element()),
            TessellationMode::Distance => {
                let range = self.max_distance - self.min_distance;
                let t = if range > f32::EPSILON {
                    ((distance - self.min_distance) / range).clamp(0.0, 1.0)
                } else if distance <= self.min_distance {
                    0.0
                } else {
                    1.0
                };
                self.max_factor + (self.min_factor - self.max_factor) * t
            }
        };
        factor.clamp(1.0, MAX_FACTOR)
    }
}

/// Rounds a factor up to the nearest pre-built level and returns that level's index.
pub fn level_index(factor: f32) -> usize {
    let factor = factor.clamp(1.0, MAX_FACTOR);
    LEVELS
        .iter()
        .position(|&level| level as f32 >= factor)
        .unwrap_or(LEVELS.len() - 1)
}

/// Per-instance data for one water patch: its origin in the water's local space.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PatchInstance {
    pub origin: [f32; 2],
}

impl PatchInstance {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PatchInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 3,
            format: wgpu::VertexFormat::Float32x2,
        }],
    };
}

/// A contiguous run of instances that share one patch mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatchBatch {
    pub level_index: usize,
    pub first_instance: u32,
    pub instance_count: u32,
}

/// The water's patches for one frame, sorted by level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WaterPatchPlan {
    pub instances: Vec<PatchInstance>,
    pub batches: Vec<PatchBatch>,
}

impl WaterPatchPlan {
    /// Plans a `resolution × resolution` water grid placed at `origin`, viewed from `camera`.
    pub fn build(
        properties: &TessellationProperties,
        resolution: u32,
        origin: Vec3,
        camera: Vec3,
    ) -> Self {
        let mut per_level: [Vec<PatchInstance>; LEVELS.len()] = Default::default();

        for z in 0..resolution {
            for x in 0..resolution {
                let local = Vec2::new(x as f32, z as f32);
                let centre = origin + Vec3::new(local.x + 0.5, 0.0, local.y + 0.5);
                let level = level_index(properties.factor_at(centre.distance(camera)));
                per_level[level].push(PatchInstance {
                    origin: local.into(),
                });
            }
        }

        let mut plan = Self::default();
        for (level_index, patches) in per_level.into_iter().enumerate() {
            if patches.is_empty() {
                continue;
            }
            plan.batches.push(PatchBatch {
                level_index,
                first_instance: plan.instances.len() as u32,
                instance_count: patches.len() as u32,
            });
            plan.instances.extend(patches);
        }
        plan
    }

    pub fn patch_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn levels_are_powers_of_two() {
        for factor in [0.0, 1.0, 1.5, 3.0, 4.0, 10.0, 33.0, 64.0, 500.0] {
            let level = LEVELS[level_index(factor)];
            assert!(level.is_power_of_two());
            assert!((1..=64).contains(&level));
            assert!(level as f32 >= factor.clamp(1.0, 64.0));
        }
    }

    #[test]
    fn distance_mode_interpolates_between_factors() {
        let props = TessellationProperties::default();
        assert_eq!(props.factor_at(0.0), 10.0);
        assert_eq!(props.factor_at(15.0), 5.5);
        assert_eq!(props.factor_at(30.0), 1.0);
        assert_eq!(props.factor_at(300.0), 1.0);
    }

    #[test]
    fn slider_mode_uses_largest_factor() {
        let props = TessellationProperties {
            mode: TessellationMode::Sliders,
            edge_factor: Vec4::new(2.0, 3.0, 9.0, 1.0),
            inside_factor: Vec2::new(5.0, 4.0),
            ..TessellationProperties::default()
        };
        assert_eq!(props.factor_at(1000.0), 9.0);
    }

    #[test]
    fn off_mode_is_flat() {
        let props = TessellationProperties {
            mode: TessellationMode::Off,
            ..TessellationProperties::default()
        };
        let plan = WaterPatchPlan::build(&props, 8, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].level_index, 0);
    }

    #[test]
    fn every_patch_lands_in_exactly_one_batch() {
        let props = TessellationProperties::default();
        let plan = WaterPatchPlan::build(&props, 50, Vec3::new(-25.0, -2.0, -25.0), Vec3::ZERO);

        assert_eq!(plan.patch_count(), 2500);
        let covered: u32 = plan.batches.iter().map(|b| b.instance_count).sum();
        assert_eq!(covered, 2500);

        let unique: HashSet<(u32, u32)> = plan
            .instances
            .iter()
            .map(|p| (p.origin[0] as u32, p.origin[1] as u32))
            .collect();
        assert_eq!(unique.len(), 2500);

        let mut next = 0;
        for batch in &plan.batches {
            assert_eq!(batch.first_instance, next);
            next += batch.instance_count;
        }
    }

    #[test]
    fn patches_near_the_camera_are_finer() {
        let props = TessellationProperties::default();
        let plan = WaterPatchPlan::build(&props, 50, Vec3::ZERO, Vec3::new(0.5, 0.0, 0.5));

        let level_of = |x: f32, z: f32| {
            let index = plan
                .instances
                .iter()
                .position(|p| p.origin == [x, z])
                .unwrap() as u32;
            plan.batches
                .iter()
                .find(|b| (b.first_instance..b.first_instance + b.instance_count).contains(&index))
                .unwrap()
                .level_index
        };
        assert!(level_of(0.0, 0.0) > level_of(49.0, 49.0));
    }
}
