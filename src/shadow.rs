//! Light-space matrices for shadow rendering.
//!
//! Every light slot owns [`MAX_FACES`] (view, projection) pairs in a [`LightMatrixSet`].
//! Directional and spot lights fill only the first; point lights fill all six, one per cube
//! face in [`CubeFace::ALL`] order. The same index is the shadow map layer offset inside the
//! light's block of the shadow array: `layer = light * MAX_FACES + face`.

use glam::{Mat4, Vec3};

use crate::lights::{LIGHT_COUNT, LightDescriptor, LightKind, LightRegistry, MAX_FACES};

/// Near/far planes and coverage used when building light projections.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    /// Width and height of the directional light's orthographic volume.
    pub scene_size: f32,
    pub directional_near: f32,
    pub directional_far: f32,
    pub spot_point_near: f32,
    pub spot_point_far: f32,
    /// Constant depth bias subtracted before the shadow comparison.
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            scene_size: 100.0,
            directional_near: 0.1,
            directional_far: 75.0,
            spot_point_near: 1.0,
            spot_point_far: 100.0,
            bias: 0.005,
        }
    }
}

impl ShadowSettings {
    pub fn set_scene_size(&mut self, size: f32) {
        self.scene_size = size.clamp(25.0, 200.0);
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias.clamp(0.0, 0.2);
    }
}

/// One face of a point light's shadow cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CubeFace {
    Down,
    Up,
    Back,
    Forward,
    Left,
    Right,
}

impl CubeFace {
    /// Stable face order; matches the face selection in the lighting shader.
    pub const ALL: [CubeFace; MAX_FACES] = [
        CubeFace::Down,
        CubeFace::Up,
        CubeFace::Back,
        CubeFace::Forward,
        CubeFace::Left,
        CubeFace::Right,
    ];

    pub const fn direction(self) -> Vec3 {
        match self {
            CubeFace::Down => Vec3::NEG_Y,
            CubeFace::Up => Vec3::Y,
            CubeFace::Back => Vec3::NEG_Z,
            CubeFace::Forward => Vec3::Z,
            CubeFace::Left => Vec3::NEG_X,
            CubeFace::Right => Vec3::X,
        }
    }
}

/// View and projection for one shadow map layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl LightMatrices {
    pub const IDENTITY: Self = Self {
        view: Mat4::IDENTITY,
        projection: Mat4::IDENTITY,
    };

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Matrices for every light slot and face.
#[derive(Clone, Debug, PartialEq)]
pub struct LightMatrixSet {
    slots: [[LightMatrices; MAX_FACES]; LIGHT_COUNT],
}

impl Default for LightMatrixSet {
    fn default() -> Self {
        Self {
            slots: [[LightMatrices::IDENTITY; MAX_FACES]; LIGHT_COUNT],
        }
    }
}

impl LightMatrixSet {
    pub fn get(&self, light: usize, face: usize) -> &LightMatrices {
        &self.slots[light][face]
    }

    /// Faces of one light in [`CubeFace::ALL`] order.
    pub fn faces(&self, light: usize) -> &[LightMatrices; MAX_FACES] {
        &self.slots[light]
    }

    /// Combined view-projection of every layer, light-major.
    pub fn layer_view_projections(&self) -> impl Iterator<Item = Mat4> + '_ {
        self.slots
            .iter()
            .flat_map(|faces| faces.iter().map(LightMatrices::view_projection))
    }

    /// Recomputes the matrices of every enabled light.
    ///
    /// Disabled lights keep whatever they held before; nothing samples them.
    pub fn regenerate(&mut self, lights: &LightRegistry, settings: &ShadowSettings) {
        for (slot, light) in lights.enabled() {
            LightMatrixGenerator::fill(light, settings, &mut self.slots[slot]);
        }
    }
}

/// Builds light-space view and projection matrices.
pub struct LightMatrixGenerator;

impl LightMatrixGenerator {
    /// Fresh matrix set for the current light table.
    pub fn generate(lights: &LightRegistry, settings: &ShadowSettings) -> LightMatrixSet {
        let mut set = LightMatrixSet::default();
        set.regenerate(lights, settings);
        set
    }

    /// Writes the matrices of one light into its face block.
    ///
    /// Single-face lights touch only `faces[0]`; the other five keep their old contents.
    fn fill(
        light: &LightDescriptor,
        settings: &ShadowSettings,
        faces: &mut [LightMatrices; MAX_FACES],
    ) {
        match light.kind {
            LightKind::Directional => {
                let half = settings.scene_size * 0.5;
                faces[0] = LightMatrices {
                    view: look_along(light.position, light.direction),
                    projection: Mat4::orthographic_rh(
                        -half,
                        half,
                        -half,
                        half,
                        settings.directional_near,
                        settings.directional_far,
                    ),
                };
            }
            LightKind::Spot => {
                faces[0] = LightMatrices {
                    view: look_along(light.position, light.direction),
                    projection: perspective(settings),
                };
            }
            LightKind::Point => {
                let projection = perspective(settings);
                for (slot, face) in faces.iter_mut().zip(CubeFace::ALL) {
                    *slot = LightMatrices {
                        view: look_along(light.position, face.direction()),
                        projection,
                    };
                }
            }
        }
    }
}

fn perspective(settings: &ShadowSettings) -> Mat4 {
    Mat4::perspective_rh(
        std::f32::consts::FRAC_PI_2,
        1.0,
        settings.spot_point_near,
        settings.spot_point_far,
    )
}

/// View matrix at `eye` looking along `direction`, with an up vector that never degenerates.
fn look_along(eye: Vec3, direction: Vec3) -> Mat4 {
    let forward = direction.normalize_or(Vec3::NEG_Y);
    let up = if forward.dot(Vec3::Y).abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    Mat4::look_to_rh(eye, forward, up)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec4;

    fn only(kind: LightKind) -> LightRegistry {
        let mut lights = LightRegistry::default();
        lights.disable_all();
        lights.edit(3, |light| {
            light.enabled = true;
            light.kind = kind;
            light.position = Vec3::new(4.0, 2.0, -1.0);
            light.direction = Vec3::new(0.0, -1.0, 1.0);
        });
        lights
    }

    /// Direction the view matrix looks along, recovered from its inverse.
    fn view_forward(view: &Mat4) -> Vec3 {
        view.inverse().transform_vector3(Vec3::NEG_Z).normalize()
    }

    #[test]
    fn point_light_gets_six_axis_aligned_faces_in_order() {
        let lights = only(LightKind::Point);
        let set = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());

        let expected = [
            Vec3::NEG_Y,
            Vec3::Y,
            Vec3::NEG_Z,
            Vec3::Z,
            Vec3::NEG_X,
            Vec3::X,
        ];
        for (face, direction) in set.faces(3).iter().zip(expected) {
            assert_relative_eq!(view_forward(&face.view), direction, epsilon = 1e-5);
        }
    }

    #[test]
    fn point_light_generation_leaves_direction_untouched() {
        let lights = only(LightKind::Point);
        let before = lights.get(3).direction;

        let _ = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());

        assert_eq!(lights.get(3).direction, before);
    }

    #[test]
    fn spot_light_fills_only_first_slot() {
        let lights = only(LightKind::Spot);
        let set = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());

        let direction = Vec3::new(0.0, -1.0, 1.0).normalize();
        assert_relative_eq!(view_forward(&set.get(3, 0).view), direction, epsilon = 1e-5);
        for face in 1..MAX_FACES {
            assert_eq!(set.get(3, face), &LightMatrices::IDENTITY);
        }
    }

    #[test]
    fn directional_projection_spans_scene_size() {
        let lights = only(LightKind::Directional);
        let settings = ShadowSettings {
            scene_size: 40.0,
            ..ShadowSettings::default()
        };
        let set = LightMatrixGenerator::generate(&lights, &settings);

        let edge = set.get(3, 0).projection * Vec4::new(20.0, 0.0, -1.0, 1.0);
        assert_relative_eq!(edge.x / edge.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn disabled_lights_keep_stale_matrices() {
        let mut lights = only(LightKind::Spot);
        let settings = ShadowSettings::default();
        let mut set = LightMatrixGenerator::generate(&lights, &settings);
        let stale = *set.get(3, 0);

        lights.edit(3, |light| {
            light.enabled = false;
            light.position = Vec3::new(50.0, 50.0, 50.0);
        });
        set.regenerate(&lights, &settings);

        assert_eq!(set.get(3, 0), &stale);
    }

    #[test]
    fn straight_down_direction_has_valid_view() {
        let view = look_along(Vec3::ZERO, Vec3::NEG_Y);
        assert!(view.is_finite());
        assert_relative_eq!(view_forward(&view), Vec3::NEG_Y, epsilon = 1e-5);
    }
}
