//! The fixed set of scene lights.
//!
//! There are always [`LIGHT_COUNT`] slots. Each slot holds a [`LightDescriptor`] with a default
//! and a live copy (see [`Tunables`]); disabled slots still exist and keep their parameters so
//! toggling a light back on restores it exactly.

use glam::{Vec3, Vec4};

use crate::tunables::Tunables;

/// Number of light slots in the scene.
pub const LIGHT_COUNT: usize = 4;

/// Most matrix slots any light kind needs (one per cube face).
pub const MAX_FACES: usize = 6;

/// Slot of the point light the campfire follows.
pub const FIRE_LIGHT: usize = 1;

/// How a light emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

impl LightKind {
    /// Number of shadow matrices (and shadow map layers) this kind renders.
    pub const fn matrix_slots(self) -> usize {
        match self {
            LightKind::Directional | LightKind::Spot => 1,
            LightKind::Point => MAX_FACES,
        }
    }

    /// Value the lighting shader switches on.
    pub const fn shader_id(self) -> u32 {
        match self {
            LightKind::Directional => 0,
            LightKind::Point => 1,
            LightKind::Spot => 2,
        }
    }
}

/// Every parameter of one light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightDescriptor {
    pub enabled: bool,
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    /// Constant, linear and quadratic attenuation terms.
    pub attenuation: Vec3,
    /// Cosine of the full-intensity cone half angle.
    pub inner_cutoff: f32,
    /// Cosine of the zero-intensity cone half angle. Never above `inner_cutoff`.
    pub outer_cutoff: f32,
    pub falloff: f32,
}

impl Default for LightDescriptor {
    fn default() -> Self {
        Self {
            enabled: false,
            kind: LightKind::Point,
            position: Vec3::new(0.0, 10.0, 0.0),
            direction: Vec3::NEG_Y,
            ambient: Vec4::new(0.0, 0.0, 0.0, 1.0),
            diffuse: Vec4::new(0.5, 0.5, 0.5, 1.0),
            specular: Vec4::ONE,
            attenuation: Vec3::new(0.5, 0.125, 0.0),
            inner_cutoff: 0.7,
            outer_cutoff: 0.6,
            falloff: 1.0,
        }
    }
}

impl LightDescriptor {
    /// Clamps parameters back into their valid ranges.
    pub fn enforce_invariants(&mut self) {
        self.inner_cutoff = self.inner_cutoff.clamp(-1.0, 1.0);
        self.outer_cutoff = self.outer_cutoff.clamp(-1.0, self.inner_cutoff);
        self.falloff = self.falloff.max(0.0);
        self.attenuation = self.attenuation.max(Vec3::ZERO);
    }

    pub fn matrix_slots(&self) -> usize {
        self.kind.matrix_slots()
    }
}

/// Where the campfire and street lamp sit; lights 1 and 2 are placed relative to them.
pub const CAMPFIRE_POSITION: Vec3 = Vec3::new(-35.0, 0.0, -5.0);
pub const LAMP_POSITION: Vec3 = Vec3::new(30.0, -1.0, 0.0);

/// The compiled-in lights: a dim sun, the campfire glow and a blue street lamp.
pub fn default_lights() -> [LightDescriptor; LIGHT_COUNT] {
    let sun = LightDescriptor {
        enabled: true,
        kind: LightKind::Directional,
        ambient: Vec4::new(0.05, 0.05, 0.05, 1.0),
        diffuse: Vec4::new(0.35, 0.35, 0.35, 1.0),
        direction: Vec3::new(0.1, -1.0, -0.1),
        ..LightDescriptor::default()
    };

    let fire_orange = Vec4::new(1.0, 0.3, 0.0, 1.0);
    let campfire = LightDescriptor {
        enabled: true,
        kind: LightKind::Point,
        diffuse: fire_orange,
        specular: fire_orange,
        position: CAMPFIRE_POSITION + Vec3::Y,
        attenuation: Vec3::new(0.25, 0.25, 0.0),
        ..LightDescriptor::default()
    };

    let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);
    let lamp = LightDescriptor {
        enabled: true,
        kind: LightKind::Spot,
        diffuse: blue,
        specular: blue,
        position: LAMP_POSITION + Vec3::new(-1.5, 9.0, 0.0),
        attenuation: Vec3::new(0.1, 0.1, 0.0),
        outer_cutoff: 0.85,
        inner_cutoff: 0.95,
        ..LightDescriptor::default()
    };

    [sun, campfire, lamp, LightDescriptor::default()]
}

/// The live light table.
#[derive(Clone, Debug)]
pub struct LightRegistry {
    table: Tunables<LightDescriptor>,
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new(default_lights())
    }
}

impl LightRegistry {
    pub fn new(defaults: [LightDescriptor; LIGHT_COUNT]) -> Self {
        let mut defaults = defaults;
        for light in &mut defaults {
            light.enforce_invariants();
        }
        Self {
            table: Tunables::new(defaults.to_vec()),
        }
    }

    pub fn get(&self, slot: usize) -> &LightDescriptor {
        self.table.get(slot)
    }

    /// Applies an edit to one light and clamps the result.
    pub fn edit(&mut self, slot: usize, change: impl FnOnce(&mut LightDescriptor)) {
        let light = self.table.get_mut(slot);
        change(light);
        light.enforce_invariants();
    }

    pub fn set_enabled(&mut self, slot: usize, enabled: bool) {
        self.edit(slot, |light| light.enabled = enabled);
    }

    pub fn disable_all(&mut self) {
        for slot in 0..LIGHT_COUNT {
            self.set_enabled(slot, false);
        }
    }

    pub fn reset(&mut self, slot: usize) {
        self.table.reset_to_default(slot);
    }

    pub fn reset_all(&mut self) {
        self.table.reset_all();
    }

    /// All slots in order, enabled or not.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &LightDescriptor)> {
        self.table.iter().enumerate()
    }

    pub fn enabled(&self) -> impl Iterator<Item = (usize, &LightDescriptor)> {
        self.iter().filter(|(_, light)| light.enabled)
    }
}

/// Surface categories with their own specular power.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKey {
    Water,
    Ground,
    Dog,
    Wood,
    Metal,
}

impl MaterialKey {
    pub const ALL: [MaterialKey; 5] = [
        MaterialKey::Water,
        MaterialKey::Ground,
        MaterialKey::Dog,
        MaterialKey::Wood,
        MaterialKey::Metal,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Specular exponent per material.
#[derive(Clone, Debug)]
pub struct SpecularPowers {
    table: Tunables<f32>,
}

impl Default for SpecularPowers {
    fn default() -> Self {
        Self {
            table: Tunables::new(vec![5.0, 100.0, 100.0, 75.0, 25.0]),
        }
    }
}

impl SpecularPowers {
    pub fn get(&self, material: MaterialKey) -> f32 {
        *self.table.get(material.index())
    }

    pub fn set(&mut self, material: MaterialKey, power: f32) {
        *self.table.get_mut(material.index()) = power.max(1.0);
    }

    pub fn reset(&mut self, material: MaterialKey) {
        self.table.reset_to_default(material.index());
    }

    pub fn reset_all(&mut self) {
        self.table.reset_all();
    }
}
