//! Scene objects stored in a `hecs` world.
//!
//! Every drawable is an entity with a [`Transform`] and a [`Renderable`]; animated ones also
//! carry an [`Orbit`]. The render passes never special-case individual objects: they iterate
//! [`SceneObjects::draws`] and pick a shading path from [`Shading`].

use glam::{Mat4, Quat, Vec3};

use crate::lights::{CAMPFIRE_POSITION, LAMP_POSITION, MaterialKey};

/// Position, scale and heading of an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub yaw: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            yaw: 0.0,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    pub fn yaw_degrees(mut self, degrees: f32) -> Self {
        self.yaw = degrees.to_radians();
        self
    }

    /// Scale, then yaw, then translate.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_rotation_y(self.yaw),
            self.position,
        )
    }
}

/// Circles an object around `pivot`, its transform acting as the offset from the pivot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub pivot: Vec3,
    /// Radians per second.
    pub rate: f32,
}

impl Orbit {
    pub fn matrix(&self, local: &Transform, elapsed: f32) -> Mat4 {
        Mat4::from_translation(self.pivot)
            * Mat4::from_rotation_y(self.rate * elapsed)
            * local.matrix()
    }
}

/// Geometry an object is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKey {
    Terrain,
    Water,
    Sphere,
    Cube,
    Corgi,
    House,
    Campfire,
    Lamp,
    Pier,
}

impl MeshKey {
    /// Model file stem under the asset directory, for meshes loaded from disk.
    pub const fn model_file(self) -> Option<&'static str> {
        match self {
            MeshKey::Corgi => Some("corgi"),
            MeshKey::House => Some("house"),
            MeshKey::Campfire => Some("campfire"),
            MeshKey::Lamp => Some("lamp"),
            MeshKey::Pier => Some("pier"),
            MeshKey::Terrain | MeshKey::Water | MeshKey::Sphere | MeshKey::Cube => None,
        }
    }
}

/// Name of a texture in the asset library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureKey(pub &'static str);

impl TextureKey {
    pub const GRASS: Self = Self("grass");
    pub const HEIGHT: Self = Self("height");
    pub const WATER: Self = Self("water");
    pub const WATER_HEIGHT: Self = Self("water_height");
    pub const SKY: Self = Self("sky");
    pub const CORGI: Self = Self("corgi");
    pub const HOUSE: Self = Self("house");
    pub const CAMPFIRE: Self = Self("campfire");
    pub const METAL: Self = Self("metal");
    pub const WOOD: Self = Self("wood");
    /// Plain white, used for light markers and as the height map of flat objects.
    pub const WHITE: Self = Self("white");
}

/// Which vertex path an object needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shading {
    /// Instanced patches displaced by a scrolling height map.
    Water,
    /// Grid displaced by a static height map.
    Terrain,
    /// Mesh drawn as-is.
    Generic,
}

/// How an object looks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Renderable {
    pub mesh: MeshKey,
    pub material: MaterialKey,
    pub albedo: TextureKey,
    pub height_map: Option<TextureKey>,
    pub shading: Shading,
}

impl Renderable {
    pub fn generic(mesh: MeshKey, material: MaterialKey, albedo: TextureKey) -> Self {
        Self {
            mesh,
            material,
            albedo,
            height_map: None,
            shading: Shading::Generic,
        }
    }
}

/// A scene object resolved for drawing this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneDraw {
    pub world: Mat4,
    pub renderable: Renderable,
}

/// Water grid placement.
pub const WATER_ORIGIN: Vec3 = Vec3::new(-25.0, -2.0, -25.0);
pub const WATER_RESOLUTION: u32 = 50;
/// Terrain grid placement; its height is set by the terrain height.
pub const GROUND_RESOLUTION: u32 = 100;
pub const CUBE_COUNT: usize = 3;
pub const SPHERE_COUNT: usize = 3;

/// The arena of drawable objects.
pub struct SceneObjects {
    world: hecs::World,
}

impl SceneObjects {
    pub fn empty() -> Self {
        Self {
            world: hecs::World::new(),
        }
    }

    /// The lakeside scene: terrain, lake, campfire with an orbiting corgi, house, lamp,
    /// pier and a few primitives.
    pub fn lakeside(terrain_height: f32) -> Self {
        let mut scene = Self::empty();

        scene.spawn(
            Transform::at(WATER_ORIGIN),
            Renderable {
                mesh: MeshKey::Water,
                material: MaterialKey::Water,
                albedo: TextureKey::WATER,
                height_map: Some(TextureKey::WATER_HEIGHT),
                shading: Shading::Water,
            },
        );
        scene.spawn(
            Transform::at(Vec3::new(-50.0, -terrain_height * 0.5, -50.0)),
            Renderable {
                mesh: MeshKey::Terrain,
                material: MaterialKey::Ground,
                albedo: TextureKey::GRASS,
                height_map: Some(TextureKey::HEIGHT),
                shading: Shading::Terrain,
            },
        );

        scene.spawn_orbiting(
            Transform::at(Vec3::new(3.0, 0.0, 3.0)).yaw_degrees(45.0),
            Renderable::generic(MeshKey::Corgi, MaterialKey::Dog, TextureKey::CORGI),
            Orbit {
                pivot: CAMPFIRE_POSITION,
                rate: 1.0,
            },
        );
        scene.spawn(
            Transform::at(Vec3::new(0.0, 0.0, 25.0))
                .uniform_scale(0.3)
                .yaw_degrees(90.0),
            Renderable::generic(MeshKey::House, MaterialKey::Wood, TextureKey::HOUSE),
        );
        scene.spawn(
            Transform::at(CAMPFIRE_POSITION).uniform_scale(0.4),
            Renderable::generic(MeshKey::Campfire, MaterialKey::Wood, TextureKey::CAMPFIRE),
        );
        scene.spawn(
            Transform::at(LAMP_POSITION).yaw_degrees(90.0),
            Renderable::generic(MeshKey::Lamp, MaterialKey::Metal, TextureKey::METAL),
        );
        scene.spawn(
            Transform::at(Vec3::new(0.0, -1.0, 10.0))
                .uniform_scale(0.2)
                .yaw_degrees(-60.0),
            Renderable::generic(MeshKey::Pier, MaterialKey::Wood, TextureKey::WOOD),
        );

        for i in 0..CUBE_COUNT {
            scene.spawn(
                Transform::at(Vec3::new(27.0, 1.0, 2.0 - 2.0 * i as f32)).uniform_scale(0.5),
                Renderable::generic(MeshKey::Cube, MaterialKey::Metal, TextureKey::METAL),
            );
        }
        for i in 0..SPHERE_COUNT {
            scene.spawn(
                Transform::at(Vec3::new(25.0, 1.0, 2.0 - 2.0 * i as f32)).uniform_scale(0.5),
                Renderable::generic(MeshKey::Sphere, MaterialKey::Metal, TextureKey::METAL),
            );
        }

        scene
    }

    pub fn spawn(&mut self, transform: Transform, renderable: Renderable) -> hecs::Entity {
        self.world.spawn((transform, renderable))
    }

    pub fn spawn_orbiting(
        &mut self,
        transform: Transform,
        renderable: Renderable,
        orbit: Orbit,
    ) -> hecs::Entity {
        self.world.spawn((transform, renderable, orbit))
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    /// Moves the terrain so its height range stays centred on y = 0.
    pub fn set_terrain_height(&mut self, terrain_height: f32) {
        let query = self.world.query_mut::<(&mut Transform, &Renderable)>();
        for (_, (transform, renderable)) in query {
            if renderable.shading == Shading::Terrain {
                transform.position.y = -terrain_height * 0.5;
            }
        }
    }

    /// Every object with its world matrix at `elapsed` seconds, water first, then terrain,
    /// then everything else in spawn order.
    pub fn draws(&self, elapsed: f32) -> Vec<SceneDraw> {
        let mut draws: Vec<(u32, SceneDraw)> = self
            .world
            .query::<(&Transform, &Renderable, Option<&Orbit>)>()
            .iter()
            .map(|(entity, (transform, renderable, orbit))| {
                let world = match orbit {
                    Some(orbit) => orbit.matrix(transform, elapsed),
                    None => transform.matrix(),
                };
                (
                    entity.id(),
                    SceneDraw {
                        world,
                        renderable: *renderable,
                    },
                )
            })
            .collect();

        draws.sort_by_key(|(id, draw)| (draw.renderable.shading, *id));
        draws.into_iter().map(|(_, draw)| draw).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lakeside_has_every_object() {
        let scene = SceneObjects::lakeside(30.0);
        assert_eq!(scene.len(), 2 + 5 + CUBE_COUNT + SPHERE_COUNT);
    }

    #[test]
    fn draws_put_water_then_terrain_first() {
        let draws = SceneObjects::lakeside(30.0).draws(0.0);
        assert_eq!(draws[0].renderable.shading, Shading::Water);
        assert_eq!(draws[1].renderable.shading, Shading::Terrain);
        assert!(draws[2..].iter().all(|d| d.renderable.shading == Shading::Generic));
    }

    #[test]
    fn generic_draws_keep_spawn_order() {
        let draws = SceneObjects::lakeside(30.0).draws(0.0);
        let meshes: Vec<MeshKey> = draws[2..7].iter().map(|d| d.renderable.mesh).collect();
        assert_eq!(
            meshes,
            vec![
                MeshKey::Corgi,
                MeshKey::House,
                MeshKey::Campfire,
                MeshKey::Lamp,
                MeshKey::Pier
            ]
        );
    }

    #[test]
    fn transform_applies_scale_then_yaw_then_translation() {
        let transform = Transform::at(Vec3::new(1.0, 2.0, 3.0))
            .uniform_scale(2.0)
            .yaw_degrees(90.0);
        let p = transform.matrix().transform_point3(Vec3::X);
        assert_relative_eq!(p, Vec3::new(1.0, 2.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn orbiting_object_circles_its_pivot() {
        let orbit = Orbit {
            pivot: Vec3::new(-35.0, 0.0, -5.0),
            rate: 1.0,
        };
        let local = Transform::at(Vec3::new(3.0, 0.0, 4.0));

        for elapsed in [0.0, 0.7, 2.0, 5.5] {
            let centre = orbit.matrix(&local, elapsed).transform_point3(Vec3::ZERO);
            assert_relative_eq!(centre.distance(orbit.pivot), 5.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn terrain_height_recentres_ground() {
        let mut scene = SceneObjects::lakeside(30.0);
        scene.set_terrain_height(10.0);

        let terrain = scene
            .draws(0.0)
            .into_iter()
            .find(|d| d.renderable.shading == Shading::Terrain)
            .unwrap();
        assert_relative_eq!(terrain.world.w_axis.y, -5.0);
    }
}
