//! Sequencing of a frame's passes.
//!
//! [`RenderOrchestrator::plan_frame`] turns one [`FrameInputs`] snapshot into a [`FramePlan`].
//! Nothing here touches the GPU; the executor replays the plan afterwards.
//!
//! # Example
//! ```
//! use lakefire::binders::ParticleUniforms;
//! use lakefire::render_graph::{FrameInputs, PassTarget, Phase, RenderOrchestrator};
//! use lakefire::scene::SceneObjects;
//! use lakefire::{
//!     Camera, LightMatrixGenerator, LightRegistry, RenderSettings, SpecularPowers, Vec3,
//! };
//!
//! let scene = SceneObjects::lakeside(30.0).draws(0.0);
//! let lights = LightRegistry::default();
//! let settings = RenderSettings::default();
//! let light_matrices = LightMatrixGenerator::generate(&lights, &settings.shadows);
//! let specular = SpecularPowers::default();
//! let camera = Camera::new().at(Vec3::new(0.0, 18.0, 60.0)).looking_at(Vec3::ZERO);
//!
//! let inputs = FrameInputs {
//!     camera: camera.matrices(16.0 / 9.0),
//!     time: 0.0,
//!     scene: &scene,
//!     lights: &lights,
//!     light_matrices: &light_matrices,
//!     specular: &specular,
//!     settings: &settings,
//!     particle_count: 0,
//!     particles: ParticleUniforms::default(),
//!     wireframe_supported: false,
//! };
//!
//! let mut orchestrator = RenderOrchestrator::new();
//! let plan = orchestrator.plan_frame(&inputs);
//!
//! assert_eq!(plan.passes[0].phase, Phase::Depth);
//! assert_eq!(plan.passes_in(Phase::MotionBlur).count(), 1);
//! assert_eq!(plan.last_target(), Some(PassTarget::BackBuffer));
//! ```

use super::plan::{
    DrawCommand, FramePlan, OFFSCREEN_CLEAR, ObjectDraw, PassPlan, PassTarget, Phase, SKY_CLEAR,
};
use crate::binders::{
    DepthBinder, LightBinder, MotionBlurBinder, ObjectUniforms, ParticleUniforms, PassUniforms,
    SurfaceParams, TerrainBinder, TextureBinder, WaterBinder,
};
use crate::frame_history::{CameraMatrices, FrameHistory};
use crate::lights::{LightKind, LightRegistry, SpecularPowers};
use crate::scene::{GROUND_RESOLUTION, MeshKey, SceneDraw, Shading, TextureKey, WATER_RESOLUTION};
use crate::settings::RenderSettings;
use crate::shadow::LightMatrixSet;

/// Snapshot of everything a frame is planned from.
pub struct FrameInputs<'a> {
    pub camera: CameraMatrices,
    pub time: f32,
    pub scene: &'a [SceneDraw],
    pub lights: &'a LightRegistry,
    pub light_matrices: &'a LightMatrixSet,
    pub specular: &'a SpecularPowers,
    pub settings: &'a RenderSettings,
    /// Live particle count; zero when the fire is off.
    pub particle_count: u32,
    pub particles: ParticleUniforms,
    /// Whether the device can rasterise lines.
    pub wireframe_supported: bool,
}

/// Builds each frame's [`FramePlan`].
///
/// Phases always run in the order depth, scene, motion blur, overlay:
///
/// 1. One depth pass per enabled light and matrix slot, into that slot's shadow layer. The
///    fire never casts shadows. When motion blur is on, a camera depth pass follows, with the
///    fire included if particle blur is enabled.
/// 2. The lit scene: sky, water, terrain, models and primitives, then the fire and the light
///    markers. It renders off-screen when blur will read it back and to the screen otherwise.
/// 3. Motion blur composites the off-screen scene onto the screen using last frame's camera.
/// 4. The shadow overlay draws one shadow layer into a corner of the screen.
///
/// The orchestrator owns the [`FrameHistory`]: each plan consumes the previous camera and then
/// commits the current one, so blur in frame K always sees frame K-1.
#[derive(Debug, Default)]
pub struct RenderOrchestrator {
    history: FrameHistory,
}

impl RenderOrchestrator {
    /// Orchestrator with no camera history; the first blurred frame has no motion.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plans one frame and records its camera for the next.
    ///
    /// Call exactly once per presented frame: every call advances the camera history, whether
    /// or not blur is enabled.
    pub fn plan_frame(&mut self, inputs: &FrameInputs<'_>) -> FramePlan {
        let settings = inputs.settings;
        let blur = settings.motion_blur.enabled;
        let objects: Vec<ObjectDraw> = inputs
            .scene
            .iter()
            .map(|draw| object_draw(draw, inputs))
            .collect();

        let mut passes = Vec::new();
        self.plan_depth_phase(inputs, &objects, &mut passes);
        passes.push(self.plan_scene_phase(inputs, &objects));

        let previous = self.history.consume_previous();
        if blur {
            let uniforms =
                MotionBlurBinder::uniforms(&inputs.camera, previous.as_ref(), &settings.motion_blur);
            passes.push(PassPlan {
                phase: Phase::MotionBlur,
                target: PassTarget::BackBuffer,
                clear: Some(OFFSCREEN_CLEAR),
                view: PassUniforms::from_camera(&inputs.camera, inputs.time),
                commands: vec![DrawCommand::MotionBlur(uniforms)],
            });
        }
        self.history.commit_current(inputs.camera);

        if settings.overlay.enabled {
            passes.push(PassPlan {
                phase: Phase::Overlay,
                target: PassTarget::BackBuffer,
                clear: None,
                view: PassUniforms::from_camera(&inputs.camera, inputs.time),
                commands: vec![DrawCommand::ShadowOverlay(DepthBinder::overlay(
                    &settings.overlay,
                ))],
            });
        }

        let plan = FramePlan {
            passes,
            lighting: LightBinder::light_block(
                inputs.lights,
                settings.shadows.bias,
                settings.render_normals,
            ),
            shadow_matrices: LightBinder::shadow_matrices(inputs.light_matrices),
            particles: inputs.particles,
            wireframe: settings.wireframe && !blur && inputs.wireframe_supported,
        };
        log::debug!(
            "planned {} passes ({} shadow), {} draws",
            plan.passes.len(),
            plan.shadow_pass_count(),
            plan.command_count()
        );
        plan
    }

    fn plan_depth_phase(
        &self,
        inputs: &FrameInputs<'_>,
        objects: &[ObjectDraw],
        passes: &mut Vec<PassPlan>,
    ) {
        let depth_commands = || objects.iter().map(|draw| DrawCommand::Depth(*draw));

        for (light, descriptor) in inputs.lights.enabled() {
            for face in 0..descriptor.matrix_slots() {
                passes.push(PassPlan {
                    phase: Phase::Depth,
                    target: PassTarget::ShadowMap { light, face },
                    clear: None,
                    view: DepthBinder::shadow_pass(
                        inputs.light_matrices,
                        inputs.lights,
                        light,
                        face,
                        inputs.time,
                    ),
                    commands: depth_commands().collect(),
                });
            }
        }

        let blur = &inputs.settings.motion_blur;
        if blur.enabled {
            let mut commands: Vec<DrawCommand> = depth_commands().collect();
            if blur.include_particles && inputs.particle_count > 0 {
                commands.push(DrawCommand::DepthParticles {
                    count: inputs.particle_count,
                });
            }
            passes.push(PassPlan {
                phase: Phase::Depth,
                target: PassTarget::CameraDepth,
                clear: None,
                view: PassUniforms::from_camera(&inputs.camera, inputs.time),
                commands,
            });
        }
    }

    fn plan_scene_phase(&self, inputs: &FrameInputs<'_>, objects: &[ObjectDraw]) -> PassPlan {
        let settings = inputs.settings;
        let (target, clear) = if settings.motion_blur.enabled {
            (PassTarget::SceneColor, OFFSCREEN_CLEAR)
        } else {
            (PassTarget::BackBuffer, SKY_CLEAR)
        };

        let mut commands = vec![DrawCommand::Sky(unlit_draw(
            TextureKey::SKY,
            TextureBinder::sky(inputs.camera.position),
        ))];
        commands.extend(objects.iter().map(|draw| DrawCommand::Lit(*draw)));

        if inputs.particle_count > 0 {
            commands.push(DrawCommand::Particles {
                count: inputs.particle_count,
            });
        }

        if settings.show_light_markers {
            commands.extend(
                inputs
                    .lights
                    .enabled()
                    .filter(|(_, light)| light.kind != LightKind::Directional)
                    .map(|(_, light)| {
                        DrawCommand::Marker(unlit_draw(
                            TextureKey::WHITE,
                            TextureBinder::marker(light.position, light.diffuse),
                        ))
                    }),
            );
        }

        PassPlan {
            phase: Phase::Scene,
            target,
            clear: Some(clear),
            view: PassUniforms::from_camera(&inputs.camera, inputs.time),
            commands,
        }
    }
}

fn unlit_draw(albedo: TextureKey, uniforms: ObjectUniforms) -> ObjectDraw {
    ObjectDraw {
        mesh: MeshKey::Sphere,
        shading: Shading::Generic,
        albedo,
        height_map: TextureKey::WHITE,
        uniforms,
    }
}

fn object_draw(draw: &SceneDraw, inputs: &FrameInputs<'_>) -> ObjectDraw {
    let renderable = &draw.renderable;
    let specular = inputs.specular.get(renderable.material);
    let surface = match renderable.shading {
        Shading::Water => WaterBinder::surface(&inputs.settings.waves, WATER_RESOLUTION, specular),
        Shading::Terrain => {
            TerrainBinder::surface(inputs.settings.terrain_height, GROUND_RESOLUTION, specular)
        }
        Shading::Generic => SurfaceParams {
            specular_power: specular,
            ..SurfaceParams::default()
        },
    };

    ObjectDraw {
        mesh: renderable.mesh,
        shading: renderable.shading,
        albedo: renderable.albedo,
        height_map: renderable.height_map.unwrap_or(TextureKey::WHITE),
        uniforms: ObjectUniforms::new(draw.world).with_surface(surface),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObjects;
    use crate::shadow::{LightMatrixGenerator, ShadowSettings};
    use glam::{Mat4, Vec3};

    struct World {
        scene: Vec<SceneDraw>,
        lights: LightRegistry,
        matrices: LightMatrixSet,
        specular: SpecularPowers,
        settings: RenderSettings,
        particle_count: u32,
    }

    impl World {
        fn lakeside() -> Self {
            let lights = LightRegistry::default();
            let matrices = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());
            Self {
                scene: SceneObjects::lakeside(30.0).draws(0.0),
                lights,
                matrices,
                specular: SpecularPowers::default(),
                settings: RenderSettings::default(),
                particle_count: 1000,
            }
        }

        fn inputs(&self, camera: CameraMatrices) -> FrameInputs<'_> {
            FrameInputs {
                camera,
                time: 0.0,
                scene: &self.scene,
                lights: &self.lights,
                light_matrices: &self.matrices,
                specular: &self.specular,
                settings: &self.settings,
                particle_count: self.particle_count,
                particles: ParticleUniforms::default(),
                wireframe_supported: true,
            }
        }

        fn only_light(&mut self, kind: LightKind) {
            self.lights.disable_all();
            self.lights.edit(3, |light| {
                light.enabled = true;
                light.kind = kind;
            });
            self.matrices =
                LightMatrixGenerator::generate(&self.lights, &ShadowSettings::default());
        }
    }

    fn camera_at(x: f32) -> CameraMatrices {
        let position = Vec3::new(x, 18.0, 60.0);
        CameraMatrices {
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(0.8, 16.0 / 9.0, 0.1, 200.0),
            position,
        }
    }

    fn blur_uniforms(plan: &FramePlan) -> Option<crate::binders::BlurUniforms> {
        plan.passes_in(Phase::MotionBlur)
            .flat_map(|pass| pass.commands.iter())
            .find_map(|command| match command {
                DrawCommand::MotionBlur(uniforms) => Some(*uniforms),
                _ => None,
            })
    }

    #[test]
    fn default_scene_plans_every_phase_in_order() {
        let world = World::lakeside();
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        // sun 1 + campfire 6 + lamp 1
        assert_eq!(plan.shadow_pass_count(), 8);
        let phases: Vec<Phase> = plan.passes.iter().map(|pass| pass.phase).collect();
        assert!(phases.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(plan.passes_in(Phase::Scene).count(), 1);
        assert_eq!(plan.passes_in(Phase::MotionBlur).count(), 1);
        assert_eq!(plan.last_target(), Some(PassTarget::BackBuffer));
    }

    #[test]
    fn point_light_gets_six_shadow_passes() {
        let mut world = World::lakeside();
        world.only_light(LightKind::Point);
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        let faces: Vec<PassTarget> = plan
            .passes_in(Phase::Depth)
            .map(|pass| pass.target)
            .filter(|target| matches!(target, PassTarget::ShadowMap { .. }))
            .collect();
        let expected: Vec<PassTarget> = (0..6)
            .map(|face| PassTarget::ShadowMap { light: 3, face })
            .collect();
        assert_eq!(faces, expected);
    }

    #[test]
    fn shadow_passes_use_the_light_face_matrices() {
        let mut world = World::lakeside();
        world.only_light(LightKind::Point);
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        for pass in plan.passes_in(Phase::Depth) {
            if let PassTarget::ShadowMap { light, face } = pass.target {
                assert_eq!(
                    pass.view.view_projection(),
                    world.matrices.get(light, face).view_projection()
                );
            }
        }
    }

    #[test]
    fn particles_never_cast_shadows() {
        let world = World::lakeside();
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        for pass in &plan.passes {
            if matches!(pass.target, PassTarget::ShadowMap { .. }) {
                assert!(pass.commands.iter().all(|c| !c.is_particles()));
            }
        }
        let camera_depth = plan
            .passes
            .iter()
            .find(|pass| pass.target == PassTarget::CameraDepth)
            .unwrap();
        assert!(camera_depth.commands.iter().any(|c| c.is_particles()));
    }

    #[test]
    fn particle_blur_can_be_excluded() {
        let mut world = World::lakeside();
        world.settings.motion_blur.include_particles = false;
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        let camera_depth = plan
            .passes
            .iter()
            .find(|pass| pass.target == PassTarget::CameraDepth)
            .unwrap();
        assert!(camera_depth.commands.iter().all(|c| !c.is_particles()));
    }

    #[test]
    fn blur_in_frame_k_uses_frame_k_minus_one() {
        let world = World::lakeside();
        let mut orchestrator = RenderOrchestrator::new();
        let cameras = [camera_at(0.0), camera_at(3.0), camera_at(7.0)];

        let mut seen = Vec::new();
        for camera in cameras {
            let plan = orchestrator.plan_frame(&world.inputs(camera));
            let uniforms = blur_uniforms(&plan).unwrap();
            seen.push(MotionBlurBinder::previous_view_projection(&uniforms));
        }

        // First frame has no history and blurs against itself.
        assert_eq!(seen[0], cameras[0].view_projection());
        assert_eq!(seen[1], cameras[0].view_projection());
        assert_eq!(seen[2], cameras[1].view_projection());
    }

    #[test]
    fn history_advances_while_blur_is_off() {
        let mut world = World::lakeside();
        let mut orchestrator = RenderOrchestrator::new();

        world.settings.motion_blur.enabled = false;
        orchestrator.plan_frame(&world.inputs(camera_at(1.0)));
        world.settings.motion_blur.enabled = true;
        let plan = orchestrator.plan_frame(&world.inputs(camera_at(2.0)));

        let uniforms = blur_uniforms(&plan).unwrap();
        assert_eq!(
            MotionBlurBinder::previous_view_projection(&uniforms),
            camera_at(1.0).view_projection()
        );
    }

    #[test]
    fn everything_off_still_draws_static_geometry() {
        let mut world = World::lakeside();
        world.lights.disable_all();
        world.settings.motion_blur.enabled = false;
        world.settings.fire_enabled = false;
        world.particle_count = 0;
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        assert_eq!(plan.shadow_pass_count(), 0);
        assert_eq!(plan.lighting.enabled_count(), 0);
        assert_eq!(plan.passes.len(), 1);

        let scene = &plan.passes[0];
        assert_eq!(scene.target, PassTarget::BackBuffer);
        assert_eq!(scene.clear, Some(SKY_CLEAR));
        let lit = scene
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Lit(_)))
            .count();
        assert_eq!(lit, world.scene.len());
        assert!(scene.commands.iter().all(|c| !c.is_particles()));
    }

    #[test]
    fn blur_renders_scene_offscreen() {
        let world = World::lakeside();
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        let scene = plan.passes_in(Phase::Scene).next().unwrap();
        assert_eq!(scene.target, PassTarget::SceneColor);
        assert_eq!(scene.clear, Some(OFFSCREEN_CLEAR));
    }

    #[test]
    fn scene_draw_order_is_sky_objects_fire_markers() {
        let mut world = World::lakeside();
        world.settings.show_light_markers = true;
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));
        let commands = &plan.passes_in(Phase::Scene).next().unwrap().commands;

        assert!(matches!(commands[0], DrawCommand::Sky(_)));
        let DrawCommand::Lit(water) = commands[1] else {
            panic!("water should follow the sky");
        };
        assert_eq!(water.shading, Shading::Water);

        let fire = commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Particles { .. }))
            .unwrap();
        let markers: Vec<usize> = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, DrawCommand::Marker(_)))
            .map(|(i, _)| i)
            .collect();
        // campfire point light and lamp spot light
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|&i| i > fire));
    }

    #[test]
    fn markers_follow_light_toggle() {
        let mut world = World::lakeside();
        world.settings.show_light_markers = false;
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        assert!(
            plan.passes
                .iter()
                .flat_map(|pass| pass.commands.iter())
                .all(|c| !matches!(c, DrawCommand::Marker(_)))
        );
    }

    #[test]
    fn overlay_comes_last_and_keeps_the_image() {
        let mut world = World::lakeside();
        world.settings.overlay.select(1, 2, &world.lights);
        world.settings.overlay.enabled = true;
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));

        let last = plan.passes.last().unwrap();
        assert_eq!(last.phase, Phase::Overlay);
        assert_eq!(last.clear, None);
        assert_eq!(
            last.commands,
            vec![DrawCommand::ShadowOverlay(crate::binders::OverlayUniforms {
                layer: 8,
                _pad: [0; 3],
            })]
        );
    }

    #[test]
    fn wireframe_requires_blur_off_and_support() {
        let mut world = World::lakeside();
        world.settings.wireframe = true;
        let mut orchestrator = RenderOrchestrator::new();

        assert!(!orchestrator.plan_frame(&world.inputs(camera_at(0.0))).wireframe);

        world.settings.motion_blur.enabled = false;
        assert!(orchestrator.plan_frame(&world.inputs(camera_at(0.0))).wireframe);

        let mut inputs = world.inputs(camera_at(0.0));
        inputs.wireframe_supported = false;
        assert!(!orchestrator.plan_frame(&inputs).wireframe);
    }

    #[test]
    fn displaced_surfaces_carry_their_parameters() {
        let world = World::lakeside();
        let plan = RenderOrchestrator::new().plan_frame(&world.inputs(camera_at(0.0)));
        let scene = plan.passes_in(Phase::Scene).next().unwrap();

        let lit: Vec<&ObjectDraw> = scene
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Lit(draw) => Some(draw),
                _ => None,
            })
            .collect();
        assert_eq!(lit[0].height_map, TextureKey::WATER_HEIGHT);
        assert_eq!(lit[0].uniforms.surface, [5.0, 0.4, 50.0, 0.0]);
        assert_eq!(lit[1].uniforms.surface, [100.0, 30.0, 100.0, 0.0]);
        assert_eq!(lit[2].height_map, TextureKey::WHITE);
    }
}
