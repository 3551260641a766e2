//! The demo's simulation state and the control surface over it.
//!
//! [`DemoState`] owns everything that changes from frame to frame on the CPU: scene objects,
//! lights and their shadow matrices, the fire, and the live tunables. Each frame it is
//! [`update`](DemoState::update)d with the frame time and then asked for a
//! [`plan`](DemoState::plan), which is all the GPU side ever sees of it.

use glam::Vec3;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::binders::FireBinder;
use crate::camera::Camera;
use crate::fire::{ANCHOR_OFFSET, FireParticle, FireSettings, FireSimulator};
use crate::lights::{FIRE_LIGHT, LIGHT_COUNT, LightRegistry, SpecularPowers};
use crate::render_graph::{FrameInputs, FramePlan, RenderOrchestrator};
use crate::scene::{SceneObjects, WATER_ORIGIN, WATER_RESOLUTION};
use crate::settings::RenderSettings;
use crate::shadow::{LightMatrixGenerator, LightMatrixSet};
use crate::tessellation::{TessellationTunables, WaterPatchPlan, default_tessellation};

/// Discrete edits bound to keys.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DemoAction {
    ToggleMotionBlur,
    ToggleParticleBlur,
    /// Adds to the blur strength; the result is clamped.
    AdjustBlurStrength(f32),
    /// Adds to the blur sample count; the result is clamped.
    AdjustBlurSamples(i32),
    ToggleFire,
    RestartFire,
    ToggleLightMarkers,
    ToggleLight(usize),
    ToggleOverlay,
    /// Moves the overlay to the next populated shadow layer.
    CycleOverlay,
    ToggleWireframe,
    ToggleNormals,
    /// Restores every light, tunable and setting to its default.
    ResetAll,
}

/// The lakeside scene and every live parameter that shapes its frames.
///
/// Fields are public so a control surface can edit them directly; edits show up in the next
/// [`plan`](Self::plan). `R` is the fire's random source.
///
/// # Example
/// ```
/// use lakefire::{Camera, DemoAction, DemoState, Phase, Vec3};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut demo = DemoState::with_rng(StdRng::seed_from_u64(3));
/// demo.apply(DemoAction::ToggleMotionBlur);
/// demo.update(1.0 / 60.0);
///
/// let camera = Camera::new().at(Vec3::new(0.0, 18.0, 60.0)).looking_at(Vec3::ZERO);
/// let (plan, _) = demo.plan(&camera, 16.0 / 9.0, false);
///
/// // Three lights are on by default: the sun, the campfire and the lamp.
/// assert_eq!(plan.shadow_pass_count(), 1 + 6 + 1);
/// assert_eq!(plan.passes_in(Phase::MotionBlur).count(), 0);
/// ```
pub struct DemoState<R = StdRng> {
    pub scene: SceneObjects,
    pub lights: LightRegistry,
    /// Shadow matrices, regenerated from `lights` on every update.
    pub light_matrices: LightMatrixSet,
    pub fire: FireSimulator<R>,
    /// Water patch tessellation; slot 0 drives the lake.
    pub tessellation: TessellationTunables,
    pub specular: SpecularPowers,
    pub settings: RenderSettings,
    orchestrator: RenderOrchestrator,
    elapsed: f32,
}

impl DemoState<StdRng> {
    /// Default scene with the fire seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for DemoState<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> DemoState<R> {
    /// State with the fire driven by `rng`.
    pub fn with_rng(rng: R) -> Self {
        let settings = RenderSettings::default();
        let lights = LightRegistry::default();
        let light_matrices = LightMatrixGenerator::generate(&lights, &settings.shadows);
        Self {
            scene: SceneObjects::lakeside(settings.terrain_height),
            lights,
            light_matrices,
            fire: FireSimulator::with_rng(FireSettings::default(), rng),
            tessellation: default_tessellation(),
            specular: SpecularPowers::default(),
            settings,
            orchestrator: RenderOrchestrator::new(),
            elapsed: 0.0,
        }
    }

    /// Seconds of simulated time so far.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Where the base of the flame sits: just under the fire light.
    pub fn fire_anchor(&self) -> Vec3 {
        self.lights.get(FIRE_LIGHT).position + ANCHOR_OFFSET
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// The fire keeps burning while it is hidden, so showing it again picks up a flame in
    /// motion rather than one frozen at the moment it was switched off.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.scene.set_terrain_height(self.settings.terrain_height);
        self.light_matrices
            .regenerate(&self.lights, &self.settings.shadows);

        let anchor = self.fire_anchor();
        self.fire.advance(dt, anchor);
    }

    /// Particles to draw this frame; empty while the fire is off.
    pub fn particles(&self) -> &[FireParticle] {
        if self.settings.fire_enabled {
            self.fire.particles()
        } else {
            &[]
        }
    }

    /// Plans the next frame as seen from `camera`, together with the water patches it draws.
    pub fn plan(
        &mut self,
        camera: &Camera,
        aspect: f32,
        wireframe_supported: bool,
    ) -> (FramePlan, WaterPatchPlan) {
        let water = WaterPatchPlan::build(
            self.tessellation.get(0),
            WATER_RESOLUTION,
            WATER_ORIGIN,
            camera.position,
        );
        let scene = self.scene.draws(self.elapsed);
        let inputs = FrameInputs {
            camera: camera.matrices(aspect),
            time: self.elapsed,
            scene: &scene,
            lights: &self.lights,
            light_matrices: &self.light_matrices,
            specular: &self.specular,
            settings: &self.settings,
            particle_count: self.particles().len() as u32,
            particles: FireBinder::uniforms(&self.fire, self.settings.render_normals),
            wireframe_supported,
        };
        let plan = self.orchestrator.plan_frame(&inputs);
        (plan, water)
    }

    /// Applies one control edit. Unknown light slots are logged and ignored.
    pub fn apply(&mut self, action: DemoAction) {
        log::debug!("{action:?}");
        let settings = &mut self.settings;
        match action {
            DemoAction::ToggleMotionBlur => {
                settings.motion_blur.enabled = !settings.motion_blur.enabled;
            }
            DemoAction::ToggleParticleBlur => {
                settings.motion_blur.include_particles = !settings.motion_blur.include_particles;
            }
            DemoAction::AdjustBlurStrength(delta) => {
                let strength = settings.motion_blur.strength + delta;
                settings.motion_blur.set_strength(strength);
            }
            DemoAction::AdjustBlurSamples(delta) => {
                let samples = settings.motion_blur.samples.saturating_add_signed(delta);
                settings.motion_blur.set_samples(samples);
            }
            DemoAction::ToggleFire => settings.fire_enabled = !settings.fire_enabled,
            DemoAction::RestartFire => self.fire.restart(),
            DemoAction::ToggleLightMarkers => {
                settings.show_light_markers = !settings.show_light_markers;
            }
            DemoAction::ToggleLight(slot) if slot < LIGHT_COUNT => {
                let enabled = self.lights.get(slot).enabled;
                self.lights.set_enabled(slot, !enabled);
            }
            DemoAction::ToggleLight(slot) => log::warn!("no light in slot {slot}"),
            DemoAction::ToggleOverlay => settings.overlay.enabled = !settings.overlay.enabled,
            DemoAction::CycleOverlay => {
                settings.overlay.enabled = true;
                settings.overlay.cycle(&self.lights);
                log::info!(
                    "shadow overlay: light {} face {}",
                    settings.overlay.light,
                    settings.overlay.face
                );
            }
            DemoAction::ToggleWireframe => settings.wireframe = !settings.wireframe,
            DemoAction::ToggleNormals => settings.render_normals = !settings.render_normals,
            DemoAction::ResetAll => self.reset_all(),
        }
    }

    fn reset_all(&mut self) {
        self.lights.reset_all();
        self.specular.reset_all();
        self.tessellation.reset_all();
        self.settings = RenderSettings::default();
        self.fire.configure(FireSettings::default());
        self.fire.restart();
        self.light_matrices = LightMatrixGenerator::generate(&self.lights, &self.settings.shadows);
    }
}
