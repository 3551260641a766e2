//! # lakefire
//!
//! **A lakeside at dusk: four shadow-casting lights, a particle campfire and camera motion blur.**
//!
//! The interesting part is how a frame is put together. The same scene is drawn many times per
//! frame (once per shadow-casting light face, once for camera depth, once lit), each time with
//! different matrices, pipelines and targets, while GPU uniforms stay in step with the CPU-side
//! simulation.
//!
//! ## Frame flow
//!
//! ```text
//! DemoState::update     fire particles, light matrices, terrain placement
//! DemoState::plan       tessellation levels + RenderOrchestrator::plan_frame ──▶ FramePlan
//! FrameExecutor         uniform arena upload, pass recording, present
//! ```
//!
//! Planning is pure data, so everything above the executor is testable without a GPU:
//!
//! ```no_run
//! use lakefire::{Camera, DemoState, Phase};
//!
//! let mut demo = DemoState::new();
//! demo.update(1.0 / 60.0);
//!
//! let camera = Camera::new().looking_at(lakefire::Vec3::ZERO);
//! let (plan, water) = demo.plan(&camera, 16.0 / 9.0, false);
//! assert_eq!(plan.passes_in(Phase::MotionBlur).count(), 1);
//! assert!(water.patch_count() > 0);
//! ```
//!
//! ## Controls
//!
//! See [`KEY_BINDINGS`]: `B` blur, `F` fire, `M` light markers, `Tab` cycles the shadow
//! overlay, `L` wireframe, `N` normals, `R` relights the fire, `Backspace` resets everything.

mod app;
mod assets;
pub mod binders;
mod camera;
mod config;
mod demo;
mod error;
mod fire;
mod frame_history;
mod gpu;
mod input;
mod lights;
mod mesh;
mod orbit_camera;
pub mod render_graph;
pub mod scene;
mod settings;
mod shadow;
mod tessellation;
mod texture;
mod tunables;

pub use app::run;
pub use assets::AssetLibrary;
pub use camera::Camera;
pub use config::{AppConfig, CameraRigConfig};
pub use demo::{DemoAction, DemoState};
pub use error::{AssetError, ConfigError, RenderError, StartupError};
pub use fire::{FireParticle, FireSettings, FireSimulator};
pub use frame_history::{CameraMatrices, FrameHistory};
pub use gpu::GpuContext;
pub use input::{Command, Input, KEY_BINDINGS};
pub use lights::{LightDescriptor, LightKind, LightRegistry, MaterialKey, SpecularPowers};
pub use mesh::{Mesh, MeshData, Vertex3d};
pub use orbit_camera::{OrbitCamera, OrbitMode};
pub use render_graph::{FrameExecutor, FramePlan, Phase, RenderOrchestrator};
pub use settings::{MotionBlurSettings, RenderSettings, ShadowOverlay, WaveSettings};
pub use shadow::{LightMatrices, LightMatrixGenerator, LightMatrixSet, ShadowSettings};
pub use tessellation::{TessellationMode, TessellationProperties, WaterPatchPlan};
pub use tunables::Tunables;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
