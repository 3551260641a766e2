//! Multi-pass frame rendering.
//!
//! A frame is planned on the CPU and then recorded, so the pass sequence can be reasoned
//! about (and tested) without a device:
//!
//! ```text
//! RenderOrchestrator::plan_frame ──▶ FramePlan ──▶ FrameExecutor::execute ──▶ screen
//!        (simulation state)        (plain data)     (wgpu commands)
//! ```
//!
//! # Pass sequence
//!
//! ```text
//! Depth       shadow layer per light face ... camera depth (blur only)
//! Scene       sky, water, terrain, models, fire, markers ──▶ back buffer or scene colour
//! MotionBlur  scene colour + camera depth ──▶ back buffer   (blur only)
//! Overlay     one shadow layer in the top-right corner      (overlay only)
//! ```
//!
//! The last pass of every plan writes the back buffer.
//!
//! # Example
//!
//! ```ignore
//! let mut orchestrator = RenderOrchestrator::new();
//! let mut executor = FrameExecutor::new(&gpu, 1024);
//!
//! // In render loop:
//! let plan = orchestrator.plan_frame(&inputs);
//! executor.execute(&gpu, &plan, geometry, &assets)?;
//! ```

mod executor;
mod orchestrator;
mod pipelines;
mod plan;
mod targets;

pub use executor::{FrameExecutor, FrameGeometry};
pub use orchestrator::{FrameInputs, RenderOrchestrator};
pub use pipelines::{BindLayouts, PipelineSet, ShadedPipelines};
pub use plan::{
    DrawCommand, FramePlan, OFFSCREEN_CLEAR, ObjectDraw, PassPlan, PassTarget, Phase, SKY_CLEAR,
};
pub use targets::{ColorTarget, DEPTH_FORMAT, DepthTarget, ShadowAtlas};
