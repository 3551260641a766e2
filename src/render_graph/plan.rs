//! The frame plan: a device-free description of one frame's passes.
//!
//! [`RenderOrchestrator`](super::RenderOrchestrator) produces a [`FramePlan`] from simulation
//! state; [`FrameExecutor`](super::FrameExecutor) turns it into wgpu commands. Keeping the plan
//! as plain data lets the pass sequence be tested without a GPU.

use crate::binders::{
    BlurUniforms, LightBlock, ObjectUniforms, OverlayUniforms, ParticleUniforms, PassUniforms,
    ShadowMatrices,
};
use crate::scene::{MeshKey, Shading, TextureKey};

/// Background of the lit scene when drawn straight to the screen.
pub const SKY_CLEAR: wgpu::Color = wgpu::Color {
    r: 0.39,
    g: 0.58,
    b: 0.92,
    a: 1.0,
};

/// Background of the off-screen scene colour target.
pub const OFFSCREEN_CLEAR: wgpu::Color = wgpu::Color::BLACK;

/// Stages of a frame, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Depth,
    Scene,
    MotionBlur,
    Overlay,
}

/// What a pass renders into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassTarget {
    /// One layer of the shadow atlas.
    ShadowMap { light: usize, face: usize },
    /// The camera depth buffer sampled by motion blur.
    CameraDepth,
    /// Off-screen colour read back by motion blur.
    SceneColor,
    /// The swapchain image.
    BackBuffer,
}

/// One object ready to draw: resource keys plus its uniform values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectDraw {
    pub mesh: MeshKey,
    pub shading: Shading,
    pub albedo: TextureKey,
    pub height_map: TextureKey,
    pub uniforms: ObjectUniforms,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Depth-only draw of an opaque object.
    Depth(ObjectDraw),
    /// Depth-only billboards for the fire, so blur sees the flame.
    DepthParticles { count: u32 },
    /// Unlit, camera-centred sky sphere.
    Sky(ObjectDraw),
    /// Fully lit and shadowed object.
    Lit(ObjectDraw),
    /// Alpha-blended fire billboards.
    Particles { count: u32 },
    /// Unlit sphere at a light's position.
    Marker(ObjectDraw),
    MotionBlur(BlurUniforms),
    ShadowOverlay(OverlayUniforms),
}

impl DrawCommand {
    /// The textured object this command draws, if any.
    pub fn object(&self) -> Option<&ObjectDraw> {
        match self {
            DrawCommand::Depth(draw)
            | DrawCommand::Sky(draw)
            | DrawCommand::Lit(draw)
            | DrawCommand::Marker(draw) => Some(draw),
            _ => None,
        }
    }

    /// Per-draw uniforms that go into the frame's uniform arena, if any.
    pub fn object_uniforms(&self) -> Option<&ObjectUniforms> {
        self.object().map(|draw| &draw.uniforms)
    }

    pub fn is_particles(&self) -> bool {
        matches!(
            self,
            DrawCommand::Particles { .. } | DrawCommand::DepthParticles { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PassPlan {
    pub phase: Phase,
    pub target: PassTarget,
    /// Colour to clear to; `None` keeps what is already in the target. Depth attachments are
    /// always cleared.
    pub clear: Option<wgpu::Color>,
    pub view: PassUniforms,
    pub commands: Vec<DrawCommand>,
}

impl PassPlan {
    pub fn label(&self) -> String {
        match self.target {
            PassTarget::ShadowMap { light, face } => format!("Shadow {light}/{face}"),
            PassTarget::CameraDepth => "Camera Depth".to_owned(),
            PassTarget::SceneColor => "Scene (offscreen)".to_owned(),
            PassTarget::BackBuffer => format!("{:?} (back buffer)", self.phase),
        }
    }
}

/// Everything the executor needs to record one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    pub passes: Vec<PassPlan>,
    pub lighting: LightBlock,
    pub shadow_matrices: ShadowMatrices,
    pub particles: ParticleUniforms,
    /// Lit objects use the line-polygon pipelines.
    pub wireframe: bool,
}

impl FramePlan {
    /// Passes of one phase, in recording order.
    pub fn passes_in(&self, phase: Phase) -> impl Iterator<Item = &PassPlan> {
        self.passes.iter().filter(move |pass| pass.phase == phase)
    }

    /// Passes rendering into a shadow atlas layer. Camera depth is not counted.
    pub fn shadow_pass_count(&self) -> usize {
        self.passes
            .iter()
            .filter(|pass| matches!(pass.target, PassTarget::ShadowMap { .. }))
            .count()
    }

    /// Target of the final pass; the back buffer for every plan the orchestrator builds.
    pub fn last_target(&self) -> Option<PassTarget> {
        self.passes.last().map(|pass| pass.target)
    }

    /// Total draw commands across all passes.
    pub fn command_count(&self) -> usize {
        self.passes.iter().map(|pass| pass.commands.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> ObjectDraw {
        ObjectDraw {
            mesh: MeshKey::Cube,
            shading: Shading::Generic,
            albedo: TextureKey::METAL,
            height_map: TextureKey::WHITE,
            uniforms: ObjectUniforms::default(),
        }
    }

    #[test]
    fn only_object_commands_carry_uniforms() {
        assert!(DrawCommand::Lit(cube()).object_uniforms().is_some());
        assert!(DrawCommand::Marker(cube()).object().is_some());
        assert!(DrawCommand::Particles { count: 4 }.object().is_none());
        assert!(
            DrawCommand::ShadowOverlay(OverlayUniforms::default())
                .object_uniforms()
                .is_none()
        );
    }

    #[test]
    fn labels_name_the_target() {
        let pass = PassPlan {
            phase: Phase::Depth,
            target: PassTarget::ShadowMap { light: 1, face: 4 },
            clear: None,
            view: PassUniforms::default(),
            commands: Vec::new(),
        };
        assert_eq!(pass.label(), "Shadow 1/4");

        let overlay = PassPlan {
            phase: Phase::Overlay,
            target: PassTarget::BackBuffer,
            ..pass
        };
        assert_eq!(overlay.label(), "Overlay (back buffer)");
    }
}
