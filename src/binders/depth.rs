use super::pass::PassUniforms;
use crate::lights::{LightRegistry, MAX_FACES};
use crate::settings::ShadowOverlay;
use crate::shadow::LightMatrixSet;

/// Which shadow layer the debug overlay samples.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniforms {
    pub layer: u32,
    pub _pad: [u32; 3],
}

/// Parameters of the depth-only passes and the shadow overlay.
pub struct DepthBinder;

impl DepthBinder {
    /// Side of the overlay viewport in pixels.
    pub const OVERLAY_SIZE: u32 = 256;

    /// Viewpoint of shadow layer `(light, face)`.
    pub fn shadow_pass(
        matrices: &LightMatrixSet,
        lights: &LightRegistry,
        light: usize,
        face: usize,
        time: f32,
    ) -> PassUniforms {
        PassUniforms::from_light(matrices.get(light, face), lights.get(light).position, time)
    }

    pub fn layer(light: usize, face: usize) -> u32 {
        (light * MAX_FACES + face) as u32
    }

    pub fn overlay(selection: &ShadowOverlay) -> OverlayUniforms {
        OverlayUniforms {
            layer: selection.layer(),
            _pad: [0; 3],
        }
    }

    /// Top-left corner of the overlay viewport, inset from the top-right of the screen.
    pub fn overlay_origin(width: u32) -> (u32, u32) {
        let margin = 16;
        (width.saturating_sub(Self::OVERLAY_SIZE + margin), margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shadow::{LightMatrixGenerator, ShadowSettings};

    #[test]
    fn overlay_layer_follows_selection() {
        let lights = LightRegistry::default();
        let mut selection = ShadowOverlay::default();
        selection.select(1, 5, &lights);

        assert_eq!(DepthBinder::overlay(&selection).layer, 11);
        assert_eq!(std::mem::size_of::<OverlayUniforms>(), 16);
    }

    #[test]
    fn shadow_pass_uses_face_matrices() {
        let lights = LightRegistry::default();
        let set = LightMatrixGenerator::generate(&lights, &ShadowSettings::default());
        let pass = DepthBinder::shadow_pass(&set, &lights, 1, 2, 0.0);

        assert_eq!(pass.view_projection(), set.get(1, 2).view_projection());
        assert_eq!(pass.camera_pos, lights.get(1).position.to_array());
    }

    #[test]
    fn overlay_stays_on_tiny_windows() {
        assert_eq!(DepthBinder::overlay_origin(100), (0, 16));
        assert_eq!(DepthBinder::overlay_origin(1280), (1008, 16));
    }
}
