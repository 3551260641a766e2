//! Render toggles and effect parameters exposed to the control surface.
//!
//! Setters clamp to the ranges the control surface allows, so nothing downstream
//! has to re-validate.

use crate::lights::{LIGHT_COUNT, LightKind, LightRegistry, MAX_FACES};
use crate::shadow::ShadowSettings;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionBlurSettings {
    pub enabled: bool,
    pub strength: f32,
    pub samples: u32,
    /// Rasterise fire particles into the camera depth so they smear with the scene.
    pub include_particles: bool,
}

impl Default for MotionBlurSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strength: 1.5,
            samples: 4,
            include_particles: true,
        }
    }
}

impl MotionBlurSettings {
    pub fn set_strength(&mut self, strength: f32) {
        self.strength = strength.clamp(1.0, 5.0);
    }

    pub fn set_samples(&mut self, samples: u32) {
        self.samples = samples.clamp(1, 10);
    }
}

/// Scrolling displacement of the water surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveSettings {
    pub amplitude: f32,
    pub frequency: f32,
    pub speed: f32,
}

impl Default for WaveSettings {
    fn default() -> Self {
        Self {
            amplitude: 0.4,
            frequency: 0.4,
            speed: 0.4,
        }
    }
}

/// Which shadow map layer the debug overlay shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShadowOverlay {
    pub enabled: bool,
    pub light: usize,
    pub face: usize,
}

impl ShadowOverlay {
    /// Selects a layer, clamping the light slot and forcing face 0 for single-face lights.
    pub fn select(&mut self, light: usize, face: usize, lights: &LightRegistry) {
        self.light = light.min(LIGHT_COUNT - 1);
        self.face = match lights.get(self.light).kind {
            LightKind::Point => face.min(MAX_FACES - 1),
            LightKind::Directional | LightKind::Spot => 0,
        };
    }

    /// Steps to the next populated layer: the next face of the current light, else the first
    /// face of the next enabled light. With every light off the selection stays put.
    pub fn cycle(&mut self, lights: &LightRegistry) {
        let current = lights.get(self.light);
        if current.enabled && self.face + 1 < current.matrix_slots() {
            self.select(self.light, self.face + 1, lights);
            return;
        }

        let next = (1..=LIGHT_COUNT)
            .map(|step| (self.light + step) % LIGHT_COUNT)
            .find(|&slot| lights.get(slot).enabled);
        if let Some(slot) = next {
            self.select(slot, 0, lights);
        }
    }

    pub fn layer(&self) -> u32 {
        (self.light * MAX_FACES + self.face) as u32
    }
}

/// Everything the frame plan depends on besides lights, fire and tessellation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    /// Only honoured when the adapter supports line rasterisation and blur is off.
    pub wireframe: bool,
    pub show_light_markers: bool,
    /// Output world normals instead of lighting.
    pub render_normals: bool,
    pub fire_enabled: bool,
    pub terrain_height: f32,
    pub shadows: ShadowSettings,
    pub overlay: ShadowOverlay,
    pub motion_blur: MotionBlurSettings,
    pub waves: WaveSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            wireframe: false,
            show_light_markers: false,
            render_normals: false,
            fire_enabled: true,
            terrain_height: 30.0,
            shadows: ShadowSettings::default(),
            overlay: ShadowOverlay::default(),
            motion_blur: MotionBlurSettings::default(),
            waves: WaveSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_face_is_zero_for_single_face_lights() {
        let lights = LightRegistry::default();
        let mut overlay = ShadowOverlay::default();

        overlay.select(0, 4, &lights);
        assert_eq!((overlay.light, overlay.face), (0, 0));

        overlay.select(1, 4, &lights);
        assert_eq!((overlay.light, overlay.face), (1, 4));
        assert_eq!(overlay.layer(), 10);
    }

    #[test]
    fn overlay_selection_is_clamped() {
        let lights = LightRegistry::default();
        let mut overlay = ShadowOverlay::default();
        overlay.select(9, 9, &lights);

        assert_eq!(overlay.light, LIGHT_COUNT - 1);
        assert!(overlay.face < MAX_FACES);
    }

    #[test]
    fn cycling_visits_every_point_face_then_moves_on() {
        let lights = LightRegistry::default();
        let mut overlay = ShadowOverlay::default();
        overlay.select(1, 0, &lights);

        let mut visited = Vec::new();
        for _ in 0..7 {
            visited.push((overlay.light, overlay.face));
            overlay.cycle(&lights);
        }
        assert_eq!(&visited[..6], &[(1, 0), (1, 1), (1, 2), (1, 3), (1, 4), (1, 5)]);
        assert_eq!(visited[6], (2, 0));
    }

    #[test]
    fn cycling_skips_disabled_lights() {
        let lights = LightRegistry::default();
        assert!(!lights.get(3).enabled);
        let mut overlay = ShadowOverlay::default();
        overlay.select(2, 0, &lights);

        for _ in 0..12 {
            overlay.cycle(&lights);
            assert!(
                lights.get(overlay.light).enabled,
                "landed on disabled light {}",
                overlay.light
            );
        }
    }

    #[test]
    fn cycling_wraps_from_the_spot_light_to_the_sun() {
        let lights = LightRegistry::default();
        let mut overlay = ShadowOverlay::default();
        overlay.select(2, 0, &lights);

        overlay.cycle(&lights);
        assert_eq!((overlay.light, overlay.face), (0, 0));
    }

    #[test]
    fn cycling_with_every_light_off_keeps_selection() {
        let mut lights = LightRegistry::default();
        for slot in 0..LIGHT_COUNT {
            lights.set_enabled(slot, false);
        }
        let mut overlay = ShadowOverlay::default();
        overlay.select(1, 3, &lights);

        overlay.cycle(&lights);
        assert_eq!((overlay.light, overlay.face), (1, 3));
    }

    #[test]
    fn light_markers_start_hidden() {
        assert!(!RenderSettings::default().show_light_markers);
    }

    #[test]
    fn blur_parameters_are_clamped() {
        let mut blur = MotionBlurSettings::default();
        blur.set_samples(0);
        blur.set_strength(9.0);
        assert_eq!(blur.samples, 1);
        assert_eq!(blur.strength, 5.0);
    }
}
