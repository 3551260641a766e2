use super::object::SurfaceParams;
use crate::settings::WaveSettings;

/// Surface parameters for the water.
///
/// The water is drawn as instanced patches (see [`crate::tessellation`]), so the per-draw
/// grid resolution is what maps a patch-local position back onto the height map.
pub struct WaterBinder;

impl WaterBinder {
    pub fn surface(waves: &WaveSettings, resolution: u32, specular_power: f32) -> SurfaceParams {
        SurfaceParams {
            specular_power,
            amplitude: waves.amplitude,
            resolution: resolution.max(1) as f32,
            wave_frequency: waves.frequency,
            wave_speed: waves.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waves_drive_displacement() {
        let params = WaterBinder::surface(&WaveSettings::default(), 50, 5.0);
        assert_eq!(params.amplitude, 0.4);
        assert_eq!(params.wave_speed, 0.4);
        assert_eq!(params.resolution, 50.0);
    }

    #[test]
    fn zero_resolution_never_divides_by_zero() {
        assert_eq!(WaterBinder::surface(&WaveSettings::default(), 0, 5.0).resolution, 1.0);
    }
}
