use super::object::SurfaceParams;

/// Surface parameters for the height-mapped ground.
pub struct TerrainBinder;

impl TerrainBinder {
    /// The ground grid samples its height map with its own 0..1 UVs, displacing by up to
    /// `terrain_height`.
    pub fn surface(terrain_height: f32, resolution: u32, specular_power: f32) -> SurfaceParams {
        SurfaceParams {
            specular_power,
            amplitude: terrain_height.max(0.0),
            resolution: resolution.max(1) as f32,
            ..SurfaceParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terrain_does_not_scroll() {
        let params = TerrainBinder::surface(30.0, 100, 100.0);
        assert_eq!(params.amplitude, 30.0);
        assert_eq!(params.wave_speed, 0.0);
    }
}
