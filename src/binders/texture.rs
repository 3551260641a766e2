use glam::{Mat4, Vec3, Vec4};

use super::object::ObjectUniforms;

/// Uniforms for the unlit textured paths: the sky dome and the light markers.
pub struct TextureBinder;

impl TextureBinder {
    /// Radius of the sky sphere; inside the camera's far plane.
    pub const SKY_RADIUS: f32 = 150.0;
    pub const MARKER_SCALE: f32 = 0.2;

    /// Sky sphere centred on the eye so it never parallaxes.
    pub fn sky(eye: Vec3) -> ObjectUniforms {
        ObjectUniforms::new(
            Mat4::from_translation(eye) * Mat4::from_scale(Vec3::splat(Self::SKY_RADIUS)),
        )
    }

    /// Small sphere at a light's position, tinted with its diffuse colour.
    pub fn marker(position: Vec3, diffuse: Vec4) -> ObjectUniforms {
        ObjectUniforms::new(
            Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(Self::MARKER_SCALE)),
        )
        .with_tint(diffuse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_follows_the_eye() {
        let eye = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(TextureBinder::sky(eye).model().w_axis.truncate(), eye);
    }

    #[test]
    fn markers_carry_light_colour() {
        let marker = TextureBinder::marker(Vec3::ONE, Vec4::new(1.0, 0.3, 0.0, 1.0));
        assert_eq!(marker.tint, [1.0, 0.3, 0.0, 1.0]);
        assert_eq!(marker.model().x_axis.x, 0.2);
    }
}
