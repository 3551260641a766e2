//! Sampled 2D textures and the procedural images used when an asset file is missing.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::AssetError;
use crate::gpu::GpuContext;

/// How texel values are interpreted when sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    /// Colour images; decoded from sRGB on sample.
    Srgb,
    /// Data images such as height maps; sampled as stored.
    Linear,
}

impl ColorSpace {
    fn format(self) -> wgpu::TextureFormat {
        match self {
            ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Tightly packed RGBA8 pixels in system memory.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    /// A 1×1 image of one colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    /// Builds a square image from a per-texel function of normalised coordinates.
    pub fn generate(size: u32, mut texel: impl FnMut(u32, u32, f32, f32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        let scale = 1.0 / size.max(1) as f32;
        for y in 0..size {
            for x in 0..size {
                let u = (x as f32 + 0.5) * scale;
                let v = (y as f32 + 0.5) * scale;
                rgba.extend_from_slice(&texel(x, y, u, v));
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    /// Speckled variation around a base colour. The same `seed` always yields the same image.
    pub fn noise(size: u32, base: [u8; 3], spread: u8, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let spread = spread as i32;
        Self::generate(size, |_, _, _, _| {
            let offset = rng.gen_range(-spread..=spread);
            let channel = |c: u8| (c as i32 + offset).clamp(0, 255) as u8;
            [channel(base[0]), channel(base[1]), channel(base[2]), 255]
        })
    }

    /// Height map that is high at the rim and sinks into a basin in the middle.
    pub fn basin(size: u32) -> Self {
        let mut rng = StdRng::seed_from_u64(17);
        Self::generate(size, |_, _, u, v| {
            let d = ((u - 0.5).powi(2) + (v - 0.5).powi(2)).sqrt() * 2.0;
            let shape = smoothstep(0.2, 0.9, d);
            let grain = rng.gen_range(0..9) as f32 / 255.0;
            let h = ((0.25 + 0.6 * shape + grain) * 255.0).clamp(0.0, 255.0) as u8;
            [h, h, h, 255]
        })
    }

    /// Tileable sine ripples for the water surface.
    pub fn ripples(size: u32) -> Self {
        use std::f32::consts::TAU;
        Self::generate(size, |_, _, u, v| {
            let wave = (TAU * 3.0 * u).sin() * 0.5 + (TAU * 2.0 * (u + v)).sin() * 0.3;
            let h = ((wave * 0.5 + 0.5) * 255.0).clamp(0.0, 255.0) as u8;
            [h, h, h, 255]
        })
    }

    /// Fetches the red channel at texel `(x, y)` as `0..=1`.
    pub fn red(&self, x: u32, y: u32) -> f32 {
        self.rgba[((y * self.width + x) * 4) as usize] as f32 / 255.0
    }
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// A GPU texture ready to be bound for sampling.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_data(gpu: &GpuContext, data: &TextureData, space: ColorSpace, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: data.width,
                    height: data.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: space.format(),
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            width: data.width,
            height: data.height,
        }
    }
}
