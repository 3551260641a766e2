//! Off-screen textures the frame renders into.

use crate::binders::light::SHADOW_LAYERS;
use crate::gpu::GpuContext;

/// Format of every depth attachment, shadow layers included.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shadow maps for every light and face, as one layered depth texture.
///
/// Layer `light * 6 + face` belongs to face `face` of light slot `light`. Each layer has its
/// own attachment view for the depth passes; the lighting shader samples them all through
/// [`array_view`](Self::array_view).
pub struct ShadowAtlas {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    layer_views: Vec<wgpu::TextureView>,
    array_view: wgpu::TextureView,
    size: u32,
}

impl ShadowAtlas {
    pub fn new(gpu: &GpuContext, size: u32) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Atlas"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: SHADOW_LAYERS as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let layer_views = (0..SHADOW_LAYERS as u32)
            .map(|layer| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: Some("Shadow Layer"),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: layer,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        let array_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("Shadow Atlas Array"),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        log::info!("shadow atlas: {SHADOW_LAYERS} layers of {size}x{size}");

        Self {
            texture,
            layer_views,
            array_view,
            size,
        }
    }

    pub fn layer_view(&self, layer: u32) -> Option<&wgpu::TextureView> {
        self.layer_views.get(layer as usize)
    }

    pub fn array_view(&self) -> &wgpu::TextureView {
        &self.array_view
    }

    pub fn size(&self) -> u32 {
        self.size
    }
}

/// A screen-sized depth buffer.
///
/// The camera depth pre-pass writes one that the blur pass later samples; the lit pass uses
/// another purely for depth testing.
pub struct DepthTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl DepthTarget {
    pub fn new(gpu: &GpuContext, label: &str) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: gpu.width(),
            height: gpu.height(),
        }
    }

    /// Recreates the texture when the surface size changed. Returns whether it did.
    pub fn ensure_size(&mut self, gpu: &GpuContext, label: &str) -> bool {
        if self.width != gpu.width() || self.height != gpu.height() {
            *self = Self::new(gpu, label);
            return true;
        }
        false
    }
}

/// Off-screen colour target for the lit scene when motion blur will read it back.
///
/// Uses the surface format so every colour pipeline works with either this or the back buffer.
pub struct ColorTarget {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl ColorTarget {
    pub fn new(gpu: &GpuContext, label: &str) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: gpu.width(),
            height: gpu.height(),
        }
    }

    pub fn ensure_size(&mut self, gpu: &GpuContext, label: &str) -> bool {
        if self.width != gpu.width() || self.height != gpu.height() {
            *self = Self::new(gpu, label);
            return true;
        }
        false
    }
}
