//! Bind group layouts and render pipelines for every draw the frame plan can contain.
//!
//! WGSL sources are assembled by concatenation: `common.wgsl` (the per-pass uniforms) is
//! prepended to each scene shader, and `fullscreen.wgsl` (a single-triangle vertex stage) to
//! the screen-space ones.

use crate::binders::{
    BlurUniforms, LightBlock, ObjectUniforms, OverlayUniforms, PARTICLE_INSTANCE_LAYOUT,
    ParticleUniforms, PassUniforms, ShadowMatrices,
};
use crate::gpu::GpuContext;
use crate::mesh::Vertex3d;
use crate::render_graph::targets::DEPTH_FORMAT;
use crate::scene::Shading;
use crate::tessellation::PatchInstance;

fn surface_source() -> String {
    [
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/surface.wgsl"),
    ]
    .concat()
}

fn fire_source() -> String {
    [
        include_str!("../shaders/common.wgsl"),
        include_str!("../shaders/fire.wgsl"),
    ]
    .concat()
}

fn blur_source() -> String {
    [
        include_str!("../shaders/fullscreen.wgsl"),
        include_str!("../shaders/motion_blur.wgsl"),
    ]
    .concat()
}

fn overlay_source() -> String {
    [
        include_str!("../shaders/fullscreen.wgsl"),
        include_str!("../shaders/overlay.wgsl"),
    ]
    .concat()
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    dynamic: bool,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}

fn texture_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    sample_type: wgpu::TextureSampleType,
    view_dimension: wgpu::TextureViewDimension,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type,
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    kind: wgpu::SamplerBindingType,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Sampler(kind),
        count: None,
    }
}

/// Bind group layouts shared by the pipelines and the executor's bind groups.
pub struct BindLayouts {
    /// Group 0: [`PassUniforms`] at a dynamic offset.
    pub pass: wgpu::BindGroupLayout,
    /// Group 1: [`ObjectUniforms`] at a dynamic offset.
    pub object: wgpu::BindGroupLayout,
    /// Group 1 of the particle pipelines: [`ParticleUniforms`].
    pub particles: wgpu::BindGroupLayout,
    /// Group 2: albedo, height map and their sampler.
    pub surface: wgpu::BindGroupLayout,
    /// Group 3: lights, shadow matrices, shadow atlas and comparison sampler.
    pub lighting: wgpu::BindGroupLayout,
    pub blur: wgpu::BindGroupLayout,
    pub overlay: wgpu::BindGroupLayout,
}

impl BindLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let vertex_fragment = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let fragment = wgpu::ShaderStages::FRAGMENT;
        let float = wgpu::TextureSampleType::Float { filterable: true };
        let d2 = wgpu::TextureViewDimension::D2;

        let pass = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Pass Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                vertex_fragment,
                true,
                std::mem::size_of::<PassUniforms>(),
            )],
        });

        let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                vertex_fragment,
                true,
                std::mem::size_of::<ObjectUniforms>(),
            )],
        });

        let particles = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[uniform_entry(
                0,
                vertex_fragment,
                false,
                std::mem::size_of::<ParticleUniforms>(),
            )],
        });

        let surface = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Bind Group Layout"),
            entries: &[
                texture_entry(0, vertex_fragment, float, d2),
                texture_entry(1, vertex_fragment, float, d2),
                sampler_entry(2, vertex_fragment, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let lighting = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Lighting Bind Group Layout"),
            entries: &[
                uniform_entry(0, fragment, false, std::mem::size_of::<LightBlock>()),
                uniform_entry(1, fragment, false, std::mem::size_of::<ShadowMatrices>()),
                texture_entry(
                    2,
                    fragment,
                    wgpu::TextureSampleType::Depth,
                    wgpu::TextureViewDimension::D2Array,
                ),
                sampler_entry(3, fragment, wgpu::SamplerBindingType::Comparison),
            ],
        });

        let blur = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Motion Blur Bind Group Layout"),
            entries: &[
                uniform_entry(0, fragment, false, std::mem::size_of::<BlurUniforms>()),
                texture_entry(1, fragment, float, d2),
                texture_entry(2, fragment, wgpu::TextureSampleType::Depth, d2),
                sampler_entry(3, fragment, wgpu::SamplerBindingType::Filtering),
            ],
        });

        let overlay = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Shadow Overlay Bind Group Layout"),
            entries: &[
                uniform_entry(0, fragment, false, std::mem::size_of::<OverlayUniforms>()),
                texture_entry(
                    1,
                    fragment,
                    wgpu::TextureSampleType::Depth,
                    wgpu::TextureViewDimension::D2Array,
                ),
            ],
        });

        Self {
            pass,
            object,
            particles,
            surface,
            lighting,
            blur,
            overlay,
        }
    }
}

/// Lit pipelines for each shading path.
pub struct ShadedPipelines {
    pub generic: wgpu::RenderPipeline,
    pub terrain: wgpu::RenderPipeline,
    pub water: wgpu::RenderPipeline,
}

impl ShadedPipelines {
    pub fn get(&self, shading: Shading) -> &wgpu::RenderPipeline {
        match shading {
            Shading::Generic => &self.generic,
            Shading::Terrain => &self.terrain,
            Shading::Water => &self.water,
        }
    }
}

/// Vertex entry point and buffers for a shading path.
fn vertex_path(shading: Shading) -> (&'static str, &'static [wgpu::VertexBufferLayout<'static>]) {
    const MESH: &[wgpu::VertexBufferLayout<'static>] = &[Vertex3d::LAYOUT];
    const PATCHES: &[wgpu::VertexBufferLayout<'static>] = &[Vertex3d::LAYOUT, PatchInstance::LAYOUT];
    match shading {
        Shading::Generic => ("vs_generic", MESH),
        Shading::Terrain => ("vs_terrain", MESH),
        Shading::Water => ("vs_water", PATCHES),
    }
}

fn depth_state(write: bool, compare: wgpu::CompareFunction) -> Option<wgpu::DepthStencilState> {
    Some(wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    })
}

/// Every pipeline the executor records with.
pub struct PipelineSet {
    pub layouts: BindLayouts,
    pub depth: ShadedPipelines,
    pub depth_particles: wgpu::RenderPipeline,
    pub lit: ShadedPipelines,
    /// Line-polygon variants of `lit`, when the device supports them.
    pub wireframe: Option<ShadedPipelines>,
    pub sky: wgpu::RenderPipeline,
    pub marker: wgpu::RenderPipeline,
    pub particles: wgpu::RenderPipeline,
    pub motion_blur: wgpu::RenderPipeline,
    pub overlay: wgpu::RenderPipeline,
}

impl PipelineSet {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;
        let format = gpu.config.format;
        let layouts = BindLayouts::new(device);

        let surface_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Surface Shader"),
            source: wgpu::ShaderSource::Wgsl(surface_source().into()),
        });
        let fire_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fire Shader"),
            source: wgpu::ShaderSource::Wgsl(fire_source().into()),
        });
        let blur_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Motion Blur Shader"),
            source: wgpu::ShaderSource::Wgsl(blur_source().into()),
        });
        let overlay_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Overlay Shader"),
            source: wgpu::ShaderSource::Wgsl(overlay_source().into()),
        });

        let layout = |label: &str, groups: &[&wgpu::BindGroupLayout]| {
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: groups,
                push_constant_ranges: &[],
            })
        };
        let depth_generic_layout = layout("Depth Layout", &[&layouts.pass, &layouts.object]);
        let depth_surface_layout = layout(
            "Displaced Depth Layout",
            &[&layouts.pass, &layouts.object, &layouts.surface],
        );
        let unlit_layout = layout(
            "Unlit Layout",
            &[&layouts.pass, &layouts.object, &layouts.surface],
        );
        let lit_layout = layout(
            "Lit Layout",
            &[
                &layouts.pass,
                &layouts.object,
                &layouts.surface,
                &layouts.lighting,
            ],
        );
        let particle_layout = layout("Particle Layout", &[&layouts.pass, &layouts.particles]);
        let blur_layout = layout("Motion Blur Layout", &[&layouts.blur]);
        let overlay_layout = layout("Shadow Overlay Layout", &[&layouts.overlay]);

        let depth_pipeline = |shading: Shading| {
            let (entry, buffers) = vertex_path(shading);
            let pipeline_layout = match shading {
                Shading::Generic => &depth_generic_layout,
                Shading::Terrain | Shading::Water => &depth_surface_layout,
            };
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Depth {shading:?} Pipeline")),
                layout: Some(pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &surface_shader,
                    entry_point: Some(entry),
                    buffers,
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_state(true, wgpu::CompareFunction::Less),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let lit_pipeline = |shading: Shading, polygon_mode: wgpu::PolygonMode| {
            let (entry, buffers) = vertex_path(shading);
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("Lit {shading:?} {polygon_mode:?} Pipeline")),
                layout: Some(&lit_layout),
                vertex: wgpu::VertexState {
                    module: &surface_shader,
                    entry_point: Some(entry),
                    buffers,
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &surface_shader,
                    entry_point: Some("fs_lit"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode,
                    ..Default::default()
                },
                depth_stencil: depth_state(true, wgpu::CompareFunction::Less),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let unlit_pipeline = |label: &str, cull_mode: wgpu::Face, depth: Option<wgpu::DepthStencilState>| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&unlit_layout),
                vertex: wgpu::VertexState {
                    module: &surface_shader,
                    entry_point: Some("vs_generic"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &surface_shader,
                    entry_point: Some("fs_unlit"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(cull_mode),
                    ..Default::default()
                },
                depth_stencil: depth,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let depth = ShadedPipelines {
            generic: depth_pipeline(Shading::Generic),
            terrain: depth_pipeline(Shading::Terrain),
            water: depth_pipeline(Shading::Water),
        };
        let shaded = |mode| ShadedPipelines {
            generic: lit_pipeline(Shading::Generic, mode),
            terrain: lit_pipeline(Shading::Terrain, mode),
            water: lit_pipeline(Shading::Water, mode),
        };
        let lit = shaded(wgpu::PolygonMode::Fill);
        let wireframe = gpu
            .supports_wireframe
            .then(|| shaded(wgpu::PolygonMode::Line));

        // The camera sits inside the sky sphere, so its inner faces are the ones kept.
        let sky = unlit_pipeline(
            "Sky Pipeline",
            wgpu::Face::Front,
            depth_state(false, wgpu::CompareFunction::Always),
        );
        let marker = unlit_pipeline(
            "Light Marker Pipeline",
            wgpu::Face::Back,
            depth_state(true, wgpu::CompareFunction::Less),
        );

        let particle_pipeline = |label: &str, fragment: wgpu::FragmentState, write: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&particle_layout),
                vertex: wgpu::VertexState {
                    module: &fire_shader,
                    entry_point: Some("vs_particle"),
                    buffers: &[PARTICLE_INSTANCE_LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(fragment),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: depth_state(write, wgpu::CompareFunction::Less),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let particles = particle_pipeline(
            "Fire Pipeline",
            wgpu::FragmentState {
                module: &fire_shader,
                entry_point: Some("fs_particle"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            },
            false,
        );
        let depth_particles = particle_pipeline(
            "Fire Depth Pipeline",
            wgpu::FragmentState {
                module: &fire_shader,
                entry_point: Some("fs_particle_depth"),
                targets: &[],
                compilation_options: Default::default(),
            },
            true,
        );

        let fullscreen_pipeline =
            |label: &str, layout: &wgpu::PipelineLayout, module: &wgpu::ShaderModule, entry: &str| {
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(layout),
                    vertex: wgpu::VertexState {
                        module,
                        entry_point: Some("vs_fullscreen"),
                        buffers: &[],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module,
                        entry_point: Some(entry),
                        targets: &[Some(wgpu::ColorTargetState {
                            format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        cull_mode: None,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                    cache: None,
                })
            };

        let motion_blur =
            fullscreen_pipeline("Motion Blur Pipeline", &blur_layout, &blur_shader, "fs_blur");
        let overlay = fullscreen_pipeline(
            "Shadow Overlay Pipeline",
            &overlay_layout,
            &overlay_shader,
            "fs_overlay",
        );

        log::info!(
            "pipelines ready (wireframe {})",
            if wireframe.is_some() { "available" } else { "unavailable" }
        );

        Self {
            layouts,
            depth,
            depth_particles,
            lit,
            wireframe,
            sky,
            marker,
            particles,
            motion_blur,
            overlay,
        }
    }

    /// Lit pipeline for `shading`, in wireframe when requested and available.
    pub fn lit(&self, shading: Shading, wireframe: bool) -> &wgpu::RenderPipeline {
        match (&self.wireframe, wireframe) {
            (Some(lines), true) => lines.get(shading),
            _ => self.lit.get(shading),
        }
    }
}
