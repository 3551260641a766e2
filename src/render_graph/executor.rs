//! Records a [`FramePlan`] into wgpu commands and presents it.

use std::collections::HashMap;

use super::pipelines::PipelineSet;
use super::plan::{DrawCommand, FramePlan, ObjectDraw, PassPlan, PassTarget, Phase};
use super::targets::{ColorTarget, DepthTarget, ShadowAtlas};
use crate::assets::AssetLibrary;
use crate::binders::{
    BlurUniforms, DepthBinder, LightBlock, ObjectUniforms, OverlayUniforms, ParticleUniforms,
    PassUniforms, ShadowMatrices, UniformArena, slots,
};
use crate::binders::fire::VERTICES_PER_PARTICLE;
use crate::error::RenderError;
use crate::fire::FireParticle;
use crate::gpu::GpuContext;
use crate::scene::{Shading, TextureKey};
use crate::tessellation::{PatchInstance, WaterPatchPlan};

const CAMERA_DEPTH_LABEL: &str = "Camera Depth";
const SCENE_DEPTH_LABEL: &str = "Scene Depth";
const SCENE_COLOR_LABEL: &str = "Scene Color";

/// Per-frame vertex data that lives outside the plan.
#[derive(Clone, Copy)]
pub struct FrameGeometry<'a> {
    /// Instance data for the fire billboards; the plan's particle draws never exceed its length.
    pub particles: &'a [FireParticle],
    /// Water patches batched by tessellation level.
    pub water: &'a WaterPatchPlan,
}

/// A buffer that is recreated larger whenever a write does not fit.
///
/// Capacity grows to the next power of two of the largest write and never shrinks. Growth
/// invalidates bind groups built over the old buffer; [`write`](Self::write) reports it.
struct GrowableBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    usage: wgpu::BufferUsages,
    label: &'static str,
}

impl GrowableBuffer {
    fn new(
        device: &wgpu::Device,
        label: &'static str,
        usage: wgpu::BufferUsages,
        capacity: u64,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            usage,
            label,
        }
    }

    /// Uploads `bytes` from offset 0. Returns whether the buffer had to be recreated.
    fn write(&mut self, gpu: &GpuContext, bytes: &[u8]) -> bool {
        let needed = bytes.len() as u64;
        let grew = needed > self.capacity;
        if grew {
            let capacity = needed.next_power_of_two();
            log::debug!("growing {} to {capacity} bytes", self.label);
            *self = Self::new(&gpu.device, self.label, self.usage, capacity);
        }
        if !bytes.is_empty() {
            gpu.queue.write_buffer(&self.buffer, 0, bytes);
        }
        grew
    }
}

/// Arena offsets of one pass: its viewpoint and each command's object uniforms.
struct PassOffsets {
    view: u32,
    objects: Vec<Option<u32>>,
}

fn uniform_buffer(device: &wgpu::Device, label: &str, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: size as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Bind group over a `size`-byte window of the arena; the draw picks the window by dynamic
/// offset.
fn arena_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    arena: &wgpu::Buffer,
    size: usize,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: arena,
                offset: 0,
                size: wgpu::BufferSize::new(size as u64),
            }),
        }],
    })
}

/// Owns every GPU resource the frame plan refers to and records plans into command buffers.
///
/// Per-pass and per-object uniforms are packed into one [`UniformArena`] each frame and bound
/// with dynamic offsets, so a frame costs a single uniform upload however many shadow passes
/// it has.
pub struct FrameExecutor {
    pipelines: PipelineSet,
    atlas: ShadowAtlas,
    camera_depth: DepthTarget,
    scene_depth: DepthTarget,
    scene_color: ColorTarget,

    arena: UniformArena,
    arena_buffer: GrowableBuffer,
    pass_group: wgpu::BindGroup,
    object_group: wgpu::BindGroup,

    lighting_buffer: wgpu::Buffer,
    shadow_matrix_buffer: wgpu::Buffer,
    lighting_group: wgpu::BindGroup,
    particle_buffer: wgpu::Buffer,
    particle_group: wgpu::BindGroup,
    blur_buffer: wgpu::Buffer,
    blur_group: wgpu::BindGroup,
    overlay_buffer: wgpu::Buffer,
    overlay_group: wgpu::BindGroup,

    surface_sampler: wgpu::Sampler,
    blur_sampler: wgpu::Sampler,

    particle_instances: GrowableBuffer,
    patch_instances: GrowableBuffer,
    surface_groups: HashMap<(TextureKey, TextureKey), wgpu::BindGroup>,
}

impl FrameExecutor {
    /// Builds every pipeline, the shadow atlas at `shadow_map_size` texels square, and the
    /// screen-sized targets for the current surface.
    ///
    /// Screen-sized targets are recreated inside [`execute`](Self::execute) when the surface
    /// is resized.
    pub fn new(gpu: &GpuContext, shadow_map_size: u32) -> Self {
        let device = &gpu.device;
        let pipelines = PipelineSet::new(gpu);
        let layouts = &pipelines.layouts;

        let atlas = ShadowAtlas::new(gpu, shadow_map_size);
        let camera_depth = DepthTarget::new(gpu, CAMERA_DEPTH_LABEL);
        let scene_depth = DepthTarget::new(gpu, SCENE_DEPTH_LABEL);
        let scene_color = ColorTarget::new(gpu, SCENE_COLOR_LABEL);

        let arena_buffer = GrowableBuffer::new(
            device,
            "Uniform Arena",
            wgpu::BufferUsages::UNIFORM,
            (UniformArena::ALIGNMENT * 64) as u64,
        );
        let pass_group = arena_group(
            device,
            "Pass Bind Group",
            &layouts.pass,
            &arena_buffer.buffer,
            std::mem::size_of::<PassUniforms>(),
        );
        let object_group = arena_group(
            device,
            "Object Bind Group",
            &layouts.object,
            &arena_buffer.buffer,
            std::mem::size_of::<ObjectUniforms>(),
        );

        let surface_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Surface Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        let shadow_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let blur_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Motion Blur Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let lighting_buffer = uniform_buffer(
            device,
            "Light Block",
            std::mem::size_of::<LightBlock>(),
        );
        let shadow_matrix_buffer = uniform_buffer(
            device,
            "Shadow Matrices",
            std::mem::size_of::<ShadowMatrices>(),
        );
        let lighting_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Lighting Bind Group"),
            layout: &layouts.lighting,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: lighting_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: shadow_matrix_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: slots::SHADOW_MAP,
                    resource: wgpu::BindingResource::TextureView(atlas.array_view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots::SHADOW_SAMPLER,
                    resource: wgpu::BindingResource::Sampler(&shadow_sampler),
                },
            ],
        });

        let particle_buffer = uniform_buffer(
            device,
            "Particle Uniforms",
            std::mem::size_of::<ParticleUniforms>(),
        );
        let particle_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Bind Group"),
            layout: &layouts.particles,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_buffer.as_entire_binding(),
            }],
        });

        let blur_buffer = uniform_buffer(
            device,
            "Motion Blur Uniforms",
            std::mem::size_of::<BlurUniforms>(),
        );
        let blur_group = Self::blur_group(
            device,
            &pipelines,
            &blur_buffer,
            &scene_color,
            &camera_depth,
            &blur_sampler,
        );

        let overlay_buffer = uniform_buffer(
            device,
            "Shadow Overlay Uniforms",
            std::mem::size_of::<OverlayUniforms>(),
        );
        let overlay_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Overlay Bind Group"),
            layout: &layouts.overlay,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: overlay_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(atlas.array_view()),
                },
            ],
        });

        let particle_instances = GrowableBuffer::new(
            device,
            "Fire Instances",
            wgpu::BufferUsages::VERTEX,
            (std::mem::size_of::<FireParticle>() * 1024) as u64,
        );
        let patch_instances = GrowableBuffer::new(
            device,
            "Water Patch Instances",
            wgpu::BufferUsages::VERTEX,
            (std::mem::size_of::<PatchInstance>() * 4096) as u64,
        );

        Self {
            pipelines,
            atlas,
            camera_depth,
            scene_depth,
            scene_color,
            arena: UniformArena::new(),
            arena_buffer,
            pass_group,
            object_group,
            lighting_buffer,
            shadow_matrix_buffer,
            lighting_group,
            particle_buffer,
            particle_group,
            blur_buffer,
            blur_group,
            overlay_buffer,
            overlay_group,
            surface_sampler,
            blur_sampler,
            particle_instances,
            patch_instances,
            surface_groups: HashMap::new(),
        }
    }

    fn blur_group(
        device: &wgpu::Device,
        pipelines: &PipelineSet,
        uniforms: &wgpu::Buffer,
        scene_color: &ColorTarget,
        camera_depth: &DepthTarget,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Motion Blur Bind Group"),
            layout: &pipelines.layouts.blur,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&scene_color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&camera_depth.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    /// Edge length of each shadow layer in texels.
    pub fn shadow_map_size(&self) -> u32 {
        self.atlas.size()
    }

    /// Records and presents one frame.
    ///
    /// Passes are encoded in plan order into a single command buffer. All uniforms for the
    /// frame are written before recording starts.
    ///
    /// A lost or outdated surface is reconfigured and the frame dropped; a timed-out
    /// acquisition just drops the frame. Other surface errors are returned.
    pub fn execute(
        &mut self,
        gpu: &GpuContext,
        plan: &FramePlan,
        geometry: FrameGeometry<'_>,
        assets: &AssetLibrary,
    ) -> Result<(), RenderError> {
        self.ensure_targets(gpu);
        let offsets = self.stage_uniforms(plan);
        self.upload(gpu, plan, geometry);
        self.ensure_surface_groups(gpu, plan, assets);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out acquiring a frame; skipping it");
                return Ok(());
            }
            Err(err) => return Err(RenderError::Frame(err)),
        };
        let screen_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        for (pass, offsets) in plan.passes.iter().zip(&offsets) {
            self.record_pass(gpu, &mut encoder, &screen_view, plan, pass, offsets, geometry, assets);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn ensure_targets(&mut self, gpu: &GpuContext) {
        self.scene_depth.ensure_size(gpu, SCENE_DEPTH_LABEL);
        let depth_resized = self.camera_depth.ensure_size(gpu, CAMERA_DEPTH_LABEL);
        let color_resized = self.scene_color.ensure_size(gpu, SCENE_COLOR_LABEL);
        if depth_resized || color_resized {
            self.blur_group = Self::blur_group(
                &gpu.device,
                &self.pipelines,
                &self.blur_buffer,
                &self.scene_color,
                &self.camera_depth,
                &self.blur_sampler,
            );
        }
    }

    /// Packs every pass viewpoint and object into the arena, in recording order.
    fn stage_uniforms(&mut self, plan: &FramePlan) -> Vec<PassOffsets> {
        self.arena.clear();
        let mut offsets = Vec::with_capacity(plan.passes.len());
        for pass in &plan.passes {
            let view = self.arena.push(&pass.view);
            let mut objects = Vec::with_capacity(pass.commands.len());
            for command in &pass.commands {
                objects.push(command.object_uniforms().map(|uniforms| self.arena.push(uniforms)));
            }
            offsets.push(PassOffsets { view, objects });
        }
        offsets
    }

    fn upload(&mut self, gpu: &GpuContext, plan: &FramePlan, geometry: FrameGeometry<'_>) {
        if self.arena_buffer.write(gpu, self.arena.as_bytes()) {
            let layouts = &self.pipelines.layouts;
            self.pass_group = arena_group(
                &gpu.device,
                "Pass Bind Group",
                &layouts.pass,
                &self.arena_buffer.buffer,
                std::mem::size_of::<PassUniforms>(),
            );
            self.object_group = arena_group(
                &gpu.device,
                "Object Bind Group",
                &layouts.object,
                &self.arena_buffer.buffer,
                std::mem::size_of::<ObjectUniforms>(),
            );
        }

        let queue = &gpu.queue;
        queue.write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&plan.lighting));
        queue.write_buffer(
            &self.shadow_matrix_buffer,
            0,
            bytemuck::bytes_of(&plan.shadow_matrices),
        );
        queue.write_buffer(&self.particle_buffer, 0, bytemuck::bytes_of(&plan.particles));

        for command in plan.passes.iter().flat_map(|pass| &pass.commands) {
            match command {
                DrawCommand::MotionBlur(uniforms) => {
                    queue.write_buffer(&self.blur_buffer, 0, bytemuck::bytes_of(uniforms));
                }
                DrawCommand::ShadowOverlay(uniforms) => {
                    queue.write_buffer(&self.overlay_buffer, 0, bytemuck::bytes_of(uniforms));
                }
                _ => {}
            }
        }

        self.particle_instances
            .write(gpu, bytemuck::cast_slice(geometry.particles));
        self.patch_instances
            .write(gpu, bytemuck::cast_slice(&geometry.water.instances));
    }

    fn ensure_surface_groups(&mut self, gpu: &GpuContext, plan: &FramePlan, assets: &AssetLibrary) {
        let layout = &self.pipelines.layouts.surface;
        let sampler = &self.surface_sampler;
        let draws = plan
            .passes
            .iter()
            .flat_map(|pass| &pass.commands)
            .filter_map(DrawCommand::object);
        for draw in draws {
            self.surface_groups
                .entry((draw.albedo, draw.height_map))
                .or_insert_with(|| {
                    log::debug!("surface bind group for {} / {}", draw.albedo.0, draw.height_map.0);
                    gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some(&format!("Surface {}", draw.albedo.0)),
                        layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: slots::ALBEDO,
                                resource: wgpu::BindingResource::TextureView(
                                    &assets.texture(draw.albedo).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: slots::HEIGHT_MAP,
                                resource: wgpu::BindingResource::TextureView(
                                    &assets.texture(draw.height_map).view,
                                ),
                            },
                            wgpu::BindGroupEntry {
                                binding: slots::SURFACE_SAMPLER,
                                resource: wgpu::BindingResource::Sampler(sampler),
                            },
                        ],
                    })
                });
        }
    }

    /// Colour and depth attachments for a pass target.
    fn attachments<'a>(
        &'a self,
        pass: &PassPlan,
        screen_view: &'a wgpu::TextureView,
    ) -> Option<(Option<&'a wgpu::TextureView>, Option<&'a wgpu::TextureView>)> {
        match pass.target {
            PassTarget::ShadowMap { light, face } => self
                .atlas
                .layer_view(DepthBinder::layer(light, face))
                .map(|view| (None, Some(view))),
            PassTarget::CameraDepth => Some((None, Some(&self.camera_depth.view))),
            PassTarget::SceneColor => {
                Some((Some(&self.scene_color.view), Some(&self.scene_depth.view)))
            }
            PassTarget::BackBuffer if pass.phase == Phase::Scene => {
                Some((Some(screen_view), Some(&self.scene_depth.view)))
            }
            PassTarget::BackBuffer => Some((Some(screen_view), None)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record_pass(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        screen_view: &wgpu::TextureView,
        plan: &FramePlan,
        pass: &PassPlan,
        offsets: &PassOffsets,
        geometry: FrameGeometry<'_>,
        assets: &AssetLibrary,
    ) {
        let Some((color, depth)) = self.attachments(pass, screen_view) else {
            log::warn!("no attachment for {}; skipping pass", pass.label());
            return;
        };

        let label = pass.label();
        let color_attachments: Vec<_> = color
            .into_iter()
            .map(|view| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: pass.clear.map_or(wgpu::LoadOp::Load, wgpu::LoadOp::Clear),
                        store: wgpu::StoreOp::Store,
                    },
                })
            })
            .collect();
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(&label),
            color_attachments: &color_attachments,
            depth_stencil_attachment: depth.map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for (command, object_offset) in pass.commands.iter().zip(&offsets.objects) {
            let view_offsets = [offsets.view];
            match command {
                DrawCommand::Depth(draw) => {
                    render_pass.set_pipeline(self.pipelines.depth.get(draw.shading));
                    self.bind_object(&mut render_pass, draw, offsets.view, *object_offset);
                    self.draw_object(&mut render_pass, draw, geometry, assets);
                }
                DrawCommand::Lit(draw) => {
                    render_pass.set_pipeline(self.pipelines.lit(draw.shading, plan.wireframe));
                    self.bind_object(&mut render_pass, draw, offsets.view, *object_offset);
                    render_pass.set_bind_group(3, &self.lighting_group, &[]);
                    self.draw_object(&mut render_pass, draw, geometry, assets);
                }
                DrawCommand::Sky(draw) | DrawCommand::Marker(draw) => {
                    let pipeline = if matches!(command, DrawCommand::Sky(_)) {
                        &self.pipelines.sky
                    } else {
                        &self.pipelines.marker
                    };
                    render_pass.set_pipeline(pipeline);
                    self.bind_object(&mut render_pass, draw, offsets.view, *object_offset);
                    self.draw_object(&mut render_pass, draw, geometry, assets);
                }
                DrawCommand::Particles { count } | DrawCommand::DepthParticles { count } => {
                    let pipeline = if matches!(command, DrawCommand::Particles { .. }) {
                        &self.pipelines.particles
                    } else {
                        &self.pipelines.depth_particles
                    };
                    let count = (*count).min(geometry.particles.len() as u32);
                    if count == 0 {
                        continue;
                    }
                    render_pass.set_pipeline(pipeline);
                    render_pass.set_bind_group(0, &self.pass_group, &view_offsets);
                    render_pass.set_bind_group(1, &self.particle_group, &[]);
                    render_pass.set_vertex_buffer(0, self.particle_instances.buffer.slice(..));
                    render_pass.draw(0..VERTICES_PER_PARTICLE, 0..count);
                }
                DrawCommand::MotionBlur(_) => {
                    render_pass.set_pipeline(&self.pipelines.motion_blur);
                    render_pass.set_bind_group(0, &self.blur_group, &[]);
                    render_pass.draw(0..3, 0..1);
                }
                DrawCommand::ShadowOverlay(_) => {
                    let (x, y) = DepthBinder::overlay_origin(gpu.width());
                    let size = DepthBinder::OVERLAY_SIZE
                        .min(gpu.width() - x)
                        .min(gpu.height().saturating_sub(y));
                    if size == 0 {
                        continue;
                    }
                    render_pass.set_viewport(x as f32, y as f32, size as f32, size as f32, 0.0, 1.0);
                    render_pass.set_pipeline(&self.pipelines.overlay);
                    render_pass.set_bind_group(0, &self.overlay_group, &[]);
                    render_pass.draw(0..3, 0..1);
                }
            }
        }
    }

    /// Binds groups 0 to 2 for an object draw.
    fn bind_object(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        draw: &ObjectDraw,
        view_offset: u32,
        object_offset: Option<u32>,
    ) {
        render_pass.set_bind_group(0, &self.pass_group, &[view_offset]);
        render_pass.set_bind_group(1, &self.object_group, &[object_offset.unwrap_or(0)]);
        if let Some(group) = self.surface_groups.get(&(draw.albedo, draw.height_map)) {
            render_pass.set_bind_group(2, group, &[]);
        }
    }

    fn draw_object(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        draw: &ObjectDraw,
        geometry: FrameGeometry<'_>,
        assets: &AssetLibrary,
    ) {
        if draw.shading == Shading::Water {
            render_pass.set_vertex_buffer(1, self.patch_instances.buffer.slice(..));
            for batch in &geometry.water.batches {
                let Some(mesh) = assets.water_patch(batch.level_index) else {
                    continue;
                };
                mesh.bind(render_pass);
                let instances = batch.first_instance..batch.first_instance + batch.instance_count;
                render_pass.draw_indexed(0..mesh.index_count, 0, instances);
            }
            return;
        }

        match assets.mesh(draw.mesh) {
            Some(mesh) => {
                mesh.bind(render_pass);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
            None => log::trace!("no mesh for {:?}", draw.mesh),
        }
    }
}
