//! Vertex format, CPU-side mesh builders and GPU meshes.
//!
//! Geometry is built as [`MeshData`] first so it can be inspected and tested without a device,
//! then uploaded with [`MeshData::upload`]. All primitives wind counter-clockwise when seen from
//! outside.
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | normal    | Float32x3 | 12     | 1               |
//! | uv        | Float32x2 | 24     | 2               |

use glam::Vec3;

use crate::gpu::GpuContext;

/// Per-vertex data shared by every mesh pipeline (32 bytes).
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3d {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle list in system memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex3d>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unit cube centred on the origin, four vertices per face.
    pub fn cube() -> Self {
        // (normal, tangent u, tangent v) per face; u × v == normal keeps the winding outward.
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];

        let mut data = Self::default();
        for (normal, u, v) in faces {
            let base = data.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position = (normal + u * su + v * sv) * 0.5;
                data.vertices.push(Vertex3d::new(
                    position.into(),
                    normal.into(),
                    [(su + 1.0) * 0.5, (1.0 - sv) * 0.5],
                ));
            }
            data.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        data
    }

    /// Latitude/longitude sphere of radius 0.5.
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut data = Self::default();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                data.vertices.push(Vertex3d::new(
                    (normal * 0.5).into(),
                    normal.into(),
                    [seg as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let below = current + segments + 1;
                data.indices
                    .extend_from_slice(&[current, current + 1, below, current + 1, below + 1, below]);
            }
        }
        data
    }

    /// Flat grid on the XZ plane spanning `[0, size]` on both axes, facing +Y.
    ///
    /// UVs run from 0 to 1 across the whole grid.
    pub fn grid(size: f32, cells: u32) -> Self {
        let cells = cells.max(1);
        let step = size / cells as f32;
        let row = cells + 1;
        let mut data = Self::default();

        for z in 0..=cells {
            for x in 0..=cells {
                data.vertices.push(Vertex3d::new(
                    [x as f32 * step, 0.0, z as f32 * step],
                    [0.0, 1.0, 0.0],
                    [x as f32 / cells as f32, z as f32 / cells as f32],
                ));
            }
        }

        for z in 0..cells {
            for x in 0..cells {
                let a = z * row + x;
                let b = a + 1;
                let d = a + row;
                let c = d + 1;
                data.indices.extend_from_slice(&[a, d, c, a, c, b]);
            }
        }
        data
    }

    /// One water patch subdivided `level` times per side.
    pub fn patch(level: u32) -> Self {
        Self::grid(1.0, level)
    }

    /// Scales positions per axis; normals are re-normalised for non-uniform factors.
    pub fn scaled(mut self, factors: Vec3) -> Self {
        let inverse = factors.recip();
        for vertex in &mut self.vertices {
            vertex.position = (Vec3::from(vertex.position) * factors).into();
            vertex.normal = (Vec3::from(vertex.normal) * inverse).normalize_or_zero().into();
        }
        self
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.vertices.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), v| {
                let p = Vec3::from(v.position);
                (min.min(p), max.max(p))
            },
        )
    }

    pub fn upload(&self, gpu: &GpuContext, label: &str) -> Mesh {
        Mesh::new(gpu, &self.vertices, &self.indices, label)
    }
}

/// GPU-resident geometry.
#[derive(Debug)]
pub struct Mesh {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    pub(crate) index_count: u32,
}

impl Mesh {
    pub fn new(gpu: &GpuContext, vertices: &[Vertex3d], indices: &[u32], label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    /// Binds both buffers on slot 0 and the index slot.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }
}
