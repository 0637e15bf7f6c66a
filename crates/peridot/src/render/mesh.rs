//! Built-in meshes and per-entity texcoord buffers.
//!
//! All drawable geometry is one of three tiny triangle strips. Positions
//! are immutable and shared; texture coordinates live in slot 1, either a
//! static per-mesh default or a small per-entity buffer rewritten with the
//! current animation frame.

use wgpu::util::DeviceExt;

use crate::render::gpu::GpuContext;
use crate::render::vertex::{PositionVertex, TexCoordVertex};
use crate::scene::sprite::ShapeKind;

/// Handle to a built-in mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(pub(crate) usize);

impl MeshHandle {
    /// Unit quad centered on the origin, strip order TR TL BR BL.
    pub const QUAD: Self = Self(0);
    /// Apex-up triangle: `(0,1) (1,-1) (-1,-1)`.
    pub const TRIANGLE: Self = Self(1);
    /// Unit quad anchored at the origin's bottom-left, for text bitmaps.
    pub const TEXT_QUAD: Self = Self(2);

    pub(crate) fn for_shape(shape: ShapeKind) -> Self {
        match shape {
            ShapeKind::Quad => Self::QUAD,
            ShapeKind::Triangle => Self::TRIANGLE,
        }
    }
}

/// Handle to a per-entity texcoord buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexCoordHandle(pub(crate) usize);

pub(crate) struct GpuMesh {
    pub positions: wgpu::Buffer,
    /// Whole-texture UVs for draws that never animate.
    pub default_texcoords: wgpu::Buffer,
    pub vertex_count: u32,
}

/// Owns the built-in meshes and all per-entity texcoord buffers.
pub(crate) struct MeshStore {
    meshes: Vec<GpuMesh>,
    texcoords: Vec<wgpu::Buffer>,
}

// Strip order: top-right, top-left, bottom-right, bottom-left.
const QUAD_POSITIONS: [PositionVertex; 4] = [
    PositionVertex { position: [1.0, 1.0] },
    PositionVertex { position: [-1.0, 1.0] },
    PositionVertex { position: [1.0, -1.0] },
    PositionVertex { position: [-1.0, -1.0] },
];

const QUAD_TEXCOORDS: [TexCoordVertex; 4] = [
    TexCoordVertex { uv: [1.0, 0.0] },
    TexCoordVertex { uv: [0.0, 0.0] },
    TexCoordVertex { uv: [1.0, 1.0] },
    TexCoordVertex { uv: [0.0, 1.0] },
];

const TRIANGLE_POSITIONS: [PositionVertex; 3] = [
    PositionVertex { position: [0.0, 1.0] },
    PositionVertex { position: [1.0, -1.0] },
    PositionVertex { position: [-1.0, -1.0] },
];

// Apex samples the top-center of the frame.
const TRIANGLE_TEXCOORDS: [TexCoordVertex; 3] = [
    TexCoordVertex { uv: [0.5, 0.0] },
    TexCoordVertex { uv: [1.0, 1.0] },
    TexCoordVertex { uv: [0.0, 1.0] },
];

// Origin-anchored: (0,0) is the bottom-left corner in world space, which
// samples the bottom of the bitmap.
const TEXT_QUAD_POSITIONS: [PositionVertex; 4] = [
    PositionVertex { position: [1.0, 1.0] },
    PositionVertex { position: [0.0, 1.0] },
    PositionVertex { position: [1.0, 0.0] },
    PositionVertex { position: [0.0, 0.0] },
];

const TEXT_QUAD_TEXCOORDS: [TexCoordVertex; 4] = [
    TexCoordVertex { uv: [1.0, 0.0] },
    TexCoordVertex { uv: [0.0, 0.0] },
    TexCoordVertex { uv: [1.0, 1.0] },
    TexCoordVertex { uv: [0.0, 1.0] },
];

impl MeshStore {
    pub(crate) fn new(gpu: &GpuContext) -> Self {
        let meshes = vec![
            upload_mesh(gpu, "quad", &QUAD_POSITIONS, &QUAD_TEXCOORDS),
            upload_mesh(gpu, "triangle", &TRIANGLE_POSITIONS, &TRIANGLE_TEXCOORDS),
            upload_mesh(gpu, "text quad", &TEXT_QUAD_POSITIONS, &TEXT_QUAD_TEXCOORDS),
        ];
        Self {
            meshes,
            texcoords: Vec::new(),
        }
    }

    pub(crate) fn mesh(&self, handle: MeshHandle) -> &GpuMesh {
        &self.meshes[handle.0]
    }

    /// Allocates a rewritable texcoord buffer sized for a quad. Triangle
    /// draws use the first three entries.
    pub(crate) fn create_texcoords(&mut self, gpu: &GpuContext) -> TexCoordHandle {
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("entity texcoords"),
            size: (std::mem::size_of::<TexCoordVertex>() * 4) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.texcoords.push(buffer);
        TexCoordHandle(self.texcoords.len() - 1)
    }

    pub(crate) fn texcoords(&self, handle: TexCoordHandle) -> &wgpu::Buffer {
        &self.texcoords[handle.0]
    }

    pub(crate) fn write_texcoords(
        &self,
        gpu: &GpuContext,
        handle: TexCoordHandle,
        uvs: &[TexCoordVertex],
    ) {
        gpu.queue
            .write_buffer(self.texcoords(handle), 0, bytemuck::cast_slice(uvs));
    }
}

fn upload_mesh(
    gpu: &GpuContext,
    label: &str,
    positions: &[PositionVertex],
    texcoords: &[TexCoordVertex],
) -> GpuMesh {
    let position_buffer = gpu
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} positions")),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
    let texcoord_buffer = gpu
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} texcoords")),
            contents: bytemuck::cast_slice(texcoords),
            usage: wgpu::BufferUsages::VERTEX,
        });
    GpuMesh {
        positions: position_buffer,
        default_texcoords: texcoord_buffer,
        vertex_count: positions.len() as u32,
    }
}
