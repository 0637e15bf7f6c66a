//! Vertex formats and uniform blocks.
//!
//! Geometry is split across two vertex-buffer slots: slot 0 carries the
//! shared per-mesh positions, slot 1 the texture coordinates. Textured
//! entities get their own slot-1 buffer that is rewritten every frame with
//! the current animation frame's UVs; untextured draws bind the mesh's
//! static default.

use bytemuck::{Pod, Zeroable};

/// Slot 0: 2D position in local space.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct PositionVertex {
    pub position: [f32; 2],
}

impl PositionVertex {
    pub(crate) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PositionVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
    };
}

/// Slot 1: texture coordinate, v measured from the image top.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct TexCoordVertex {
    pub uv: [f32; 2],
}

impl TexCoordVertex {
    pub(crate) const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<TexCoordVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![1 => Float32x2],
    };
}

/// Group 0 uniform: the orthographic projection.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct CameraUniform {
    pub projection: [[f32; 4]; 4],
}

/// Group 1 uniform (dynamic offset): per-draw model matrix, flat color,
/// and the textured flag.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct ModelUniform {
    pub matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub use_texture: u32,
    pub _padding: [u32; 3],
}
