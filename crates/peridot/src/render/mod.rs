//! wgpu rendering: context, pipeline, stores, and the frame draw path.

pub mod camera;
pub(crate) mod draw;
pub mod gpu;
pub(crate) mod mesh;
pub(crate) mod pipeline;
#[cfg(feature = "text")]
pub(crate) mod text;
pub mod texture;
pub(crate) mod vertex;

pub use camera::Camera;
pub use gpu::GpuContext;
pub use mesh::MeshHandle;
pub use texture::TextureHandle;

use crate::render::mesh::MeshStore;
use crate::render::pipeline::QuadRenderer;
use crate::render::texture::TextureStore;

/// Everything that needs a live GPU context. Bundled so the window can
/// create it all at once when the surface comes up.
pub(crate) struct RenderState {
    pub renderer: QuadRenderer,
    pub meshes: MeshStore,
    pub textures: TextureStore,
    #[cfg(feature = "text")]
    pub fonts: text::FontStore,
}

impl RenderState {
    pub(crate) fn new(gpu: &GpuContext) -> Self {
        let renderer = QuadRenderer::new(gpu);
        let meshes = MeshStore::new(gpu);
        let textures = TextureStore::new(gpu, &renderer);
        Self {
            renderer,
            meshes,
            textures,
            #[cfg(feature = "text")]
            fonts: text::FontStore::new(),
        }
    }
}
