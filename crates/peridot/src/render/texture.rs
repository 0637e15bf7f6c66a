//! GPU texture storage.
//!
//! Handles are indices into a grow-only entry list; index 0 is a 1×1 white
//! default so untextured draws always have a valid bind group. Disk-loaded
//! images are cached by path, and hot-reload swaps an entry in place so
//! every node holding the handle sees the new pixels next frame.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::render::gpu::GpuContext;
use crate::render::pipeline::QuadRenderer;

/// Handle to a loaded GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// Sampler choice for an uploaded texture. Sprites sample nearest to keep
/// pixel art crisp; text bitmaps sample linear so scaled glyphs stay smooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextureFilter {
    Nearest,
    Linear,
}

/// Internal entry for a loaded GPU texture.
pub(crate) struct TextureEntry {
    pub bind_group: wgpu::BindGroup,
}

/// Stores all loaded GPU textures and their bind groups.
pub(crate) struct TextureStore {
    entries: Vec<TextureEntry>,
    path_cache: HashMap<String, TextureHandle>,
}

impl TextureStore {
    /// Create a new store with a 1x1 white default texture at index 0.
    pub fn new(gpu: &GpuContext, renderer: &QuadRenderer) -> Self {
        let default_entry = create_entry(
            gpu,
            renderer,
            TextureFilter::Nearest,
            "white 1x1",
            1,
            1,
            &[255u8, 255, 255, 255],
        );
        Self {
            entries: vec![default_entry],
            path_cache: HashMap::new(),
        }
    }

    /// The default 1x1 white texture handle.
    pub fn default_handle(&self) -> TextureHandle {
        TextureHandle(0)
    }

    pub fn get(&self, handle: TextureHandle) -> &TextureEntry {
        &self.entries[handle.0]
    }

    /// Handle previously bound to a path, if the image already uploaded.
    pub fn cached(&self, path: &str) -> Option<TextureHandle> {
        self.path_cache.get(path).copied()
    }

    /// Upload RGBA8 pixels and return a fresh handle.
    pub fn insert(
        &mut self,
        gpu: &GpuContext,
        renderer: &QuadRenderer,
        filter: TextureFilter,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> TextureHandle {
        let entry = create_entry(gpu, renderer, filter, label, width, height, data);
        self.entries.push(entry);
        TextureHandle(self.entries.len() - 1)
    }

    /// Upload a disk image and remember its path for reuse and hot-reload.
    pub fn insert_from_path(
        &mut self,
        gpu: &GpuContext,
        renderer: &QuadRenderer,
        path: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> TextureHandle {
        let handle = self.insert(gpu, renderer, TextureFilter::Nearest, path, width, height, data);
        self.path_cache.insert(path.to_owned(), handle);
        handle
    }

    /// Replace the GPU data for an existing handle (hot-reload). Any node
    /// referencing this handle sees the new texture next frame.
    pub fn reload_entry(
        &mut self,
        gpu: &GpuContext,
        renderer: &QuadRenderer,
        handle: TextureHandle,
        width: u32,
        height: u32,
        data: &[u8],
    ) {
        self.entries[handle.0] = create_entry(
            gpu,
            renderer,
            TextureFilter::Nearest,
            "hot-reload texture",
            width,
            height,
            data,
        );
    }
}

fn create_entry(
    gpu: &GpuContext,
    renderer: &QuadRenderer,
    filter: TextureFilter,
    label: &str,
    width: u32,
    height: u32,
    data: &[u8],
) -> TextureEntry {
    let texture = gpu.device.create_texture_with_data(
        &gpu.queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        data,
    );

    let sampler = match filter {
        TextureFilter::Nearest => &renderer.sprite_sampler,
        TextureFilter::Linear => &renderer.text_sampler,
    };

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout: &renderer.texture_bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });

    TextureEntry { bind_group }
}
