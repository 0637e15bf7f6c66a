//! Frame rendering: walk the scene into draw commands, then issue one
//! render pass with a dynamic-offset model uniform per draw.
//!
//! The walk is also where sprite animation advances. Frames tick only for
//! textured leaves that actually reach the draw path, so sprites outside
//! the active scene freeze and resume rather than running in the
//! background.

use glam::{Mat4, Vec3};

use crate::app::Context;
use crate::render::gpu::GpuContext;
use crate::render::mesh::{MeshHandle, TexCoordHandle};
use crate::render::texture::TextureHandle;
use crate::render::vertex::{CameraUniform, ModelUniform, TexCoordVertex};
use crate::render::RenderState;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{NodeId, NodeKind};
use crate::scene::sprite::ShapeKind;

struct DrawCmd {
    mesh: MeshHandle,
    matrix: Mat4,
    color: [f32; 4],
    use_texture: bool,
    texture: TextureHandle,
    texcoords: Option<TexCoordHandle>,
    uvs: Option<Vec<TexCoordVertex>>,
}

/// Renders the active scene. Surface errors bubble up to the event loop,
/// which decides between reconfigure and exit.
pub(crate) fn render_scene(
    ctx: &mut Context,
    gpu: &GpuContext,
    state: &mut RenderState,
) -> Result<(), wgpu::SurfaceError> {
    let now_ms = ctx.time.elapsed_ms();
    let view = ctx.camera.view_matrix();
    let background = ctx.background;
    let (width, height) = gpu.surface_size();
    let projection = ctx.camera.projection(width, height);

    let mut cmds = Vec::new();
    let members: Vec<NodeId> = ctx.scene.members().to_vec();
    for member in members {
        collect_node(&mut ctx.nodes, member, view, now_ms, gpu, state, &mut cmds);
    }

    // Per-entity texcoord rewrites queue before the pass is submitted.
    for cmd in &cmds {
        if let (Some(handle), Some(uvs)) = (cmd.texcoords, &cmd.uvs) {
            state.meshes.write_texcoords(gpu, handle, uvs);
        }
    }

    gpu.queue.write_buffer(
        &state.renderer.projection_buffer,
        0,
        bytemuck::cast_slice(&[CameraUniform {
            projection: projection.to_cols_array_2d(),
        }]),
    );

    let stride = state
        .renderer
        .ensure_model_capacity(&gpu.device, cmds.len().max(1));
    let mut model_data = vec![0u8; stride as usize * cmds.len().max(1)];
    for (i, cmd) in cmds.iter().enumerate() {
        let uniform = ModelUniform {
            matrix: cmd.matrix.to_cols_array_2d(),
            color: cmd.color,
            use_texture: cmd.use_texture as u32,
            _padding: [0; 3],
        };
        let offset = i * stride as usize;
        model_data[offset..offset + std::mem::size_of::<ModelUniform>()]
            .copy_from_slice(bytemuck::bytes_of(&uniform));
    }
    gpu.queue
        .write_buffer(&state.renderer.model_buffer, 0, &model_data);

    let frame = gpu.surface.get_current_texture()?;
    let target = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });

    {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target,
                depth_slice: None,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&state.renderer.pipeline);
        pass.set_bind_group(0, &state.renderer.projection_bind_group, &[]);

        for (i, cmd) in cmds.iter().enumerate() {
            let offset = i as u32 * stride;
            pass.set_bind_group(1, &state.renderer.model_bind_group, &[offset]);
            pass.set_bind_group(2, &state.textures.get(cmd.texture).bind_group, &[]);

            let mesh = state.meshes.mesh(cmd.mesh);
            pass.set_vertex_buffer(0, mesh.positions.slice(..));
            match cmd.texcoords {
                Some(handle) => {
                    pass.set_vertex_buffer(1, state.meshes.texcoords(handle).slice(..))
                }
                None => pass.set_vertex_buffer(1, mesh.default_texcoords.slice(..)),
            }
            pass.draw(0..mesh.vertex_count, 0..1);
        }
    }

    gpu.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

fn collect_node(
    nodes: &mut SceneGraph,
    id: NodeId,
    parent: Mat4,
    now_ms: f64,
    gpu: &GpuContext,
    state: &mut RenderState,
    cmds: &mut Vec<DrawCmd>,
) {
    let Some(node) = nodes.get(id) else { return };
    match &node.kind {
        NodeKind::Group(group) => {
            let matrix = parent * node.transform.matrix();
            let children = group.children.clone();
            for child in children {
                collect_node(nodes, child, matrix, now_ms, gpu, state, cmds);
            }
        }
        NodeKind::Leaf(_) => collect_leaf(nodes, id, parent, now_ms, gpu, state, cmds),
    }
}

fn collect_leaf(
    nodes: &mut SceneGraph,
    id: NodeId,
    parent: Mat4,
    now_ms: f64,
    gpu: &GpuContext,
    state: &mut RenderState,
    cmds: &mut Vec<DrawCmd>,
) {
    let Some(node) = nodes.get_mut(id) else { return };
    let transform = *node.transform();
    let active = node.is_active();
    let Some(entity) = node.entity_mut() else { return };

    if let Some(text) = &entity.text {
        // Text waits for its rasterized bitmap and honors the active flag.
        if !active {
            return;
        }
        let Some(texture) = entity.texture else { return };
        let scale = text.scale;
        let size = entity.texture_size;
        let matrix = parent
            * Mat4::from_translation(transform.position)
            * Mat4::from_rotation_x(transform.rotation.x)
            * Mat4::from_rotation_y(transform.rotation.y)
            * Mat4::from_rotation_z(transform.rotation.z)
            * Mat4::from_scale(Vec3::new(size.x * scale.x, size.y * scale.y, 1.0));
        cmds.push(DrawCmd {
            mesh: MeshHandle::TEXT_QUAD,
            matrix,
            color: entity.color.to_array(),
            use_texture: true,
            texture,
            texcoords: None,
            uvs: None,
        });
        return;
    }

    let mesh = MeshHandle::for_shape(entity.shape);
    let matrix = parent * transform.matrix();
    let color = entity.color.to_array();

    if entity.use_texture
        && let Some(texture) = entity.texture
    {
        let size = entity.texture_size;
        entity.animation.advance(now_ms);
        let rect = entity.animation.frame_rect(size.x, size.y);
        let (u_left, u_right) = if entity.mirrored {
            (rect.u_max, rect.u_min)
        } else {
            (rect.u_min, rect.u_max)
        };
        let uvs = match entity.shape {
            ShapeKind::Quad => vec![
                TexCoordVertex { uv: [u_right, rect.v_min] },
                TexCoordVertex { uv: [u_left, rect.v_min] },
                TexCoordVertex { uv: [u_right, rect.v_max] },
                TexCoordVertex { uv: [u_left, rect.v_max] },
            ],
            ShapeKind::Triangle => vec![
                TexCoordVertex { uv: [(u_left + u_right) / 2.0, rect.v_min] },
                TexCoordVertex { uv: [u_right, rect.v_max] },
                TexCoordVertex { uv: [u_left, rect.v_max] },
            ],
        };
        let texcoords = match entity.texcoords {
            Some(handle) => handle,
            None => {
                let handle = state.meshes.create_texcoords(gpu);
                entity.texcoords = Some(handle);
                handle
            }
        };
        cmds.push(DrawCmd {
            mesh,
            matrix,
            color,
            use_texture: true,
            texture,
            texcoords: Some(texcoords),
            uvs: Some(uvs),
        });
    } else {
        // Untextured, or the texture has not resolved yet: flat color.
        cmds.push(DrawCmd {
            mesh,
            matrix,
            color,
            use_texture: false,
            texture: state.textures.default_handle(),
            texcoords: None,
            uvs: None,
        });
    }
}
