//! Node handles and payloads.
//!
//! A [`NodeId`] is an index plus a generation. Slots are recycled through a
//! free list; the generation bump makes handles to despawned nodes stale
//! rather than silently aliasing the new occupant.

use std::fmt;

use crate::animation::AnimationState;
use crate::color::Color;
use crate::math::{Transform, Vec2, Vec3};
use crate::render::mesh::TexCoordHandle;
use crate::render::texture::TextureHandle;
use crate::scene::sprite::ShapeKind;

/// Handle to a node in a [`SceneGraph`](crate::scene::SceneGraph).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl NodeId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Generational slot allocator backing the scene graph.
#[derive(Debug, Default)]
pub(crate) struct NodeAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
    len: u32,
}

impl NodeAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate(&mut self) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            NodeId {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Returns `false` for stale or double-freed handles.
    pub(crate) fn deallocate(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.generations[id.index as usize] += 1;
        self.free_list.push(id.index);
        self.len -= 1;
        true
    }

    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        self.generations
            .get(id.index as usize)
            .is_some_and(|g| *g == id.generation)
    }

    pub(crate) fn alive_count(&self) -> u32 {
        self.len
    }

    pub(crate) fn generation(&self, index: usize) -> u32 {
        self.generations.get(index).copied().unwrap_or(0)
    }
}

/// Payload of a node: either a drawable entity or a grouping of children.
pub enum NodeKind {
    Leaf(Entity),
    Group(Group),
}

/// Text content carried by a label entity. The backing bitmap is
/// re-rasterized when `dirty` is set.
#[derive(Debug, Clone)]
pub struct TextPayload {
    pub(crate) content: String,
    pub(crate) font: String,
    pub(crate) px: f32,
    pub(crate) scale: Vec2,
    pub(crate) dirty: bool,
}

impl TextPayload {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font(&self) -> &str {
        &self.font
    }
}

/// A drawable leaf: shape or sprite, optionally carrying text.
pub struct Entity {
    pub(crate) shape: ShapeKind,
    pub(crate) color: Color,
    pub(crate) use_texture: bool,
    pub(crate) mirrored: bool,
    pub(crate) texture_path: Option<String>,
    pub(crate) texture: Option<TextureHandle>,
    pub(crate) original_texture: Option<TextureHandle>,
    pub(crate) texture_size: Vec2,
    pub(crate) texcoords: Option<TexCoordHandle>,
    pub(crate) animation: AnimationState,
    pub(crate) text: Option<TextPayload>,
}

impl Entity {
    pub fn color(&self) -> Color {
        self.color
    }

    /// For text entities this also schedules a re-rasterization.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        if let Some(text) = &mut self.text {
            text.dirty = true;
        }
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }

    pub fn texture_path(&self) -> Option<&str> {
        self.texture_path.as_deref()
    }

    /// Pixel dimensions of the bound texture, zero until it resolves.
    pub fn texture_size(&self) -> Vec2 {
        self.texture_size
    }

    pub fn text(&self) -> Option<&TextPayload> {
        self.text.as_ref()
    }

    /// Replaces the text content and schedules a re-rasterization. No-op
    /// with a warning on non-text entities.
    pub fn set_text(&mut self, content: &str) {
        match &mut self.text {
            Some(text) => {
                if text.content != content {
                    text.content = content.to_owned();
                    text.dirty = true;
                }
            }
            None => log::warn!("set_text called on an entity without a text payload"),
        }
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut AnimationState {
        &mut self.animation
    }

    /// See [`AnimationState::set_frame`].
    pub fn set_frame(&mut self, frame: u32) {
        self.animation.set_frame(frame);
    }

    /// See [`AnimationState::play`].
    pub fn play_animation(
        &mut self,
        sequence: Vec<u32>,
        speed_ms: f64,
    ) -> Result<(), crate::animation::AnimationError> {
        self.animation.play(sequence, speed_ms)
    }

    /// See [`AnimationState::play_once`].
    pub fn play_animation_once(
        &mut self,
        sequence: Vec<u32>,
        revert: Option<Vec<u32>>,
        speed_ms: f64,
        on_complete: Option<Box<dyn FnMut()>>,
    ) -> Result<(), crate::animation::AnimationError> {
        self.animation.play_once(sequence, revert, speed_ms, on_complete)
    }

    /// Stops playback, rewinds to frame 0, and restores the texture that
    /// was bound at load time (undoing any runtime texture swap).
    pub fn stop_animation(&mut self) {
        self.animation.stop();
        self.texture = self.original_texture;
    }

    /// Swaps the bound texture at runtime. `stop_animation` restores the
    /// original.
    pub fn set_texture(&mut self, texture: TextureHandle, size: Vec2) {
        self.texture = Some(texture);
        self.texture_size = size;
    }
}

/// Ordered children of a group node.
#[derive(Debug, Default)]
pub struct Group {
    pub(crate) children: Vec<NodeId>,
}

impl Group {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// A scene-graph node: transform, active flag, parent link, payload.
pub struct Node {
    pub(crate) transform: Transform,
    pub(crate) active: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group(_))
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(&self.kind, NodeKind::Leaf(e) if e.is_text())
    }

    /// Whether this node participates in drawing and event routing.
    /// Nodes spawn inactive and are activated by scene membership; text
    /// nodes are the exception and spawn active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.transform.position = Vec3::new(x, y, z);
    }

    /// Half-extents of the node.
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Assigns the x/y half-extents verbatim; unlike spawning from a full
    /// size, no halving happens here.
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.transform.scale.x = x;
        self.transform.scale.y = y;
    }

    /// Stored Euler angles in radians.
    pub fn rotation(&self) -> Vec3 {
        self.transform.rotation
    }

    /// Sets the z rotation. The angle is negated on storage so that
    /// positive input reads as clockwise on screen.
    pub fn set_rotation(&mut self, radians: f32) {
        self.transform.rotation.z = -radians;
    }

    pub fn entity(&self) -> Option<&Entity> {
        match &self.kind {
            NodeKind::Leaf(e) => Some(e),
            NodeKind::Group(_) => None,
        }
    }

    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        match &mut self.kind {
            NodeKind::Leaf(e) => Some(e),
            NodeKind::Group(_) => None,
        }
    }

    pub fn group(&self) -> Option<&Group> {
        match &self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Leaf(_) => None,
        }
    }

    pub(crate) fn group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            NodeKind::Group(g) => Some(g),
            NodeKind::Leaf(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = NodeAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        assert_eq!((a.index(), a.generation()), (0, 0));
        assert_eq!((b.index(), b.generation()), (1, 0));
        assert_eq!(alloc.alive_count(), 2);
    }

    #[test]
    fn recycle_bumps_generation() {
        let mut alloc = NodeAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        let b = alloc.allocate();
        assert_eq!(b.index(), a.index());
        assert_eq!(b.generation(), a.generation() + 1);
    }

    #[test]
    fn stale_handle_detected() {
        let mut alloc = NodeAllocator::new();
        let a = alloc.allocate();
        alloc.deallocate(a);
        let _b = alloc.allocate();
        assert!(!alloc.is_alive(a));
    }

    #[test]
    fn double_free_returns_false() {
        let mut alloc = NodeAllocator::new();
        let a = alloc.allocate();
        assert!(alloc.deallocate(a));
        assert!(!alloc.deallocate(a));
        assert_eq!(alloc.alive_count(), 0);
    }

    #[test]
    fn display_is_compact() {
        let mut alloc = NodeAllocator::new();
        let a = alloc.allocate();
        alloc.deallocate(a);
        let b = alloc.allocate();
        assert_eq!(format!("{b}"), "0v1");
        assert_eq!(format!("{b:?}"), "NodeId(0v1)");
    }
}
