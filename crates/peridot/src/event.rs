//! Pointer and keyboard event routing.
//!
//! Listeners register against node handles (or key codes) and receive the
//! [`Context`] so they can mutate the world. Registering against a group
//! fans out to every descendant leaf under one [`ListenerId`], and removal
//! with that id strips the whole fan-out.
//!
//! Hit resolution walks the scene members in order. Clicks dispatch to
//! *every* active hit member; hover keeps a single slot and the **last**
//! hit member wins, with enter/leave firing only on the edge where the
//! hovered node changes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::app::Context;
use crate::math::Vec2;
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

/// Identifies one registration. Registering a group yields a single id
/// covering every leaf it fanned out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Cursor position in window coordinates, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

/// A pointer interaction, carrying both window and world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// `None` for pure movement.
    pub button: Option<MouseButton>,
    /// Window coordinates, origin top-left, y down.
    pub client: Vec2,
    /// World coordinates, origin at screen center, y up.
    pub world: Vec2,
}

type PointerCallback = Rc<RefCell<dyn FnMut(&mut Context, &PointerEvent, NodeId)>>;
type KeyCallback = Rc<RefCell<dyn FnMut(&mut Context, KeyCode)>>;

struct ClickEntry {
    id: ListenerId,
    callback: PointerCallback,
}

struct HoverEntry {
    id: ListenerId,
    enter: PointerCallback,
    leave: PointerCallback,
}

struct KeyEntry {
    id: ListenerId,
    callback: KeyCallback,
}

/// Routes window events to registered listeners.
pub struct EventRouter {
    click: HashMap<NodeId, Vec<ClickEntry>>,
    hover: HashMap<NodeId, Vec<HoverEntry>>,
    key_down: HashMap<KeyCode, Vec<KeyEntry>>,
    key_up: HashMap<KeyCode, Vec<KeyEntry>>,
    last_hovered: Option<NodeId>,
    detached: bool,
    next_listener: u64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            click: HashMap::new(),
            hover: HashMap::new(),
            key_down: HashMap::new(),
            key_up: HashMap::new(),
            last_hovered: None,
            detached: false,
            next_listener: 0,
        }
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        id
    }

    /// Leaves covered by a registration target: the node itself, or every
    /// descendant leaf when the target is a group.
    fn fan_out(nodes: &SceneGraph, target: NodeId) -> Vec<NodeId> {
        match nodes.get(target) {
            Some(node) if node.is_group() => nodes.collect_leaves(target),
            _ => vec![target],
        }
    }

    /// Registers a click listener. Group targets fan out to their leaves.
    pub fn add_click(
        &mut self,
        nodes: &SceneGraph,
        target: NodeId,
        callback: impl FnMut(&mut Context, &PointerEvent, NodeId) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        let callback: PointerCallback = Rc::new(RefCell::new(callback));
        for leaf in Self::fan_out(nodes, target) {
            self.click.entry(leaf).or_default().push(ClickEntry {
                id,
                callback: callback.clone(),
            });
        }
        id
    }

    /// Removes a click registration made against the same target.
    pub fn remove_click(&mut self, nodes: &SceneGraph, target: NodeId, id: ListenerId) {
        for leaf in Self::fan_out(nodes, target) {
            if let Some(entries) = self.click.get_mut(&leaf) {
                entries.retain(|e| e.id != id);
            }
        }
    }

    /// Registers an enter/leave listener pair. Group targets fan out.
    pub fn add_hover(
        &mut self,
        nodes: &SceneGraph,
        target: NodeId,
        enter: impl FnMut(&mut Context, &PointerEvent, NodeId) + 'static,
        leave: impl FnMut(&mut Context, &PointerEvent, NodeId) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        let enter: PointerCallback = Rc::new(RefCell::new(enter));
        let leave: PointerCallback = Rc::new(RefCell::new(leave));
        for leaf in Self::fan_out(nodes, target) {
            self.hover.entry(leaf).or_default().push(HoverEntry {
                id,
                enter: enter.clone(),
                leave: leave.clone(),
            });
        }
        id
    }

    pub fn remove_hover(&mut self, nodes: &SceneGraph, target: NodeId, id: ListenerId) {
        for leaf in Self::fan_out(nodes, target) {
            if let Some(entries) = self.hover.get_mut(&leaf) {
                entries.retain(|e| e.id != id);
            }
        }
    }

    pub fn add_key_down(
        &mut self,
        key: KeyCode,
        callback: impl FnMut(&mut Context, KeyCode) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.key_down.entry(key).or_default().push(KeyEntry {
            id,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    pub fn remove_key_down(&mut self, key: KeyCode, id: ListenerId) {
        if let Some(entries) = self.key_down.get_mut(&key) {
            entries.retain(|e| e.id != id);
        }
    }

    pub fn add_key_up(
        &mut self,
        key: KeyCode,
        callback: impl FnMut(&mut Context, KeyCode) + 'static,
    ) -> ListenerId {
        let id = self.next_id();
        self.key_up.entry(key).or_default().push(KeyEntry {
            id,
            callback: Rc::new(RefCell::new(callback)),
        });
        id
    }

    pub fn remove_key_up(&mut self, key: KeyCode, id: ListenerId) {
        if let Some(entries) = self.key_up.get_mut(&key) {
            entries.retain(|e| e.id != id);
        }
    }

    /// Drops every registration and stops dispatching. Idempotent; a
    /// detached router can keep receiving window events harmlessly.
    pub fn detach(&mut self) {
        self.click.clear();
        self.hover.clear();
        self.key_down.clear();
        self.key_up.clear();
        self.last_hovered = None;
        self.detached = true;
    }

    /// Window coordinates to world coordinates: origin moves to the
    /// screen center, y flips up, and the camera's stored (negated)
    /// position is subtracted. Zoom is not applied; see
    /// [`Camera`](crate::render::Camera).
    fn pointer_to_world(ctx: &Context, client: Vec2) -> Vec2 {
        let (width, height) = ctx.surface_size();
        let camera = ctx.camera.position();
        Vec2::new(
            client.x - width as f32 / 2.0 - camera.x,
            height as f32 / 2.0 - client.y - camera.y,
        )
    }

    /// Dispatches a button press at the current cursor position. Every
    /// active, hit scene member receives the event; within a group the
    /// resolved child is the callback's node argument.
    pub fn handle_pointer_press(&mut self, ctx: &mut Context, button: MouseButton) {
        if self.detached {
            return;
        }
        let client = Vec2::new(ctx.cursor.x, ctx.cursor.y);
        let event = PointerEvent {
            button: Some(button),
            client,
            world: Self::pointer_to_world(ctx, client),
        };

        let mut fire: Vec<(PointerCallback, NodeId)> = Vec::new();
        for member in ctx.scene.members().to_vec() {
            let Some(target) = Self::resolve_hit(&ctx.nodes, member, event.world) else {
                continue;
            };
            if let Some(entries) = self.click.get(&target) {
                for entry in entries {
                    fire.push((entry.callback.clone(), target));
                }
            }
        }

        for (callback, target) in fire {
            (callback.borrow_mut())(ctx, &event, target);
        }
    }

    /// Updates the hover slot from a cursor move and fires enter/leave on
    /// the edge. The last hit member in scene order wins the slot.
    pub fn handle_cursor_moved(&mut self, ctx: &mut Context, x: f32, y: f32) {
        if self.detached {
            return;
        }
        let client = Vec2::new(x, y);
        let event = PointerEvent {
            button: None,
            client,
            world: Self::pointer_to_world(ctx, client),
        };

        let mut hovered = None;
        for member in ctx.scene.members().to_vec() {
            if let Some(target) = Self::resolve_hit(&ctx.nodes, member, event.world) {
                hovered = Some(target);
            }
        }

        if hovered == self.last_hovered {
            return;
        }

        let mut fire: Vec<(PointerCallback, NodeId)> = Vec::new();
        if let Some(previous) = self.last_hovered
            && ctx.nodes.get(previous).is_some_and(|n| n.is_active())
            && let Some(entries) = self.hover.get(&previous)
        {
            for entry in entries {
                fire.push((entry.leave.clone(), previous));
            }
        }
        if let Some(current) = hovered
            && let Some(entries) = self.hover.get(&current)
        {
            for entry in entries {
                fire.push((entry.enter.clone(), current));
            }
        }
        self.last_hovered = hovered;

        for (callback, target) in fire {
            (callback.borrow_mut())(ctx, &event, target);
        }
    }

    /// Dispatches a key press or release to the matching listeners.
    pub fn handle_key(&mut self, ctx: &mut Context, key: KeyCode, pressed: bool) {
        if self.detached {
            return;
        }
        let map = if pressed { &self.key_down } else { &self.key_up };
        let fire: Vec<KeyCallback> = map
            .get(&key)
            .map(|entries| entries.iter().map(|e| e.callback.clone()).collect())
            .unwrap_or_default();
        for callback in fire {
            (callback.borrow_mut())(ctx, key);
        }
    }

    /// Hit target for one scene member: the member itself for a leaf, or
    /// the resolved first-level child for a group. Inactive members and
    /// text never hit.
    fn resolve_hit(nodes: &SceneGraph, member: NodeId, world: Vec2) -> Option<NodeId> {
        let node = nodes.get(member)?;
        if !node.is_active() || node.is_text() {
            return None;
        }
        if node.is_group() {
            let target = nodes.point_in_children(member, world.x, world.y)?;
            if nodes.get(target).is_some_and(|n| n.is_active()) {
                Some(target)
            } else {
                None
            }
        } else if nodes.point_in_node(member, world.x, world.y) {
            Some(member)
        } else {
            None
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::scene::sprite::Shape;
    use std::cell::Cell;

    fn test_ctx() -> Context {
        Context::new((800, 600), Color::BLACK)
    }

    /// Window coordinates for a world point, camera at origin.
    fn client(world_x: f32, world_y: f32) -> (f32, f32) {
        (world_x + 400.0, 300.0 - world_y)
    }

    fn spawn_active(ctx: &mut Context, x: f32, y: f32) -> NodeId {
        let id = ctx
            .nodes
            .spawn_shape(Shape::quad().position(x, y, 0.0).size(20.0, 20.0));
        ctx.scene.add(&mut ctx.nodes, id);
        id
    }

    #[test]
    fn click_hits_and_misses() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 0.0, 0.0);

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        router.add_click(&ctx.nodes, node, move |_, _, _| seen.set(seen.get() + 1));

        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(hits.get(), 1);

        let (cx, cy) = client(50.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn click_conversion_subtracts_camera_offset() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 100.0, 0.0);

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        router.add_click(&ctx.nodes, node, move |_, _, _| seen.set(seen.get() + 1));

        // Camera at +100 stores -100; the node at world x=100 sits at the
        // screen center.
        ctx.camera.set_position(100.0, 0.0, 0.0);
        ctx.cursor = CursorPosition { x: 400.0, y: 300.0 };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn inactive_members_do_not_dispatch() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 0.0, 0.0);

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        router.add_click(&ctx.nodes, node, move |_, _, _| seen.set(seen.get() + 1));

        ctx.nodes.node_mut(node).set_active(false);
        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn every_overlapping_member_receives_the_click() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let a = spawn_active(&mut ctx, 0.0, 0.0);
        let b = spawn_active(&mut ctx, 0.0, 0.0);

        let order = Rc::new(RefCell::new(Vec::new()));
        for id in [a, b] {
            let seen = order.clone();
            router.add_click(&ctx.nodes, id, move |_, _, target| {
                seen.borrow_mut().push(target)
            });
        }

        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(*order.borrow(), vec![a, b]);
    }

    #[test]
    fn group_click_resolves_the_inner_child() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let a = ctx
            .nodes
            .spawn_shape(Shape::quad().position(-30.0, 0.0, 0.0).size(20.0, 20.0));
        let b = ctx
            .nodes
            .spawn_shape(Shape::quad().position(30.0, 0.0, 0.0).size(20.0, 20.0));
        let group = ctx.nodes.spawn_group(&[a, b]);
        ctx.scene.add(&mut ctx.nodes, group);

        let clicked = Rc::new(RefCell::new(Vec::new()));
        let seen = clicked.clone();
        // One registration on the group covers both leaves.
        router.add_click(&ctx.nodes, group, move |_, _, target| {
            seen.borrow_mut().push(target)
        });

        let (cx, cy) = client(30.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(*clicked.borrow(), vec![b]);
    }

    #[test]
    fn hover_fires_enter_and_leave_on_the_edge_only() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 0.0, 0.0);

        let enters = Rc::new(Cell::new(0));
        let leaves = Rc::new(Cell::new(0));
        let (e, l) = (enters.clone(), leaves.clone());
        router.add_hover(
            &ctx.nodes,
            node,
            move |_, _, _| e.set(e.get() + 1),
            move |_, _, _| l.set(l.get() + 1),
        );

        let (cx, cy) = client(0.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!((enters.get(), leaves.get()), (1, 0));

        // Still inside: no re-fire.
        let (cx, cy) = client(3.0, 3.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!((enters.get(), leaves.get()), (1, 0));

        let (cx, cy) = client(50.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!((enters.get(), leaves.get()), (1, 1));

        let (cx, cy) = client(0.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!((enters.get(), leaves.get()), (2, 1));
    }

    #[test]
    fn hover_moving_between_members_swaps_in_one_event() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let a = spawn_active(&mut ctx, -10.0, 0.0);
        let b = spawn_active(&mut ctx, 50.0, 0.0);

        let log = Rc::new(RefCell::new(Vec::new()));
        for (id, name) in [(a, "a"), (b, "b")] {
            let enter_log = log.clone();
            let leave_log = log.clone();
            router.add_hover(
                &ctx.nodes,
                id,
                move |_, _, _| enter_log.borrow_mut().push(format!("enter {name}")),
                move |_, _, _| leave_log.borrow_mut().push(format!("leave {name}")),
            );
        }

        let (cx, cy) = client(-10.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        let (cx, cy) = client(50.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!(*log.borrow(), vec!["enter a", "leave a", "enter b"]);
    }

    #[test]
    fn last_member_in_order_wins_the_hover_slot() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let a = spawn_active(&mut ctx, 0.0, 0.0);
        let b = spawn_active(&mut ctx, 0.0, 0.0);

        let hovered = Rc::new(RefCell::new(Vec::new()));
        for id in [a, b] {
            let seen = hovered.clone();
            router.add_hover(
                &ctx.nodes,
                id,
                move |_, _, target| seen.borrow_mut().push(target),
                |_, _, _| {},
            );
        }

        let (cx, cy) = client(0.0, 0.0);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        assert_eq!(*hovered.borrow(), vec![b]);
    }

    #[test]
    fn removal_by_id_strips_a_group_fan_out() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let a = ctx
            .nodes
            .spawn_shape(Shape::quad().position(0.0, 0.0, 0.0).size(20.0, 20.0));
        let group = ctx.nodes.spawn_group(&[a]);
        ctx.scene.add(&mut ctx.nodes, group);

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        let id = router.add_click(&ctx.nodes, group, move |_, _, _| seen.set(seen.get() + 1));
        router.remove_click(&ctx.nodes, group, id);

        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn detach_is_idempotent_and_silences_dispatch() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 0.0, 0.0);

        let hits = Rc::new(Cell::new(0));
        let seen = hits.clone();
        router.add_click(&ctx.nodes, node, move |_, _, _| seen.set(seen.get() + 1));

        router.detach();
        router.detach();

        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        router.handle_cursor_moved(&mut ctx, cx, cy);
        router.handle_key(&mut ctx, KeyCode::Space, true);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn key_listeners_fire_for_their_edge() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();

        let downs = Rc::new(Cell::new(0));
        let ups = Rc::new(Cell::new(0));
        let (d, u) = (downs.clone(), ups.clone());
        router.add_key_down(KeyCode::ArrowLeft, move |_, _| d.set(d.get() + 1));
        router.add_key_up(KeyCode::ArrowLeft, move |_, _| u.set(u.get() + 1));

        router.handle_key(&mut ctx, KeyCode::ArrowLeft, true);
        router.handle_key(&mut ctx, KeyCode::ArrowLeft, false);
        router.handle_key(&mut ctx, KeyCode::ArrowRight, true);
        assert_eq!((downs.get(), ups.get()), (1, 1));
    }

    #[test]
    fn listeners_can_mutate_the_world() {
        let mut ctx = test_ctx();
        let mut router = EventRouter::new();
        let node = spawn_active(&mut ctx, 0.0, 0.0);

        router.add_click(&ctx.nodes, node, |ctx, _, target| {
            ctx.nodes.node_mut(target).set_position(99.0, 0.0, 0.0);
        });

        let (cx, cy) = client(0.0, 0.0);
        ctx.cursor = CursorPosition { x: cx, y: cy };
        router.handle_pointer_press(&mut ctx, MouseButton::Left);
        assert_eq!(ctx.nodes.node(node).position().x, 99.0);
    }
}
