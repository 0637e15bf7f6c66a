//! Scene membership: the ordered set of top-level nodes that draw and
//! receive events.
//!
//! Activation is asymmetric. Adding a group sets the group's own
//! flag *and* every descendant leaf; intermediate group flags are left
//! alone. Bulk [`Scene::set_active`] only ever touches leaves, so a
//! top-level group that was deactivated wholesale keeps its own flag and
//! springs back fully when its leaves are re-activated.

use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

/// An ordered collection of top-level nodes. Order is draw order and
/// event-dispatch order.
#[derive(Debug, Default, Clone)]
pub struct Scene {
    members: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Members in insertion order. Stale handles are skipped by consumers,
    /// not eagerly pruned here.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    pub(crate) fn members(&self) -> &[NodeId] {
        &self.members
    }

    /// Adds a node and activates it: the node's own flag plus, for groups,
    /// every descendant leaf. Re-adding an existing member only re-runs
    /// the activation.
    pub fn add(&mut self, graph: &mut SceneGraph, id: NodeId) {
        let is_group = match graph.get_mut(id) {
            Some(node) => {
                node.set_active(true);
                node.is_group()
            }
            None => {
                log::warn!("scene add skipped: node {id} is not alive");
                return;
            }
        };
        if is_group {
            set_leaves_active(graph, id, true);
        }
        if !self.members.contains(&id) {
            self.members.push(id);
        }
    }

    /// Removes a node and deactivates it the same way `add` activates.
    pub fn remove(&mut self, graph: &mut SceneGraph, id: NodeId) {
        let is_group = match graph.get_mut(id) {
            Some(node) => {
                node.set_active(false);
                node.is_group()
            }
            None => false,
        };
        if is_group {
            set_leaves_active(graph, id, false);
        }
        self.members.retain(|&m| m != id);
    }

    /// Flips the active flag of every *leaf* reachable from the members.
    /// Top-level leaves are leaves too, so they are flipped directly;
    /// group flags at any level are untouched.
    pub fn set_active(&self, graph: &mut SceneGraph, active: bool) {
        for &member in &self.members {
            set_leaves_active(graph, member, active);
        }
    }
}

fn set_leaves_active(graph: &mut SceneGraph, id: NodeId, active: bool) {
    for leaf in graph.collect_leaves(id) {
        if let Some(node) = graph.get_mut(leaf) {
            node.set_active(active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::sprite::Shape;

    fn graph_with_group(graph: &mut SceneGraph) -> (NodeId, Vec<NodeId>) {
        let leaves: Vec<NodeId> = (0..3)
            .map(|i| graph.spawn_shape(Shape::quad().position(i as f32 * 20.0, 0.0, 0.0)))
            .collect();
        let group = graph.spawn_group(&leaves);
        (group, leaves)
    }

    #[test]
    fn add_activates_group_and_descendant_leaves() {
        let mut graph = SceneGraph::new();
        let (group, leaves) = graph_with_group(&mut graph);
        let mut scene = Scene::new();
        scene.add(&mut graph, group);
        assert!(graph.node(group).is_active());
        for leaf in &leaves {
            assert!(graph.node(*leaf).is_active());
        }
    }

    #[test]
    fn remove_then_readd_restores_all_leaves() {
        let mut graph = SceneGraph::new();
        let (group, leaves) = graph_with_group(&mut graph);
        let mut scene = Scene::new();
        scene.add(&mut graph, group);
        scene.remove(&mut graph, group);
        assert!(!graph.node(group).is_active());
        assert!(leaves.iter().all(|&l| !graph.node(l).is_active()));
        assert!(scene.is_empty());

        scene.add(&mut graph, group);
        assert!(graph.node(group).is_active());
        assert!(leaves.iter().all(|&l| graph.node(l).is_active()));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn readding_a_member_does_not_duplicate() {
        let mut graph = SceneGraph::new();
        let leaf = graph.spawn_shape(Shape::quad());
        let mut scene = Scene::new();
        scene.add(&mut graph, leaf);
        scene.add(&mut graph, leaf);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn intermediate_group_flags_are_skipped_by_bulk_toggle() {
        let mut graph = SceneGraph::new();
        let (group, leaves) = graph_with_group(&mut graph);
        let mut scene = Scene::new();
        scene.add(&mut graph, group);

        scene.set_active(&mut graph, false);
        // Leaves flipped, the top-level group flag untouched.
        assert!(leaves.iter().all(|&l| !graph.node(l).is_active()));
        assert!(graph.node(group).is_active());

        scene.set_active(&mut graph, true);
        assert!(leaves.iter().all(|&l| graph.node(l).is_active()));
    }

    #[test]
    fn bulk_toggle_flips_top_level_leaves() {
        let mut graph = SceneGraph::new();
        let leaf = graph.spawn_shape(Shape::quad());
        let mut scene = Scene::new();
        scene.add(&mut graph, leaf);
        scene.set_active(&mut graph, false);
        assert!(!graph.node(leaf).is_active());
    }

    #[test]
    fn adding_a_dead_node_is_skipped() {
        let mut graph = SceneGraph::new();
        let leaf = graph.spawn_shape(Shape::quad());
        graph.despawn(leaf);
        let mut scene = Scene::new();
        scene.add(&mut graph, leaf);
        assert!(scene.is_empty());
    }
}
