//! Scene graph, node payloads, and scene membership.

pub mod graph;
pub mod node;
pub mod scene;
pub mod sprite;

pub use graph::{SceneError, SceneGraph};
pub use node::{Entity, Group, Node, NodeId, NodeKind, TextPayload};
pub use scene::Scene;
pub use sprite::{Label, Shape, ShapeKind, Sprite};
