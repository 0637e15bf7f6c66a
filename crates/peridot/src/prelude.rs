//! Convenience re-exports — `use peridot::prelude::*` for the common items.

pub use crate::animation::{AnimationError, AnimationMode, AnimationState};
pub use crate::app::{App, Context};
pub use crate::asset::AssetLoader;
pub use crate::color::Color;
pub use crate::event::{
    CursorPosition, EventRouter, KeyCode, ListenerId, MouseButton, PointerEvent,
};
pub use crate::math::{Aabb, Mat4, Transform, Vec2, Vec3, Vec4};
pub use crate::render::{Camera, TextureHandle};
pub use crate::scene::{
    Entity, Node, NodeId, Scene, SceneError, SceneGraph, Shape, ShapeKind, Sprite,
};
pub use crate::time::Time;

#[cfg(feature = "text")]
pub use crate::scene::Label;

#[cfg(feature = "audio")]
pub use crate::audio::{AudioError, AudioManager};
