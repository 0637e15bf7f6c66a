//! Spawn descriptors for drawable nodes.
//!
//! Builders capture everything the scene graph needs to construct a leaf;
//! texture and font bytes resolve asynchronously through the asset loader.

use crate::color::Color;
use crate::math::{Vec2, Vec3};

/// Built-in mesh for untextured (or textured) flat entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Quad,
    /// Apex up: vertices `(0, 1)`, `(1, -1)`, `(-1, -1)` in local space.
    Triangle,
}

/// A textured quad, optionally animated from a sprite sheet.
///
/// `size` is the full on-screen size; the node stores half-extents. Frame
/// dimensions of zero mean the whole texture is one static image.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub texture: String,
    pub position: Vec3,
    pub size: Vec2,
    pub rotation: Vec3,
    pub color: Color,
    pub mirrored: bool,
    pub frame_width: f32,
    pub frame_height: f32,
    pub frames_per_row: u32,
    pub total_frames: u32,
    pub speed_ms: f64,
    pub autoplay: bool,
}

impl Sprite {
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            position: Vec3::ZERO,
            size: Vec2::splat(100.0),
            rotation: Vec3::ZERO,
            color: Color::WHITE,
            mirrored: false,
            frame_width: 0.0,
            frame_height: 0.0,
            frames_per_row: 1,
            total_frames: 1,
            speed_ms: 100.0,
            // Textured sprites animate as soon as frames exist.
            autoplay: true,
        }
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sprite-sheet layout: per-frame pixel size, frames per row, and the
    /// total frame count.
    pub fn frames(mut self, width: f32, height: f32, per_row: u32, total: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self.frames_per_row = per_row;
        self.total_frames = total;
        self
    }

    pub fn speed_ms(mut self, speed_ms: f64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn mirrored(mut self) -> Self {
        self.mirrored = true;
        self
    }
}

/// A flat colored shape, optionally textured.
///
/// Unlike [`Sprite`], shapes default to `autoplay = false`.
#[derive(Debug, Clone)]
pub struct Shape {
    pub kind: ShapeKind,
    pub texture: Option<String>,
    pub position: Vec3,
    pub size: Vec2,
    pub rotation: Vec3,
    pub color: Color,
    pub frame_width: f32,
    pub frame_height: f32,
    pub frames_per_row: u32,
    pub total_frames: u32,
    pub speed_ms: f64,
    pub autoplay: bool,
}

impl Shape {
    pub fn quad() -> Self {
        Self::new(ShapeKind::Quad)
    }

    pub fn triangle() -> Self {
        Self::new(ShapeKind::Triangle)
    }

    fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            texture: None,
            position: Vec3::ZERO,
            size: Vec2::splat(100.0),
            rotation: Vec3::ZERO,
            color: Color::WHITE,
            frame_width: 0.0,
            frame_height: 0.0,
            frames_per_row: 1,
            total_frames: 1,
            speed_ms: 100.0,
            autoplay: false,
        }
    }

    pub fn texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Vec2::new(width, height);
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn frames(mut self, width: f32, height: f32, per_row: u32, total: u32) -> Self {
        self.frame_width = width;
        self.frame_height = height;
        self.frames_per_row = per_row;
        self.total_frames = total;
        self
    }

    pub fn speed_ms(mut self, speed_ms: f64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    pub fn autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

/// A text label. Rasterized to an exact-size bitmap once its font loads.
///
/// `scale` multiplies the bitmap's pixel dimensions; the quad is anchored
/// at the position's bottom-left corner. Labels never participate in hit
/// testing and, unlike other nodes, spawn active.
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub font: String,
    pub px: f32,
    pub position: Vec3,
    pub scale: Vec2,
    pub color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>, font: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: font.into(),
            px: 32.0,
            position: Vec3::ZERO,
            scale: Vec2::ONE,
            color: Color::WHITE,
        }
    }

    pub fn px(mut self, px: f32) -> Self {
        self.px = px;
        self
    }

    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vec2::new(x, y);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}
