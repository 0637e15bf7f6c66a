//! # Peridot — Minimal 2D Scene-Graph Engine
//!
//! A small 2D engine over wgpu: a scene graph of sprites, shapes, text,
//! and groups, with pointer hit testing and event routing, sprite-sheet
//! animation, asynchronous asset loading with hot-reload, and named audio
//! playback.
//!
//! Start with `use peridot::prelude::*` and build an [`App`](app::App).

pub mod animation;
pub mod app;
pub mod asset;
pub mod color;
pub mod event;
pub mod math;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;

#[cfg(feature = "audio")]
pub mod audio;
