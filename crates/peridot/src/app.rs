//! Application builder and the per-tick [`Context`].

use crate::asset::AssetLoader;
#[cfg(feature = "audio")]
use crate::audio::AudioManager;
use crate::color::Color;
use crate::event::{CursorPosition, EventRouter};
use crate::render::camera::Camera;
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;
use crate::scene::scene::Scene;
#[cfg(feature = "text")]
use crate::scene::sprite::Label;
use crate::scene::sprite::{Shape, Sprite};
use crate::time::Time;
use crate::window::WinitApp;

/// Everything a game touches each tick: the node arena, the active scene,
/// camera, asset loader, audio, and timing. Handed to setup and update
/// callbacks alongside the [`EventRouter`].
pub struct Context {
    pub nodes: SceneGraph,
    pub scene: Scene,
    pub camera: Camera,
    pub assets: AssetLoader,
    #[cfg(feature = "audio")]
    pub audio: AudioManager,
    pub time: Time,
    pub background: Color,
    pub cursor: CursorPosition,
    pub(crate) surface_size: (u32, u32),
    pub(crate) exit_requested: bool,
}

impl Context {
    pub(crate) fn new(surface_size: (u32, u32), background: Color) -> Self {
        Self {
            nodes: SceneGraph::new(),
            scene: Scene::new(),
            camera: Camera::new(),
            assets: AssetLoader::new(),
            #[cfg(feature = "audio")]
            audio: AudioManager::new(),
            time: Time::new(),
            background,
            cursor: CursorPosition::default(),
            surface_size,
            exit_requested: false,
        }
    }

    /// Current surface size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    /// Swaps in a new active scene, returning the previous one. Node
    /// active flags are untouched; callers add/remove through the scenes.
    pub fn set_scene(&mut self, scene: Scene) -> Scene {
        std::mem::replace(&mut self.scene, scene)
    }

    /// Asks the event loop to exit after the current tick.
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Spawns a sprite and queues its texture load.
    pub fn spawn_sprite(&mut self, sprite: Sprite) -> NodeId {
        let path = sprite.texture.clone();
        let id = self.nodes.spawn_sprite(sprite);
        self.assets.request_image(&path, id);
        id
    }

    /// Spawns a shape, queuing a texture load when the descriptor has one.
    pub fn spawn_shape(&mut self, shape: Shape) -> NodeId {
        let path = shape.texture.clone();
        let id = self.nodes.spawn_shape(shape);
        if let Some(path) = path {
            self.assets.request_image(&path, id);
        }
        id
    }

    pub fn spawn_group(&mut self, children: &[NodeId]) -> NodeId {
        self.nodes.spawn_group(children)
    }

    /// Spawns a label; it rasterizes once its font is registered and
    /// loaded (see [`Context::load_font`]).
    #[cfg(feature = "text")]
    pub fn spawn_label(&mut self, label: Label) -> NodeId {
        self.nodes.spawn_label(label)
    }

    /// Loads a font file under a registration name that labels refer to.
    #[cfg(feature = "text")]
    pub fn load_font(&mut self, name: &str, path: &str) {
        self.assets.load_font(name, path);
    }
}

pub(crate) type TickFn = Box<dyn FnMut(&mut Context, &mut EventRouter)>;

/// Application builder: window settings plus setup and update callbacks.
///
/// ```no_run
/// use peridot::prelude::*;
///
/// App::new("demo")
///     .window_size(800, 600)
///     .setup(|ctx, _router| {
///         let quad = ctx.spawn_shape(Shape::quad().color(Color::RED));
///         ctx.scene.add(&mut ctx.nodes, quad);
///     })
///     .run();
/// ```
pub struct App {
    title: String,
    window_size: (u32, u32),
    background: Color,
    setup: Vec<TickFn>,
    update: Vec<TickFn>,
}

impl App {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            window_size: (1280, 720),
            background: Color::BLACK,
            setup: Vec::new(),
            update: Vec::new(),
        }
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Runs once when the window and GPU are up, before the first frame.
    pub fn setup(mut self, f: impl FnMut(&mut Context, &mut EventRouter) + 'static) -> Self {
        self.setup.push(Box::new(f));
        self
    }

    /// Runs every tick before the frame renders.
    pub fn update(mut self, f: impl FnMut(&mut Context, &mut EventRouter) + 'static) -> Self {
        self.update.push(Box::new(f));
        self
    }

    /// Opens the window and runs the event loop until exit.
    pub fn run(self) {
        // Ok to fail when the host app installed its own logger.
        let _ = env_logger::try_init();

        let event_loop = winit::event_loop::EventLoop::new().expect("Failed to create event loop");
        let mut app = WinitApp::new(
            self.title,
            self.window_size,
            self.background,
            self.setup,
            self.update,
        );
        if let Err(e) = event_loop.run_app(&mut app) {
            log::error!("event loop error: {e}");
        }
    }
}
