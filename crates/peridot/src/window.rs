//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the
//! event loop: window and GPU creation, input forwarding into the
//! [`EventRouter`], and the per-frame tick (assets, updates, render, FPS
//! title).

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::app::{Context, TickFn};
use crate::color::Color;
use crate::event::EventRouter;
use crate::render::draw::render_scene;
use crate::render::gpu::GpuContext;
use crate::render::RenderState;
use crate::time::FpsCounter;

/// The application state that winit drives.
pub(crate) struct WinitApp {
    ctx: Context,
    router: EventRouter,
    setup: Vec<TickFn>,
    update: Vec<TickFn>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    render: Option<RenderState>,
    fps: FpsCounter,
    started: bool,
    title: String,
    window_size: (u32, u32),
}

impl WinitApp {
    pub fn new(
        title: String,
        window_size: (u32, u32),
        background: Color,
        setup: Vec<TickFn>,
        update: Vec<TickFn>,
    ) -> Self {
        Self {
            ctx: Context::new(window_size, background),
            router: EventRouter::new(),
            setup,
            update,
            window: None,
            gpu: None,
            render: None,
            fps: FpsCounter::new(),
            started: false,
            title,
            window_size,
        }
    }
}

impl ApplicationHandler for WinitApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.window_size.0 as f64,
                    self.window_size.1 as f64,
                ));
            let window = Arc::new(
                event_loop
                    .create_window(attrs)
                    .expect("Failed to create window"),
            );

            let gpu = GpuContext::new(window.clone());
            self.ctx.surface_size = gpu.surface_size();
            self.render = Some(RenderState::new(&gpu));
            self.gpu = Some(gpu);
            self.window = Some(window);
        }

        if !self.started {
            self.started = true;
            for setup in self.setup.iter_mut() {
                setup(&mut self.ctx, &mut self.router);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Window close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size.width, size.height);
                    self.ctx.surface_size = gpu.surface_size();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    self.router.handle_key(&mut self.ctx, key_code, pressed);
                }
            }

            WindowEvent::MouseInput { button, state, .. } => {
                if state == ElementState::Pressed {
                    self.router.handle_pointer_press(&mut self.ctx, button);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.ctx.cursor.x = position.x as f32;
                self.ctx.cursor.y = position.y as f32;
                let (x, y) = (self.ctx.cursor.x, self.ctx.cursor.y);
                self.router.handle_cursor_moved(&mut self.ctx, x, y);
            }

            WindowEvent::RedrawRequested => {
                self.ctx.time.update();

                // Bind finished asset loads and apply hot-reloads.
                if let (Some(gpu), Some(render)) = (self.gpu.as_ref(), self.render.as_mut()) {
                    let Context { assets, nodes, .. } = &mut self.ctx;
                    assets.drain(nodes, gpu, render);
                }

                for update in self.update.iter_mut() {
                    update(&mut self.ctx, &mut self.router);
                }

                render_and_handle_errors(
                    event_loop,
                    &mut self.ctx,
                    self.gpu.as_mut(),
                    self.render.as_mut(),
                );

                if let Some(fps) = self.fps.update(self.ctx.time.delta())
                    && let Some(window) = &self.window
                {
                    window.set_title(&format!("{} | FPS: {fps}", self.title));
                }

                if self.ctx.exit_requested {
                    event_loop.exit();
                    return;
                }

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}

/// Render the scene and handle surface errors.
fn render_and_handle_errors(
    event_loop: &ActiveEventLoop,
    ctx: &mut Context,
    gpu: Option<&mut GpuContext>,
    render: Option<&mut RenderState>,
) {
    let (Some(gpu), Some(render)) = (gpu, render) else {
        return;
    };
    match render_scene(ctx, gpu, render) {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            let (w, h) = gpu.surface_size();
            gpu.resize(w, h);
        }
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("Out of GPU memory!");
            event_loop.exit();
        }
        Err(e) => {
            log::warn!("Surface error: {e:?}");
        }
    }
}
