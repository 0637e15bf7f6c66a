//! Asynchronous asset loading and hot-reload.
//!
//! Decode work happens on a background thread: requests go out over a
//! channel, decoded results come back and are drained once per tick on the
//! main thread, where GPU upload and node binding happen. Every loaded
//! image path is also registered with a filesystem watcher; change events
//! are debounced and the texture entry is swapped in place so running
//! scenes pick up edits without restarting.
//!
//! Failures at any stage are logged and the affected asset is skipped; a
//! missing texture draws as a flat-colored quad, a missing font simply
//! never rasterizes its labels.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::render::gpu::GpuContext;
use crate::render::texture::TextureHandle;
use crate::render::RenderState;
use crate::scene::graph::SceneGraph;
use crate::scene::node::NodeId;

const DEBOUNCE_DURATION: std::time::Duration = std::time::Duration::from_millis(200);

enum LoadRequest {
    Image { path: String },
    #[cfg(feature = "text")]
    Font { name: String, path: String },
}

enum LoadResult {
    Image {
        path: String,
        width: u32,
        height: u32,
        data: Vec<u8>,
    },
    #[cfg(feature = "text")]
    Font { name: String, bytes: Vec<u8> },
    Failed {
        path: String,
        error: String,
    },
}

/// Hands decode work to a background thread and binds the results to
/// waiting nodes once per tick.
pub struct AssetLoader {
    request_tx: mpsc::Sender<LoadRequest>,
    result_rx: mpsc::Receiver<LoadResult>,
    /// Image path → nodes waiting for the handle.
    waiting: HashMap<String, Vec<NodeId>>,
    /// Paths already sent to the worker, to avoid duplicate decodes.
    requested: Vec<String>,
    /// The filesystem watcher. `None` if initialization failed.
    watcher: Option<RecommendedWatcher>,
    /// Receives filesystem events from the watcher's background thread.
    watch_rx: mpsc::Receiver<Result<notify::Event, notify::Error>>,
    /// Maps canonical paths to the texture entry they reload into.
    watched_paths: HashMap<PathBuf, TextureHandle>,
    /// Debounce buffer: path → timestamp of last event.
    pending_reloads: HashMap<PathBuf, Instant>,
    rx_disconnected: bool,
}

impl AssetLoader {
    /// Starts the decode worker and the filesystem watcher.
    pub fn new() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::channel::<LoadResult>();

        thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let result = decode(request);
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });

        let (watch_tx, watch_rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = watch_tx.send(res);
        });
        let watcher = match watcher {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("Failed to create file watcher: {e}. Hot-reload disabled.");
                None
            }
        };

        Self {
            request_tx,
            result_rx,
            waiting: HashMap::new(),
            requested: Vec::new(),
            watcher,
            watch_rx,
            watched_paths: HashMap::new(),
            pending_reloads: HashMap::new(),
            rx_disconnected: false,
        }
    }

    /// Queues an image load and registers `node` to receive the handle.
    /// Duplicate paths share one decode.
    pub fn request_image(&mut self, path: &str, node: NodeId) {
        self.waiting.entry(path.to_owned()).or_default().push(node);
        if !self.requested.iter().any(|p| p == path) {
            self.requested.push(path.to_owned());
            let _ = self.request_tx.send(LoadRequest::Image {
                path: path.to_owned(),
            });
        }
    }

    /// Queues a font load under a registration name.
    #[cfg(feature = "text")]
    pub fn load_font(&mut self, name: &str, path: &str) {
        let _ = self.request_tx.send(LoadRequest::Font {
            name: name.to_owned(),
            path: path.to_owned(),
        });
    }

    /// Register an image path for hot-reload into a texture entry.
    fn watch(&mut self, path: &str, handle: TextureHandle) {
        let canonical = match PathBuf::from(path).canonicalize() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Cannot watch '{path}': {e}");
                return;
            }
        };
        if let Some(watcher) = &mut self.watcher {
            if let Err(e) = watcher.watch(&canonical, RecursiveMode::NonRecursive) {
                log::warn!("Failed to watch '{}': {e}", canonical.display());
                return;
            }
        }
        self.watched_paths.insert(canonical, handle);
    }

    /// Once-per-tick pump: binds finished loads, applies debounced
    /// reloads, and rasterizes dirty text.
    pub(crate) fn drain(
        &mut self,
        nodes: &mut SceneGraph,
        gpu: &GpuContext,
        state: &mut RenderState,
    ) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                LoadResult::Image {
                    path,
                    width,
                    height,
                    data,
                } => {
                    let handle = match state.textures.cached(&path) {
                        Some(handle) => handle,
                        None => {
                            let handle = state.textures.insert_from_path(
                                gpu,
                                &state.renderer,
                                &path,
                                width,
                                height,
                                &data,
                            );
                            self.watch(&path, handle);
                            handle
                        }
                    };
                    self.bind_image(nodes, &path, handle, width as f32, height as f32);
                }
                #[cfg(feature = "text")]
                LoadResult::Font { name, bytes } => {
                    state.fonts.insert(&name, &bytes);
                }
                LoadResult::Failed { path, error } => {
                    log::warn!("asset '{path}' failed to load: {error}");
                    self.waiting.remove(&path);
                }
            }
        }

        self.poll_watcher();
        for path in self.drain_ready_reloads() {
            let Some(&handle) = self.watched_paths.get(&path) else {
                continue;
            };
            match image::open(&path) {
                Ok(img) => {
                    let rgba = img.to_rgba8();
                    let (width, height) = rgba.dimensions();
                    state.textures.reload_entry(
                        gpu,
                        &state.renderer,
                        handle,
                        width,
                        height,
                        &rgba,
                    );
                    log::info!("reloaded texture '{}'", path.display());
                }
                Err(e) => log::warn!("reload of '{}' failed: {e}", path.display()),
            }
        }

        #[cfg(feature = "text")]
        self.rasterize_dirty_text(nodes, gpu, state);
    }

    fn bind_image(
        &mut self,
        nodes: &mut SceneGraph,
        path: &str,
        handle: TextureHandle,
        width: f32,
        height: f32,
    ) {
        let Some(waiting) = self.waiting.remove(path) else {
            return;
        };
        for id in waiting {
            let Ok(entity) = nodes.entity_mut(id) else {
                continue;
            };
            entity.texture = Some(handle);
            entity.original_texture = Some(handle);
            entity.texture_size = crate::math::Vec2::new(width, height);
        }
    }

    /// Drain filesystem events from the receiver into the debounce buffer.
    fn poll_watcher(&mut self) {
        if self.rx_disconnected {
            return;
        }
        loop {
            match self.watch_rx.try_recv() {
                Ok(Ok(event)) => {
                    use notify::EventKind;
                    // Atomic saves appear as create events.
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in &event.paths {
                            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
                            if self.watched_paths.contains_key(&canonical) {
                                self.pending_reloads.insert(canonical, Instant::now());
                            }
                        }
                    }
                }
                Ok(Err(e)) => {
                    log::warn!("File watcher error: {e}");
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("File watcher disconnected. Hot-reload disabled.");
                    self.rx_disconnected = true;
                    break;
                }
            }
        }
    }

    /// Paths that have been quiet for at least the debounce duration.
    fn drain_ready_reloads(&mut self) -> Vec<PathBuf> {
        let now = Instant::now();
        let mut ready = Vec::new();
        self.pending_reloads.retain(|path, timestamp| {
            if now.duration_since(*timestamp) >= DEBOUNCE_DURATION {
                ready.push(path.clone());
                false
            } else {
                true
            }
        });
        ready
    }

    #[cfg(feature = "text")]
    fn rasterize_dirty_text(
        &mut self,
        nodes: &mut SceneGraph,
        gpu: &GpuContext,
        state: &mut RenderState,
    ) {
        for id in nodes.ids() {
            let Ok(entity) = nodes.entity_mut(id) else {
                continue;
            };
            let Some(text) = entity.text() else { continue };
            if !(text.dirty || entity.texture.is_none()) || !state.fonts.contains(text.font()) {
                continue;
            }
            let (font, content, px) = (
                text.font().to_owned(),
                text.content().to_owned(),
                text.px,
            );
            let color = entity.color();
            let Some(bitmap) = state.fonts.rasterize(&font, &content, px, color) else {
                continue;
            };
            let handle = state.textures.insert(
                gpu,
                &state.renderer,
                crate::render::texture::TextureFilter::Linear,
                "text bitmap",
                bitmap.width,
                bitmap.height,
                &bitmap.data,
            );
            let entity = match nodes.entity_mut(id) {
                Ok(e) => e,
                Err(_) => continue,
            };
            entity.texture = Some(handle);
            entity.original_texture = Some(handle);
            entity.texture_size =
                crate::math::Vec2::new(bitmap.width as f32, bitmap.height as f32);
            if let Some(text) = entity.text.as_mut() {
                text.dirty = false;
            }
        }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(request: LoadRequest) -> LoadResult {
    match request {
        LoadRequest::Image { path } => match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let (width, height) = rgba.dimensions();
                LoadResult::Image {
                    path,
                    width,
                    height,
                    data: rgba.into_raw(),
                }
            }
            Err(e) => LoadResult::Failed {
                path,
                error: e.to_string(),
            },
        },
        #[cfg(feature = "text")]
        LoadRequest::Font { name, path } => match std::fs::read(&path) {
            Ok(bytes) => LoadResult::Font { name, bytes },
            Err(e) => LoadResult::Failed {
                path,
                error: e.to_string(),
            },
        },
    }
}
