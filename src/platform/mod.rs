//=========================================================================
// Platform Subsystem
//
// Winit host for the engine core: owns the OS window, turns native input
// into raw events and drives one `progress` per redraw.
//
// Architecture:
// ```text
//  Main Thread (Winit Event Loop)
//  ┌────────────────────────────────────────────────────┐
//  │  WindowEvent / DeviceEvent                         │
//  │   ↓                                                │
//  │  InputProcessor (KeyMap: key/button → name)        │
//  │   ↓                                                │
//  │  InputBuffer (per-frame, ordered)                  │
//  │   ↓ RedrawRequested (flush as one batch)           │
//  │  EventSender ──► EventQueue                        │
//  │                     ↓                              │
//  │  Application::progress_with_renderer(.., dt)       │
//  │   ↓                                                │
//  │  RequestQueue → Shutdown / ReloadBindings /        │
//  │                 RecreateSurface, then reset()      │
//  └────────────────────────────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **RedrawRequested = frame boundary**: all input buffered since the
//   previous redraw is pushed as one batch right before `progress`
// - **Close goes through the core**: a window close becomes a
//   `CloseRequested` event; the loop exits once `progress` returns `false`
// - **Renderer before window**: the renderer is destroyed in `exiting()`
//   and declared before the window, so it never outlives its surface
//
//=========================================================================

//=== Submodules ==========================================================

mod input_buffer;
mod input_processor;
pub mod keymap;

//=== External Crates =====================================================

use std::time::Instant;

use log::*;
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    error::{EventLoopError, OsError},
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::config::{ConfigError, WindowConfig};
use crate::core::input::binding::BindingError;
use crate::core::input::event::RawInputEvent;
use crate::core::{Application, EventQueue, EventSender, Request, RequestQueue};
use crate::render::{RenderBackend, Renderer, RendererError, SurfaceTarget};
use input_buffer::InputBuffer;
use input_processor::InputProcessor;
use keymap::KeyMap;

//=== PlatformError =======================================================

/// Host initialization and runtime errors. All of them end the session.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(#[source] EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(#[source] EventLoopError),

    #[error("window creation failed: {0}")]
    WindowCreation(#[from] OsError),

    #[error("renderer creation failed: {0}")]
    Renderer(#[from] RendererError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bindings(#[from] BindingError),
}

/// Produces a fresh backend for each renderer the host creates.
pub type BackendFactory = Box<dyn FnMut() -> Box<dyn RenderBackend>>;

//=== Platform ============================================================

/// Window owner and frame driver. Runs on the main thread (Winit
/// requirement on macOS/iOS) and is not `Send`.
pub(crate) struct Platform {
    /// Declared before `window`: dropped first.
    renderer: Option<Renderer>,
    window: Option<Window>,
    window_config: WindowConfig,
    backend_factory: BackendFactory,

    app: Application,
    events: EventQueue,
    sender: EventSender,
    requests: RequestQueue,

    buffer: InputBuffer,
    input_processor: InputProcessor,
    last_frame: Option<Instant>,
    fatal: Option<PlatformError>,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Does not create the window yet; that happens lazily in `resumed()`.
    pub(crate) fn new(
        app: Application,
        events: EventQueue,
        keymap: KeyMap,
        window_config: WindowConfig,
        backend_factory: BackendFactory,
    ) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        let sender = events.sender();
        Self {
            renderer: None,
            window: None,
            window_config,
            backend_factory,
            app,
            events,
            sender,
            requests: RequestQueue::new(),
            buffer: InputBuffer::new(),
            input_processor: InputProcessor::new(keymap),
            last_frame: None,
            fatal: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the event loop until the core terminates or shutdown is requested.
    pub(crate) fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;
        event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution)?;

        match self.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PlatformError> {
        let attrs = WindowAttributes::default()
            .with_title(self.window_config.title.clone())
            .with_inner_size(LogicalSize::new(self.window_config.width, self.window_config.height));

        let window = event_loop.create_window(attrs)?;
        let size = window.inner_size();
        info!(
            target: "platform",
            "Window created: {}x{} @ {}x DPI",
            size.width,
            size.height,
            window.scale_factor()
        );

        let target = SurfaceTarget::from_window(&window)?;
        let renderer = Renderer::create((self.backend_factory)(), target, size.width, size.height)?;

        window.request_redraw();
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Frame boundary: flush input, step the core, act on requests.
    fn run_frame(&mut self, event_loop: &ActiveEventLoop) {
        if !self.buffer.is_empty() {
            trace!(target: "platform", "Flushing {} buffered events", self.buffer.len());
            self.sender.push_batch(self.buffer.drain());
        }

        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        let keep_running = self.app.progress_with_renderer(
            &self.events,
            &mut self.requests,
            self.renderer.as_mut(),
            dt,
        );
        if !keep_running {
            info!(target: "platform", "Core terminated, leaving event loop");
            event_loop.exit();
            return;
        }

        self.handle_requests(event_loop);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn handle_requests(&mut self, event_loop: &ActiveEventLoop) {
        for request in self.requests.iter() {
            match request {
                Request::Shutdown => {
                    info!(target: "platform", "Shutdown requested by application");
                    event_loop.exit();
                }
                Request::ReloadBindings => {
                    info!(target: "platform", "Bindings reloaded by application");
                }
                Request::RecreateSurface => {
                    if let Some(renderer) = self.renderer.as_mut() {
                        if !renderer.recreate() {
                            warn!(target: "platform", "Surface recreation failed; retrying next frame");
                        }
                    }
                }
            }
        }
        self.requests.reset();
    }

    fn buffer_discrete(&mut self, events: impl IntoIterator<Item = RawInputEvent>) {
        for event in events {
            self.buffer.push_discrete(event);
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Creates the window if it doesn't exist yet (startup or mobile resume).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            error!(target: "platform", "Startup failed: {}", e);
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                self.buffer.push_discrete(RawInputEvent::CloseRequested);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }

            WindowEvent::Focused(false) => {
                let released = self.input_processor.release_all();
                self.buffer_discrete(released);
            }

            WindowEvent::CursorMoved { position, .. } => {
                let size = self
                    .window
                    .as_ref()
                    .map(|w| w.inner_size())
                    .map(|s| (s.width, s.height))
                    .unwrap_or((0, 0));
                let event = self.input_processor.process_cursor_moved(position.x, position.y, size);
                self.buffer.push_continuous(event);
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let events = self.input_processor.process_key_event(&key_event);
                if events.is_empty() {
                    trace!(target: "platform", "Unmapped key ignored: {:?}", key_event.physical_key);
                }
                self.buffer_discrete(events);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(event) = self.input_processor.process_mouse_button(button, state) {
                    self.buffer.push_discrete(event);
                }
            }

            WindowEvent::RedrawRequested => self.run_frame(event_loop),

            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            let event = self.input_processor.process_mouse_motion(dx, dy);
            self.buffer.push_continuous(event);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.destroy();
        }
        info!(target: "platform", "Event loop exiting after {} frames", self.app.clock().frame_index);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
