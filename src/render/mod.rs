//=========================================================================
// Renderer
//=========================================================================
//
// Lifecycle state machine around a replaceable render backend.
//
// State Machine:
// ```text
//   Uninitialized ──initialize/recreate──► Ready ──render (ok/timeout)──┐
//                                            ▲   ◄──────────────────────┘
//                                            │
//                         recreate (ok)      │ render/configure error
//                                            │
//                                           Lost
//
//   any ──destroy──► Destroyed (terminal)
// ```
//
// Responsibilities:
// - Track presentation size (last `resize` wins, applied lazily)
// - Skip rendering while the size has a zero dimension
// - Refuse to render while `Lost` until `recreate` succeeds
//
//=========================================================================

//=== Submodules ==========================================================

pub mod backend;
pub mod headless;
pub mod surface;

//=== External Dependencies ===============================================

use std::fmt;

use log::{debug, info, trace, warn};

//=== Internal Dependencies ===============================================

pub use backend::{Frame, RenderBackend, RendererError};
pub use headless::{FaultInjector, HeadlessBackend};
pub use surface::SurfaceTarget;

use crate::core::app::Application;

//=== SurfaceState ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceState {
    Uninitialized,
    Ready,
    Lost,
    Destroyed,
}

impl fmt::Display for SurfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Lost => "lost",
            Self::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

//=== Renderer ============================================================

pub struct Renderer {
    backend: Box<dyn RenderBackend>,
    target: SurfaceTarget,
    state: SurfaceState,
    size: (u32, u32),
    needs_configure: bool,
}

impl Renderer {
    //--- Construction -----------------------------------------------------

    /// Wraps `backend` without touching it. The renderer starts `Uninitialized`.
    pub fn new(backend: Box<dyn RenderBackend>, target: SurfaceTarget, width: u32, height: u32) -> Self {
        Self {
            backend,
            target,
            state: SurfaceState::Uninitialized,
            size: (width, height),
            needs_configure: true,
        }
    }

    /// Builds a renderer and brings it to `Ready`.
    pub fn create(
        backend: Box<dyn RenderBackend>,
        target: SurfaceTarget,
        width: u32,
        height: u32,
    ) -> Result<Self, RendererError> {
        let mut renderer = Self::new(backend, target, width, height);
        renderer.initialize()?;
        Ok(renderer)
    }

    /// Headless renderer, returning the fault injector of its backend.
    pub fn headless(width: u32, height: u32) -> Result<(Self, FaultInjector), RendererError> {
        let backend = HeadlessBackend::new();
        let faults = backend.faults();
        let renderer = Self::create(Box::new(backend), SurfaceTarget::Headless, width, height)?;
        Ok((renderer, faults))
    }

    /// Builds device and surface resources at the current size.
    ///
    /// On failure the renderer is `Lost` and `recreate` may be retried.
    pub fn initialize(&mut self) -> Result<(), RendererError> {
        if self.state == SurfaceState::Destroyed {
            return Err(RendererError::Backend("renderer has been destroyed".into()));
        }

        self.backend.release();
        if let Err(error) = self.build() {
            self.set_state(SurfaceState::Lost);
            return Err(error);
        }
        self.set_state(SurfaceState::Ready);
        Ok(())
    }

    //--- Lifecycle --------------------------------------------------------

    /// Renders the current state of `app`.
    ///
    /// Returns `false` when nothing was presented: not ready, zero size,
    /// skipped frame, or a failure that moved the renderer to `Lost`.
    pub fn render(&mut self, app: &Application) -> bool {
        match self.state {
            SurfaceState::Ready => {}
            SurfaceState::Lost => {
                trace!(target: "render", "Render skipped: surface lost, recreate required");
                return false;
            }
            state => {
                trace!(target: "render", "Render skipped: renderer {}", state);
                return false;
            }
        }

        let (width, height) = self.size;
        if width == 0 || height == 0 {
            trace!(target: "render", "Render skipped: zero-sized surface");
            return false;
        }

        if self.needs_configure {
            if let Err(error) = self.backend.configure(width, height) {
                self.fail(error);
                return false;
            }
            self.needs_configure = false;
        }

        let frame = app.frame(width, height);
        match self.backend.present(&frame) {
            Ok(()) => true,
            Err(error) => {
                self.fail(error);
                false
            }
        }
    }

    /// Records a new presentation size, applied on the next render or recreate.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.state == SurfaceState::Destroyed {
            warn!(target: "render", "Resize ignored: renderer destroyed");
            return;
        }
        if self.size != (width, height) {
            debug!(target: "render", "Resize {}x{} -> {}x{}", self.size.0, self.size.1, width, height);
            self.size = (width, height);
            self.needs_configure = true;
        }
    }

    /// Rebuilds device and surface at the last known size.
    pub fn recreate(&mut self) -> bool {
        match self.initialize() {
            Ok(()) => true,
            Err(error) => {
                warn!(target: "render", "Recreate failed: {}", error);
                false
            }
        }
    }

    /// Releases backend resources. Later calls are no-ops.
    pub fn destroy(&mut self) {
        if self.state == SurfaceState::Destroyed {
            return;
        }
        self.backend.release();
        self.set_state(SurfaceState::Destroyed);
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn is_lost(&self) -> bool {
        self.state == SurfaceState::Lost
    }

    //--- Internal Helpers -------------------------------------------------

    fn build(&mut self) -> Result<(), RendererError> {
        self.backend.build(&self.target)?;
        self.needs_configure = true;

        let (width, height) = self.size;
        if width > 0 && height > 0 {
            self.backend.configure(width, height)?;
            self.needs_configure = false;
        }
        Ok(())
    }

    fn fail(&mut self, error: RendererError) {
        if error.invalidates_surface() {
            warn!(target: "render", "Surface invalidated: {}", error);
            self.set_state(SurfaceState::Lost);
        } else {
            debug!(target: "render", "Frame skipped: {}", error);
        }
    }

    fn set_state(&mut self, next: SurfaceState) {
        if self.state != next {
            info!(target: "render", "Renderer {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
