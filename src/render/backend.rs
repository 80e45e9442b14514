//=========================================================================
// Render Backend Contract
//=========================================================================
//
// The seam between the renderer lifecycle and the GPU library doing the
// actual work. A backend only knows how to build, configure, present and
// release; the `Renderer` owns the state machine around those calls.
//
//=========================================================================

use thiserror::Error;

use super::surface::SurfaceTarget;
use crate::core::assets::AssetRegistry;

//=== RendererError =======================================================

/// Failures reported by a backend.
///
/// `Timeout` is a skipped frame. Every other variant invalidates the
/// current device/surface pairing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendererError {
    #[error("surface lost")]
    Lost,

    #[error("surface configuration is outdated")]
    Outdated,

    #[error("timed out acquiring the next frame")]
    Timeout,

    #[error("out of GPU memory")]
    OutOfMemory,

    #[error("backend failure: {0}")]
    Backend(String),
}

impl RendererError {
    /// Whether the surface must be recreated before the next render.
    pub fn invalidates_surface(&self) -> bool {
        !matches!(self, Self::Timeout)
    }
}

//=== Frame ===============================================================

/// Read-only view of application state handed to a backend for one present.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub index: u64,
    pub elapsed: f64,
    pub width: u32,
    pub height: u32,
    /// Cursor in logical-resolution space.
    pub cursor: (f32, f32),
    pub assets: &'a AssetRegistry,
}

//=== RenderBackend =======================================================

pub trait RenderBackend {
    /// Creates device and surface resources for `target`.
    fn build(&mut self, target: &SurfaceTarget) -> Result<(), RendererError>;

    /// Sizes the surface. Never called with a zero dimension.
    fn configure(&mut self, width: u32, height: u32) -> Result<(), RendererError>;

    /// Draws and presents one frame.
    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RendererError>;

    /// Drops device and surface resources. Safe to call when nothing is built.
    fn release(&mut self);
}
