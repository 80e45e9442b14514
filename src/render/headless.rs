//=========================================================================
// Headless Backend
//=========================================================================
//
// Backend without a GPU. It keeps just enough device/surface bookkeeping
// to exercise the renderer lifecycle, and lets a `FaultInjector` simulate
// device loss and transient failures from outside.
//
//=========================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::backend::{Frame, RenderBackend, RendererError};
use super::surface::SurfaceTarget;

//=== Shared State ========================================================

#[derive(Debug, Default)]
struct Shared {
    device_lost: bool,
    next_present_error: Option<RendererError>,
    next_build_error: Option<RendererError>,
    builds: u32,
    presented: u64,
    last_size: Option<(u32, u32)>,
}

//=== FaultInjector =======================================================

/// Remote control for a [`HeadlessBackend`] that has been moved into a
/// renderer. Also observes what the backend presented.
#[derive(Debug, Clone, Default)]
pub struct FaultInjector {
    shared: Arc<Mutex<Shared>>,
}

impl FaultInjector {
    /// Loses the device: presents fail with `Lost` until the next build.
    pub fn lose_device(&self) {
        self.lock().device_lost = true;
    }

    /// Fails the next present with `error`.
    pub fn fail_next_present(&self, error: RendererError) {
        self.lock().next_present_error = Some(error);
    }

    /// Fails the next build with `error`.
    pub fn fail_next_build(&self, error: RendererError) {
        self.lock().next_build_error = Some(error);
    }

    pub fn presented_frames(&self) -> u64 {
        self.lock().presented
    }

    /// Size of the most recently presented frame.
    pub fn last_presented_size(&self) -> Option<(u32, u32)> {
        self.lock().last_size
    }

    pub fn build_count(&self) -> u32 {
        self.lock().builds
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//=== HeadlessBackend =====================================================

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    faults: FaultInjector,
    built: bool,
    configured: Option<(u32, u32)>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for injecting faults after the backend is moved away.
    pub fn faults(&self) -> FaultInjector {
        self.faults.clone()
    }
}

impl RenderBackend for HeadlessBackend {
    fn build(&mut self, _target: &SurfaceTarget) -> Result<(), RendererError> {
        let mut shared = self.faults.lock();
        if let Some(error) = shared.next_build_error.take() {
            return Err(error);
        }
        shared.builds += 1;
        shared.device_lost = false;
        self.built = true;
        self.configured = None;
        Ok(())
    }

    fn configure(&mut self, width: u32, height: u32) -> Result<(), RendererError> {
        if !self.built {
            return Err(RendererError::Backend("configure before build".into()));
        }
        if self.faults.lock().device_lost {
            return Err(RendererError::Lost);
        }
        self.configured = Some((width, height));
        Ok(())
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RendererError> {
        let mut shared = self.faults.lock();
        if shared.device_lost {
            return Err(RendererError::Lost);
        }
        if let Some(error) = shared.next_present_error.take() {
            return Err(error);
        }
        if self.configured != Some((frame.width, frame.height)) {
            return Err(RendererError::Outdated);
        }
        shared.presented += 1;
        shared.last_size = Some((frame.width, frame.height));
        Ok(())
    }

    fn release(&mut self) {
        self.built = false;
        self.configured = None;
    }
}
