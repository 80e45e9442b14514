//=========================================================================
// Renderer Entry Points
//=========================================================================
//
// Renderers are created against a native surface (Win32 or Xlib) or
// headless, and driven either directly (`aetheric_renderer_render`) or
// through `aetheric_app_progress`.
//
// Creation failures yield token 0: a null window handle, an unknown
// session, or a backend that could not be built.
//
//=========================================================================

use std::ffi::{c_int, c_ulong, c_void};

use log::{debug, warn};

use super::{handle, session_ref, token, Session};
use crate::render::{HeadlessBackend, Renderer, SurfaceTarget};

/// `aetheric_renderer_state` results.
pub const AETHERIC_SURFACE_UNINITIALIZED: c_int = 0;
pub const AETHERIC_SURFACE_READY: c_int = 1;
pub const AETHERIC_SURFACE_LOST: c_int = 2;
pub const AETHERIC_SURFACE_DESTROYED: c_int = 3;

unsafe fn create(session: *const Session, target: Option<SurfaceTarget>, width: u32, height: u32) -> u64 {
    let Some(session) = session_ref(session) else {
        return 0;
    };
    let Some(target) = target else {
        warn!(target: "ffi", "Renderer creation rejected: null window handle");
        return 0;
    };

    // The GPU library is an external collaborator; the headless backend
    // stands in for it behind the same surface state machine.
    match Renderer::create(Box::new(HeadlessBackend::new()), target, width, height) {
        Ok(renderer) => token(session.renderers().insert(renderer)),
        Err(e) => {
            warn!(target: "ffi", "Renderer creation failed: {}", e);
            0
        }
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_new_headless(session: *const Session, width: u32, height: u32) -> u64 {
    create(session, Some(SurfaceTarget::Headless), width, height)
}

/// # Safety
///
/// `session` must be null or a live session pointer; `hwnd` must be null
/// or a window owned by the caller that outlives the renderer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_new_win32(
    session: *const Session,
    hinstance: *mut c_void,
    hwnd: *mut c_void,
    width: u32,
    height: u32,
) -> u64 {
    let target = SurfaceTarget::win32(hinstance as isize, hwnd as isize);
    create(session, target, width, height)
}

/// # Safety
///
/// `session` must be null or a live session pointer; `window` must be 0 or
/// a window on `display` that outlives the renderer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_new_xlib(
    session: *const Session,
    window: c_ulong,
    display: *mut c_void,
    width: u32,
    height: u32,
) -> u64 {
    let target = SurfaceTarget::xlib(window, display, 0);
    create(session, target, width, height)
}

/// Destroys the renderer. Must be called before the native window goes away.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_delete(session: *const Session, renderer: u64) {
    let Some(session) = session_ref(session) else {
        return;
    };
    let removed = session.renderers().remove(handle(renderer));
    match removed {
        Some(mut renderer) => renderer.destroy(),
        None => debug!(target: "ffi", "Ignoring release of invalid renderer token {:#x}", renderer),
    }
}

/// Renders the current state of `app`. `false` means nothing was presented;
/// check [`aetheric_renderer_state`] and call [`aetheric_renderer_recreate`]
/// when the surface is lost.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_render(session: *const Session, renderer: u64, app: u64) -> bool {
    let Some(session) = session_ref(session) else {
        return false;
    };
    let apps = session.apps();
    let mut renderers = session.renderers();
    let (Some(renderer), Some(app)) = (renderers.get_mut(handle(renderer)), apps.get(handle(app))) else {
        warn!(target: "ffi", "aetheric_renderer_render: invalid renderer or application token");
        return false;
    };
    renderer.render(app)
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_resize(session: *const Session, renderer: u64, width: u32, height: u32) {
    if let Some(session) = session_ref(session) {
        if let Some(renderer) = session.renderers().get_mut(handle(renderer)) {
            renderer.resize(width, height);
        }
    }
}

/// Rebuilds device and surface at the last known size.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_recreate(session: *const Session, renderer: u64) -> bool {
    session_ref(session).is_some_and(|s| s.renderers().get_mut(handle(renderer)).is_some_and(Renderer::recreate))
}

/// Surface state as an `AETHERIC_SURFACE_*` code; `AETHERIC_SURFACE_DESTROYED`
/// for an invalid token.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_renderer_state(session: *const Session, renderer: u64) -> c_int {
    use crate::render::SurfaceState;

    let state = session_ref(session).and_then(|s| s.renderers().get(handle(renderer)).map(Renderer::state));
    match state {
        Some(SurfaceState::Uninitialized) => AETHERIC_SURFACE_UNINITIALIZED,
        Some(SurfaceState::Ready) => AETHERIC_SURFACE_READY,
        Some(SurfaceState::Lost) => AETHERIC_SURFACE_LOST,
        Some(SurfaceState::Destroyed) | None => AETHERIC_SURFACE_DESTROYED,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
