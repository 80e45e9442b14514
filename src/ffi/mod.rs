//=========================================================================
// C Boundary
//
// `extern "C"` surface for hosts embedding the core through the cdylib.
//
// Architecture:
// ```text
//   Host (C/C++)                         aetheric_core
//   ────────────                         ─────────────
//   aetheric_session_new() ───────────►  Box<Session>
//                                          ├─ Mutex<HandleArena<Renderer>>
//   u64 tokens (0 = null)  ◄──────────►    ├─ Mutex<HandleArena<Application>>
//                                          ├─ Mutex<HandleArena<RequestQueue>>
//                                          └─ RwLock<HandleArena<Arc<EventQueue>>>
// ```
//
// Threading:
// - Event queue calls (`aetheric_events_*`, `aetheric_import_*`) may run
//   on any thread, concurrently with the frame thread. They hold the
//   event arena's read lock only long enough to clone the queue's `Arc`.
// - Application, request queue and renderer calls belong to the frame
//   thread. Their arenas are still locked, in the order apps, requests,
//   renderers; the event arena lock is never held together with them.
// - `aetheric_session_delete` must not race with any other call.
//
// Conventions:
// - Every entity is addressed by a generation-counted token; stale, null
//   or released tokens resolve to nothing
// - Releasing an invalid token is a no-op
// - Failures are reported through the return value (status code, `false`
//   or a null token); nothing here panics across the boundary
// - Strings are NUL-terminated UTF-8, names at most 127 bytes
//
// Submodules:
// - `app`: application, event queue and request queue entry points
// - `input`: binding database export and point lookups
// - `render`: renderer creation and per-frame calls
// - `import`: model and image import into an event queue
//
//=========================================================================

//=== Submodules ==========================================================

pub mod app;
pub mod import;
pub mod input;
pub mod render;

//=== External Dependencies ===============================================

use std::ffi::{c_char, c_int, CStr};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockWriteGuard};

use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::core::input::database::InputBindingDatabase;
use crate::core::{Application, EventQueue, Handle, HandleArena, RequestQueue};
use crate::logging::{init_logging, LoggingConfig};
use crate::render::Renderer;

//=== Status Codes ========================================================

pub const AETHERIC_OK: c_int = 0;
pub const AETHERIC_NOT_FOUND: c_int = -1;
pub const AETHERIC_INVALID_HANDLE: c_int = -2;
pub const AETHERIC_INVALID_ARGUMENT: c_int = -3;
pub const AETHERIC_IMPORT_FAILED: c_int = -4;

//=== Session =============================================================

/// Root of every boundary object. Dropping it releases everything it owns,
/// renderers first.
pub struct Session {
    renderers: Mutex<HandleArena<Renderer>>,
    apps: Mutex<HandleArena<Application>>,
    requests: Mutex<HandleArena<RequestQueue>>,
    events: RwLock<HandleArena<Arc<EventQueue>>>,
}

impl Session {
    fn new() -> Self {
        Self {
            renderers: Mutex::new(HandleArena::new()),
            apps: Mutex::new(HandleArena::new()),
            requests: Mutex::new(HandleArena::new()),
            events: RwLock::new(HandleArena::new()),
        }
    }

    pub(crate) fn apps(&self) -> MutexGuard<'_, HandleArena<Application>> {
        lock(&self.apps)
    }

    pub(crate) fn requests(&self) -> MutexGuard<'_, HandleArena<RequestQueue>> {
        lock(&self.requests)
    }

    pub(crate) fn renderers(&self) -> MutexGuard<'_, HandleArena<Renderer>> {
        lock(&self.renderers)
    }

    pub(crate) fn event_queues(&self) -> RwLockWriteGuard<'_, HandleArena<Arc<EventQueue>>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared handle to the queue behind `token`. The arena lock is released
    /// before the caller touches the queue.
    pub(crate) fn event_queue(&self, token: u64) -> Option<Arc<EventQueue>> {
        let queues = self.events.read().unwrap_or_else(PoisonError::into_inner);
        queues.get(handle(token)).cloned()
    }

    /// Shared binding database of the application behind `token`.
    pub(crate) fn bindings(&self, token: u64) -> Option<Arc<InputBindingDatabase>> {
        self.apps().get(handle(token)).map(|app| Arc::clone(app.bindings()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Creates a session. Also installs the logger on first use (`RUST_LOG`).
#[no_mangle]
pub extern "C" fn aetheric_session_new() -> *mut Session {
    init_logging(&LoggingConfig::default());
    info!(target: "ffi", "Session created");
    Box::into_raw(Box::new(Session::new()))
}

/// Destroys the session `*session` points to and nulls the caller's pointer.
///
/// # Safety
///
/// `session` must be null or point to a pointer that is null or was
/// returned by [`aetheric_session_new`].
#[no_mangle]
pub unsafe extern "C" fn aetheric_session_delete(session: *mut *mut Session) {
    let Some(slot) = session.as_mut() else {
        return;
    };
    if slot.is_null() {
        return;
    }
    drop(Box::from_raw(*slot));
    *slot = std::ptr::null_mut();
    info!(target: "ffi", "Session destroyed");
}

//=== Helpers =============================================================

/// # Safety
///
/// `session` must be null or a live session pointer.
pub(crate) unsafe fn session_ref<'a>(session: *const Session) -> Option<&'a Session> {
    let session = session.as_ref();
    if session.is_none() {
        warn!(target: "ffi", "Null session pointer");
    }
    session
}

/// Borrows a NUL-terminated UTF-8 string. `None` for null or invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated buffer.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    match CStr::from_ptr(ptr).to_str() {
        Ok(text) => Some(text),
        Err(_) => {
            warn!(target: "ffi", "String argument is not valid UTF-8");
            None
        }
    }
}

fn token(handle: Handle) -> u64 {
    handle.to_raw()
}

fn handle(token: u64) -> Handle {
    Handle::from_raw(token)
}

//=========================================================================
// Unit Tests
//=========================================================================
