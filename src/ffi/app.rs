//=========================================================================
// Application, Event Queue and Request Queue Entry Points
//=========================================================================
//
// Lifecycle:
//   aetheric_app_new / aetheric_app_new_from_config → token
//   aetheric_events_new, aetheric_requests_new      → token
//   aetheric_*_delete(token)                         (no-op when invalid)
//
// Per frame:
//   aetheric_events_push_*  (any number, from any thread)
//   aetheric_app_progress(app, events, requests, renderer | 0, dt)
//   aetheric_requests_*     then aetheric_requests_reset
//
//=========================================================================

use std::ffi::{c_char, c_int};
use std::sync::Arc;

use log::{debug, warn};

use super::{c_str, handle, session_ref, token, Session};
use super::{AETHERIC_INVALID_ARGUMENT, AETHERIC_INVALID_HANDLE, AETHERIC_NOT_FOUND, AETHERIC_OK};
use crate::config::EngineConfig;
use crate::core::input::binding::{ActionId, AxisId, BindingError, GroupId};
use crate::core::input::event::ButtonState;
use crate::core::input::table::BindingConfig;
use crate::core::{Application, EventQueue, RequestQueue};

/// `state` argument of the action push functions.
pub const AETHERIC_ACTION_PRESSED: u32 = 0;
pub const AETHERIC_ACTION_RELEASED: u32 = 1;

fn button_state(state: u32) -> Option<ButtonState> {
    match state {
        AETHERIC_ACTION_PRESSED => Some(ButtonState::Pressed),
        AETHERIC_ACTION_RELEASED => Some(ButtonState::Released),
        _ => None,
    }
}

//=== Application =========================================================

/// Application with an empty binding table. Returns 0 on failure.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_new(session: *const Session) -> u64 {
    match session_ref(session) {
        Some(session) => token(session.apps().insert(Application::default())),
        None => 0,
    }
}

/// Application built from the `[bindings]` and `[display]` sections of a
/// TOML file. Returns 0 when the file is unreadable or the bindings are
/// invalid.
///
/// # Safety
///
/// `session` must be null or a live session pointer; `path` must be null
/// or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_new_from_config(session: *const Session, path: *const c_char) -> u64 {
    let (Some(session), Some(path)) = (session_ref(session), c_str(path)) else {
        return 0;
    };

    let app = EngineConfig::load(path)
        .map_err(|e| e.to_string())
        .and_then(|config| Application::from_config(&config).map_err(|e| e.to_string()));

    match app {
        Ok(app) => token(session.apps().insert(app)),
        Err(e) => {
            warn!(target: "ffi", "Cannot create application from {}: {}", path, e);
            0
        }
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_delete(session: *const Session, app: u64) {
    if let Some(session) = session_ref(session) {
        if session.apps().remove(handle(app)).is_none() {
            debug!(target: "ffi", "Ignoring release of invalid application token {:#x}", app);
        }
    }
}

/// Advances `app` by one frame, rendering through `renderer` unless it is 0.
///
/// Returns `false` once the application has terminated, or when a token
/// does not resolve.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_progress(
    session: *const Session,
    app: u64,
    events: u64,
    requests: u64,
    renderer: u64,
    delta_time: f32,
) -> bool {
    let Some(session) = session_ref(session) else {
        return false;
    };

    // Producers keep pushing into the queue while the frame runs.
    let events = session.event_queue(events);
    let mut apps = session.apps();
    let mut request_queues = session.requests();
    let mut renderers = session.renderers();

    let (Some(app), Some(events), Some(requests)) = (
        apps.get_mut(handle(app)),
        events,
        request_queues.get_mut(handle(requests)),
    ) else {
        warn!(target: "ffi", "aetheric_app_progress: invalid application, event or request token");
        return false;
    };

    let renderer = match renderer {
        0 => None,
        raw => match renderers.get_mut(handle(raw)) {
            Some(renderer) => Some(renderer),
            None => {
                warn!(target: "ffi", "aetheric_app_progress: invalid renderer token {:#x}", raw);
                return false;
            }
        },
    };

    app.progress_with_renderer(&events, requests, renderer, delta_time)
}

/// Replaces the binding table with the `[bindings]` section of a TOML file.
///
/// # Safety
///
/// `session` must be null or a live session pointer; `path` must be null
/// or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_reload_bindings(session: *const Session, app: u64, path: *const c_char) -> c_int {
    let Some(session) = session_ref(session) else {
        return AETHERIC_INVALID_HANDLE;
    };
    let mut apps = session.apps();
    let Some(app) = apps.get_mut(handle(app)) else {
        return AETHERIC_INVALID_HANDLE;
    };
    let Some(path) = c_str(path) else {
        return AETHERIC_INVALID_ARGUMENT;
    };

    let config: BindingConfig = match EngineConfig::load(path) {
        Ok(config) => config.bindings,
        Err(e) => {
            warn!(target: "ffi", "Cannot reload bindings from {}: {}", path, e);
            return AETHERIC_INVALID_ARGUMENT;
        }
    };

    match app.reload_bindings_from(&config) {
        Ok(()) => AETHERIC_OK,
        Err(e) => {
            warn!(target: "ffi", "Rejected binding reload from {}: {}", path, e);
            AETHERIC_INVALID_ARGUMENT
        }
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_set_group_enabled(
    session: *const Session,
    app: u64,
    group: u64,
    enabled: bool,
) -> c_int {
    let Some(session) = session_ref(session) else {
        return AETHERIC_INVALID_HANDLE;
    };
    let mut apps = session.apps();
    let Some(app) = apps.get_mut(handle(app)) else {
        return AETHERIC_INVALID_HANDLE;
    };

    match app.set_group_enabled(GroupId::from_raw(group), enabled) {
        Ok(()) => AETHERIC_OK,
        Err(BindingError::NotFound { .. }) => AETHERIC_NOT_FOUND,
        Err(_) => AETHERIC_INVALID_ARGUMENT,
    }
}

/// Asks the application to push `Shutdown` on its next frame.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_app_request_exit(session: *const Session, app: u64) -> c_int {
    let Some(session) = session_ref(session) else {
        return AETHERIC_INVALID_HANDLE;
    };
    match session.apps().get_mut(handle(app)) {
        Some(app) => {
            app.request_exit();
            AETHERIC_OK
        }
        None => AETHERIC_INVALID_HANDLE,
    }
}

//=== Event Queue =========================================================

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_new(session: *const Session) -> u64 {
    match session_ref(session) {
        Some(session) => token(session.event_queues().insert(Arc::new(EventQueue::new()))),
        None => 0,
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_delete(session: *const Session, events: u64) {
    if let Some(session) = session_ref(session) {
        if session.event_queues().remove(handle(events)).is_none() {
            debug!(target: "ffi", "Ignoring release of invalid event queue token {:#x}", events);
        }
    }
}

/// Number of events queued and not yet drained; 0 for an invalid token.
/// Thread-safe.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_len(session: *const Session, events: u64) -> u32 {
    session_ref(session)
        .and_then(|s| s.event_queue(events))
        .map_or(0, |queue| u32::try_from(queue.len()).unwrap_or(u32::MAX))
}

/// Pushes into the queue behind `events` without holding any session lock.
unsafe fn with_queue(session: *const Session, events: u64, push: impl FnOnce(&EventQueue)) -> c_int {
    match session_ref(session).and_then(|s| s.event_queue(events)) {
        Some(queue) => {
            push(&queue);
            AETHERIC_OK
        }
        None => AETHERIC_INVALID_HANDLE,
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_action(session: *const Session, events: u64, id: u64, state: u32) -> c_int {
    let Some(state) = button_state(state) else {
        return AETHERIC_INVALID_ARGUMENT;
    };
    with_queue(session, events, |queue| {
        queue.push_action(ActionId::from_raw(id), state)
    })
}

/// # Safety
///
/// `session` must be null or a live session pointer; `name` must be null
/// or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_action_named(
    session: *const Session,
    events: u64,
    name: *const c_char,
    state: u32,
) -> c_int {
    let (Some(name), Some(state)) = (c_str(name), button_state(state)) else {
        return AETHERIC_INVALID_ARGUMENT;
    };
    with_queue(session, events, |queue| queue.push_action_named(name, state))
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_axis(session: *const Session, events: u64, id: u64, value: f32) -> c_int {
    with_queue(session, events, |queue| {
        queue.push_axis(AxisId::from_raw(id), value)
    })
}

/// # Safety
///
/// `session` must be null or a live session pointer; `name` must be null
/// or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_axis_named(
    session: *const Session,
    events: u64,
    name: *const c_char,
    value: f32,
) -> c_int {
    let Some(name) = c_str(name) else {
        return AETHERIC_INVALID_ARGUMENT;
    };
    with_queue(session, events, |queue| queue.push_axis_named(name, value))
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_cursor_move(session: *const Session, events: u64, dx: f32, dy: f32) -> c_int {
    with_queue(session, events, |queue| queue.push_cursor_move(dx, dy))
}

/// Cursor position in window pixels of a `viewport_width`×`viewport_height`
/// window.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_cursor_position(
    session: *const Session,
    events: u64,
    x: f32,
    y: f32,
    viewport_width: u32,
    viewport_height: u32,
) -> c_int {
    with_queue(session, events, |queue| {
        queue.push_cursor_position(x, y, viewport_width, viewport_height)
    })
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_events_push_close_requested(session: *const Session, events: u64) -> c_int {
    with_queue(session, events, EventQueue::push_close_requested)
}

//=== Request Queue =======================================================

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_new(session: *const Session) -> u64 {
    match session_ref(session) {
        Some(session) => token(session.requests().insert(RequestQueue::new())),
        None => 0,
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_delete(session: *const Session, requests: u64) {
    if let Some(session) = session_ref(session) {
        if session.requests().remove(handle(requests)).is_none() {
            debug!(target: "ffi", "Ignoring release of invalid request queue token {:#x}", requests);
        }
    }
}

unsafe fn request_flag(session: *const Session, requests: u64, flag: impl FnOnce(&RequestQueue) -> bool) -> bool {
    session_ref(session).is_some_and(|s| s.requests().get(handle(requests)).is_some_and(flag))
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_shutdown(session: *const Session, requests: u64) -> bool {
    request_flag(session, requests, RequestQueue::shutdown_requested)
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_reload_bindings(session: *const Session, requests: u64) -> bool {
    request_flag(session, requests, RequestQueue::reload_bindings_requested)
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_recreate_surface(session: *const Session, requests: u64) -> bool {
    request_flag(session, requests, RequestQueue::recreate_surface_requested)
}

/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_requests_reset(session: *const Session, requests: u64) {
    if let Some(session) = session_ref(session) {
        if let Some(queue) = session.requests().get_mut(handle(requests)) {
            queue.reset();
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::{aetheric_session_delete, aetheric_session_new};
    use std::io::Write;

    struct Fixture {
        session: *mut Session,
        app: u64,
        events: u64,
        requests: u64,
    }

    impl Fixture {
        fn new() -> Self {
            let session = aetheric_session_new();
            unsafe {
                Self {
                    session,
                    app: aetheric_app_new(session),
                    events: aetheric_events_new(session),
                    requests: aetheric_requests_new(session),
                }
            }
        }

        fn progress(&self, dt: f32) -> bool {
            unsafe { aetheric_app_progress(self.session, self.app, self.events, self.requests, 0, dt) }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            unsafe { aetheric_session_delete(&mut self.session) };
        }
    }

    fn bindings_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[bindings.groups]]\nname = \"gameplay\"\n\n[[bindings.actions]]\nname = \"jump\"\ngroup = \"gameplay\""
        )
        .unwrap();
        file
    }

    #[test]
    fn tokens_are_non_zero_and_release_is_idempotent() {
        let fx = Fixture::new();
        assert!(fx.app != 0 && fx.events != 0 && fx.requests != 0);

        unsafe {
            aetheric_app_delete(fx.session, fx.app);
            aetheric_app_delete(fx.session, fx.app);
            aetheric_app_delete(fx.session, 0);
            aetheric_events_delete(fx.session, fx.events);
            aetheric_events_delete(fx.session, fx.events);
            aetheric_requests_delete(fx.session, fx.requests);
            aetheric_requests_delete(fx.session, fx.requests);
        }

        assert!(!fx.progress(0.016));
    }

    #[test]
    fn null_session_is_rejected_everywhere() {
        let null = std::ptr::null_mut();

        unsafe {
            assert_eq!(aetheric_app_new(null), 0);
            assert_eq!(aetheric_events_new(null), 0);
            assert_eq!(aetheric_events_push_close_requested(null, 1), AETHERIC_INVALID_HANDLE);
            assert!(!aetheric_app_progress(null, 1, 1, 1, 0, 0.016));
            aetheric_requests_reset(null, 1);
        }
    }

    #[test]
    fn unknown_ids_are_dropped_without_requests() {
        let fx = Fixture::new();

        unsafe {
            assert_eq!(
                aetheric_events_push_action(fx.session, fx.events, 0xdead_beef, AETHERIC_ACTION_PRESSED),
                AETHERIC_OK
            );
        }

        assert!(fx.progress(0.016));
        unsafe {
            assert!(!aetheric_requests_shutdown(fx.session, fx.requests));
            assert!(!aetheric_requests_reload_bindings(fx.session, fx.requests));
            assert!(!aetheric_requests_recreate_surface(fx.session, fx.requests));
        }
    }

    #[test]
    fn invalid_state_and_name_are_invalid_arguments() {
        let fx = Fixture::new();

        unsafe {
            assert_eq!(
                aetheric_events_push_action(fx.session, fx.events, 1, 7),
                AETHERIC_INVALID_ARGUMENT
            );
            assert_eq!(
                aetheric_events_push_axis_named(fx.session, fx.events, std::ptr::null(), 1.0),
                AETHERIC_INVALID_ARGUMENT
            );
            assert_eq!(aetheric_events_len(fx.session, fx.events), 0);
        }
    }

    #[test]
    fn pushes_are_queued_in_order() {
        let fx = Fixture::new();

        unsafe {
            aetheric_events_push_action_named(fx.session, fx.events, c"jump".as_ptr(), AETHERIC_ACTION_PRESSED);
            aetheric_events_push_axis(fx.session, fx.events, 42, 0.5);
            aetheric_events_push_cursor_move(fx.session, fx.events, 1.0, 2.0);
            aetheric_events_push_cursor_position(fx.session, fx.events, 3.0, 4.0, 640, 400);
            assert_eq!(aetheric_events_len(fx.session, fx.events), 4);
        }

        assert!(fx.progress(0.016));
        unsafe { assert_eq!(aetheric_events_len(fx.session, fx.events), 0) };
    }

    #[test]
    fn close_requested_ends_progress() {
        let fx = Fixture::new();

        unsafe { aetheric_events_push_close_requested(fx.session, fx.events) };

        assert!(!fx.progress(0.016));
        assert!(!fx.progress(0.016));
    }

    #[test]
    fn request_exit_sets_shutdown_until_reset() {
        let fx = Fixture::new();

        unsafe {
            assert_eq!(aetheric_app_request_exit(fx.session, fx.app), AETHERIC_OK);
            assert!(fx.progress(0.016));
            assert!(aetheric_requests_shutdown(fx.session, fx.requests));
            aetheric_requests_reset(fx.session, fx.requests);
            assert!(!aetheric_requests_shutdown(fx.session, fx.requests));
        }
    }

    #[test]
    fn app_from_config_resolves_named_actions() {
        let file = bindings_file();
        let path = std::ffi::CString::new(file.path().to_str().unwrap()).unwrap();
        let mut fx = Fixture::new();

        unsafe {
            fx.app = aetheric_app_new_from_config(fx.session, path.as_ptr());
            assert_ne!(fx.app, 0);
            aetheric_events_push_action_named(fx.session, fx.events, c"jump".as_ptr(), AETHERIC_ACTION_PRESSED);
        }
        assert!(fx.progress(0.016));

        let session = unsafe { &*fx.session };
        let apps = session.apps();
        let app = apps.get(handle(fx.app)).unwrap();
        let jump = app.action_id("jump").unwrap();
        assert!(app.input().is_pressed(jump));
    }

    #[test]
    fn producer_thread_pushes_while_frame_thread_works() {
        const PUSHES: usize = 20_000;
        let fx = Fixture::new();
        let shared = fx.session as usize;
        let events = fx.events;

        let producer = std::thread::spawn(move || {
            let session = shared as *const Session;
            for _ in 0..PUSHES {
                let status = unsafe { aetheric_events_push_cursor_move(session, events, 1.0, 0.0) };
                assert_eq!(status, AETHERIC_OK);
            }
        });

        let mut scratch = Vec::new();
        while !producer.is_finished() {
            unsafe {
                scratch.push(aetheric_events_new(fx.session));
                scratch.push(aetheric_requests_new(fx.session));
            }
            assert!(fx.progress(0.016));
        }
        producer.join().unwrap();
        assert!(fx.progress(0.016));

        let session = unsafe { &*fx.session };
        let apps = session.apps();
        let cursor = apps.get(handle(fx.app)).unwrap().input().cursor_position();
        assert_eq!(cursor.0, PUSHES as f32);
        assert_eq!(unsafe { aetheric_events_len(fx.session, events) }, 0);
        assert!(scratch.iter().all(|token| *token != 0));
    }

    #[test]
    fn reload_bindings_raises_request() {
        let file = bindings_file();
        let path = std::ffi::CString::new(file.path().to_str().unwrap()).unwrap();
        let fx = Fixture::new();

        unsafe {
            assert_eq!(aetheric_app_reload_bindings(fx.session, fx.app, path.as_ptr()), AETHERIC_OK);
            assert!(fx.progress(0.016));
            assert!(aetheric_requests_reload_bindings(fx.session, fx.requests));
            assert_eq!(
                aetheric_app_reload_bindings(fx.session, fx.app, c"/definitely/not/here.toml".as_ptr()),
                AETHERIC_INVALID_ARGUMENT
            );
        }
    }

    #[test]
    fn unknown_group_is_not_found() {
        let fx = Fixture::new();

        unsafe {
            assert_eq!(
                aetheric_app_set_group_enabled(fx.session, fx.app, 99, false),
                AETHERIC_NOT_FOUND
            );
        }
    }
}
