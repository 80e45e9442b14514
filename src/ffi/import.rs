//=========================================================================
// Import Entry Points
//=========================================================================
//
// Thin wrappers over `crate::import`. A failed import returns
// `AETHERIC_IMPORT_FAILED` and leaves the event queue untouched.
//
//=========================================================================

use std::ffi::{c_char, c_int};

use super::{c_str, session_ref, Session};
use super::{AETHERIC_IMPORT_FAILED, AETHERIC_INVALID_ARGUMENT, AETHERIC_INVALID_HANDLE, AETHERIC_OK};
use crate::core::EventQueue;
use crate::import::{self, ImportError};

/// `name` may be null: the name is then derived from the file.
unsafe fn import_into(
    session: *const Session,
    events: u64,
    source: *const c_char,
    name: *const c_char,
    run: impl FnOnce(&str, Option<&str>, &EventQueue) -> Result<usize, ImportError>,
) -> c_int {
    let Some(queue) = session_ref(session).and_then(|s| s.event_queue(events)) else {
        return AETHERIC_INVALID_HANDLE;
    };
    let Some(source) = c_str(source) else {
        return AETHERIC_INVALID_ARGUMENT;
    };
    let name = if name.is_null() {
        None
    } else {
        match c_str(name) {
            Some(name) => Some(name),
            None => return AETHERIC_INVALID_ARGUMENT,
        }
    };

    match run(source, name, &queue) {
        Ok(_) => AETHERIC_OK,
        Err(_) => AETHERIC_IMPORT_FAILED,
    }
}

/// Imports every object of an OBJ file into `events`. Thread-safe: may
/// run on a loader thread while the frame thread calls
/// `aetheric_app_progress`.
///
/// # Safety
///
/// `session` must be null or a live session pointer; `obj_source` and
/// `name` must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_import_model(
    session: *const Session,
    events: u64,
    obj_source: *const c_char,
    name: *const c_char,
    flat_normals: bool,
) -> c_int {
    import_into(session, events, obj_source, name, |source, name, queue| {
        import::import_model(source, name, flat_normals, queue)
    })
}

/// Imports an image as an RGBA8 texture into `events`.
///
/// # Safety
///
/// `session` must be null or a live session pointer; `source` and `name`
/// must be null or NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn aetheric_import_image(
    session: *const Session,
    events: u64,
    source: *const c_char,
    name: *const c_char,
) -> c_int {
    import_into(session, events, source, name, |source, name, queue| {
        import::import_image(source, name, queue)
    })
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::app::{
        aetheric_app_new, aetheric_app_progress, aetheric_events_len, aetheric_events_new, aetheric_requests_new,
    };
    use crate::ffi::{aetheric_session_delete, aetheric_session_new};
    use std::ffi::CString;

    fn c_path(path: &std::path::Path) -> CString {
        CString::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn imported_mesh_reaches_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let source = c_path(&path);
        let mut session = aetheric_session_new();

        unsafe {
            let app = aetheric_app_new(session);
            let events = aetheric_events_new(session);
            let requests = aetheric_requests_new(session);

            assert_eq!(
                aetheric_import_model(session, events, source.as_ptr(), c"triangle".as_ptr(), true),
                AETHERIC_OK
            );
            assert!(aetheric_app_progress(session, app, events, requests, 0, 0.016));

            {
                let apps = (*session).apps();
                let registry = apps.get(crate::ffi::handle(app)).unwrap().assets();
                assert_eq!(registry.mesh("triangle").map(|m| m.triangle_count()), Some(1));
            }
            aetheric_session_delete(&mut session);
        }
    }

    #[test]
    fn corrupt_source_keeps_queue_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.obj");
        std::fs::write(&path, "v 0 0 0\nv nope\nf 1 2 3\n").unwrap();
        let source = c_path(&path);
        let mut session = aetheric_session_new();

        unsafe {
            let events = aetheric_events_new(session);
            crate::ffi::app::aetheric_events_push_cursor_move(session, events, 1.0, 1.0);

            assert_eq!(
                aetheric_import_model(session, events, source.as_ptr(), std::ptr::null(), false),
                AETHERIC_IMPORT_FAILED
            );
            assert_eq!(
                aetheric_import_image(session, events, source.as_ptr(), std::ptr::null()),
                AETHERIC_IMPORT_FAILED
            );
            assert_eq!(aetheric_events_len(session, events), 1);
            aetheric_session_delete(&mut session);
        }
    }

    #[test]
    fn bad_arguments_are_rejected() {
        let mut session = aetheric_session_new();

        unsafe {
            let events = aetheric_events_new(session);
            assert_eq!(
                aetheric_import_image(session, events, std::ptr::null(), std::ptr::null()),
                AETHERIC_INVALID_ARGUMENT
            );
            assert_eq!(
                aetheric_import_image(session, 0, c"a.png".as_ptr(), std::ptr::null()),
                AETHERIC_INVALID_HANDLE
            );
            aetheric_session_delete(&mut session);
        }
    }
}
