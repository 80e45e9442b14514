//=========================================================================
// Binding Database Export
//=========================================================================
//
// `aetheric_input_database_read` copies the current generation's ids into
// three heap arrays owned by the returned struct; the host releases them
// with `aetheric_input_database_free`, which nulls the struct so a second
// free is harmless.
//
// Point lookups fill a caller-provided record with a NUL-terminated,
// zero-padded 128-byte name.
//
//=========================================================================

use std::ffi::{c_char, c_int};
use std::ptr;
use std::sync::Arc;

use super::{session_ref, Session};
use super::{AETHERIC_INVALID_ARGUMENT, AETHERIC_INVALID_HANDLE, AETHERIC_NOT_FOUND, AETHERIC_OK};
use crate::core::input::binding::{ActionId, AxisId, BindingError, BindingName, GroupId, NAME_BUFFER_LEN};
use crate::core::input::database::InputBindingDatabase;

//=== Records =============================================================

#[repr(C)]
#[derive(Debug)]
pub struct AethericInputDatabase {
    pub actions: *mut u64,
    pub action_count: u32,
    pub axes: *mut u64,
    pub axis_count: u32,
    pub groups: *mut u64,
    pub group_count: u32,
}

impl AethericInputDatabase {
    const EMPTY: Self = Self {
        actions: ptr::null_mut(),
        action_count: 0,
        axes: ptr::null_mut(),
        axis_count: 0,
        groups: ptr::null_mut(),
        group_count: 0,
    };
}

#[repr(C)]
#[derive(Debug)]
pub struct AethericInputAction {
    pub name: [c_char; NAME_BUFFER_LEN],
    pub group: u64,
}

#[repr(C)]
#[derive(Debug)]
pub struct AethericInputAxis {
    pub name: [c_char; NAME_BUFFER_LEN],
    pub group: u64,
}

#[repr(C)]
#[derive(Debug)]
pub struct AethericInputGroup {
    pub name: [c_char; NAME_BUFFER_LEN],
}

//=== Export ==============================================================

fn export_ids(ids: Vec<u64>) -> (*mut u64, u32) {
    if ids.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let count = ids.len() as u32;
    (Box::into_raw(ids.into_boxed_slice()).cast::<u64>(), count)
}

/// # Safety
///
/// `ids`/`count` must come from [`export_ids`] and not have been freed.
unsafe fn free_ids(ids: &mut *mut u64, count: &mut u32) {
    if !ids.is_null() {
        let slice = ptr::slice_from_raw_parts_mut(*ids, *count as usize);
        drop(Box::from_raw(slice));
    }
    *ids = ptr::null_mut();
    *count = 0;
}

/// Snapshot of every binding id. All arrays are null for an invalid token.
///
/// # Safety
///
/// `session` must be null or a live session pointer.
#[no_mangle]
pub unsafe extern "C" fn aetheric_input_database_read(session: *const Session, app: u64) -> AethericInputDatabase {
    let Some(bindings) = session_ref(session).and_then(|s| s.bindings(app)) else {
        return AethericInputDatabase::EMPTY;
    };

    let snapshot = bindings.export_snapshot();
    let (actions, action_count) = export_ids(snapshot.actions.iter().map(|id| id.to_raw()).collect());
    let (axes, axis_count) = export_ids(snapshot.axes.iter().map(|id| id.to_raw()).collect());
    let (groups, group_count) = export_ids(snapshot.groups.iter().map(|id| id.to_raw()).collect());

    AethericInputDatabase {
        actions,
        action_count,
        axes,
        axis_count,
        groups,
        group_count,
    }
}

/// Releases the arrays of a snapshot and nulls them.
///
/// # Safety
///
/// `database` must be null or point to a struct returned by
/// [`aetheric_input_database_read`] (possibly already freed).
#[no_mangle]
pub unsafe extern "C" fn aetheric_input_database_free(database: *mut AethericInputDatabase) {
    let Some(database) = database.as_mut() else {
        return;
    };
    free_ids(&mut database.actions, &mut database.action_count);
    free_ids(&mut database.axes, &mut database.axis_count);
    free_ids(&mut database.groups, &mut database.group_count);
}

//=== Point Lookups =======================================================

fn name_buffer(name: &BindingName) -> [c_char; NAME_BUFFER_LEN] {
    name.to_buffer().map(|byte| byte as c_char)
}

fn status(error: &BindingError) -> c_int {
    match error {
        BindingError::NotFound { .. } => AETHERIC_NOT_FOUND,
        _ => AETHERIC_INVALID_ARGUMENT,
    }
}

unsafe fn lookup<'a, T>(
    session: *const Session,
    app: u64,
    out: *mut T,
) -> Result<(Arc<InputBindingDatabase>, &'a mut T), c_int> {
    let bindings = session_ref(session)
        .and_then(|s| s.bindings(app))
        .ok_or(AETHERIC_INVALID_HANDLE)?;
    let out = out.as_mut().ok_or(AETHERIC_INVALID_ARGUMENT)?;
    Ok((bindings, out))
}

/// # Safety
///
/// `session` must be null or a live session pointer; `action` must be null
/// or writable.
#[no_mangle]
pub unsafe extern "C" fn aetheric_input_database_get_action(
    session: *const Session,
    app: u64,
    id: u64,
    action: *mut AethericInputAction,
) -> c_int {
    let (bindings, out) = match lookup(session, app, action) {
        Ok(found) => found,
        Err(code) => return code,
    };
    match bindings.action(ActionId::from_raw(id)) {
        Ok(record) => {
            out.name = name_buffer(&record.name);
            out.group = record.group.to_raw();
            AETHERIC_OK
        }
        Err(e) => status(&e),
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer; `axis` must be null
/// or writable.
#[no_mangle]
pub unsafe extern "C" fn aetheric_input_database_get_axis(
    session: *const Session,
    app: u64,
    id: u64,
    axis: *mut AethericInputAxis,
) -> c_int {
    let (bindings, out) = match lookup(session, app, axis) {
        Ok(found) => found,
        Err(code) => return code,
    };
    match bindings.axis(AxisId::from_raw(id)) {
        Ok(record) => {
            out.name = name_buffer(&record.name);
            out.group = record.group.to_raw();
            AETHERIC_OK
        }
        Err(e) => status(&e),
    }
}

/// # Safety
///
/// `session` must be null or a live session pointer; `group` must be null
/// or writable.
#[no_mangle]
pub unsafe extern "C" fn aetheric_input_database_get_group(
    session: *const Session,
    app: u64,
    id: u64,
    group: *mut AethericInputGroup,
) -> c_int {
    let (bindings, out) = match lookup(session, app, group) {
        Ok(found) => found,
        Err(code) => return code,
    };
    match bindings.group(GroupId::from_raw(id)) {
        Ok(record) => {
            out.name = name_buffer(&record.name);
            AETHERIC_OK
        }
        Err(e) => status(&e),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
