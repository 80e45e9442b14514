//=========================================================================
// Input System
//
// High-level interface for input handling within the engine core.
// Resolves raw host events against the current binding table and feeds
// the live `StateTracker`, exposing per-frame queries to application code.
//
// Responsibilities:
// - Normalize id-or-name raw events into resolved `InputEvent`s
// - Map window-space cursor positions into logical space
// - Drop events whose binding is unknown (forward/backward compatible
//   across binding reloads)
// - Expose read-only queries (actions, axes, cursor)
//
// Notes:
// This system is owned and updated by the `Application` frame step.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod binding;
pub mod database;
pub mod event;
pub mod state_tracker;
pub mod table;
pub mod viewport;

//=== Internal Imports ====================================================

use binding::{ActionId, AxisId, GroupId};
use event::{InputEvent, RawInputEvent};
use state_tracker::StateTracker;
use table::BindingTable;
use viewport::{LogicalResolution, Viewport};

//=== External Crates =====================================================

use log::trace;

//=== FrameInput ==========================================================

/// Summary of one frame's worth of processed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Events applied to live state.
    pub applied: usize,
    /// Events dropped during resolution or ignored by a disabled group.
    pub dropped: usize,
    /// A `CloseRequested` event was seen.
    pub close_requested: bool,
}

//=== InputSystem =========================================================
//
// Owns the application's live input state and provides access to it.
//
pub struct InputSystem {
    tracker: StateTracker,
    logical: LogicalResolution,
}

impl InputSystem {
    //--- Construction -----------------------------------------------------

    pub fn new(logical: LogicalResolution) -> Self {
        Self {
            tracker: StateTracker::new(),
            logical,
        }
    }

    pub fn logical_resolution(&self) -> LogicalResolution {
        self.logical
    }

    //--- Frame Step -------------------------------------------------------

    /// Starts a frame: clears edges and cursor motion.
    pub fn begin_frame(&mut self) {
        self.tracker.clear();
    }

    /// Resolves and applies one frame's raw events, in order.
    pub fn process_events(&mut self, events: &[RawInputEvent], table: &BindingTable) -> FrameInput {
        let mut frame = FrameInput::default();
        let mut resolved = Vec::with_capacity(events.len());

        for raw in events {
            match resolve(raw, table, self.logical) {
                Some(InputEvent::CloseRequested) => {
                    frame.close_requested = true;
                    resolved.push(InputEvent::CloseRequested);
                }
                Some(event) => resolved.push(event),
                None => {
                    trace!(target: "core::input", "Dropped unresolvable event: {:?}", raw);
                    frame.dropped += 1;
                }
            }
        }

        frame.applied = self.tracker.process_events(&resolved, table);
        frame.dropped += resolved.len() - frame.applied;
        frame
    }

    /// Advances time-dependent input state (hold timers).
    pub fn advance(&mut self, dt: f32) {
        self.tracker.advance(dt);
    }

    /// Forgets state belonging to bindings absent from `table`.
    pub fn retain_bindings(&mut self, table: &BindingTable) {
        self.tracker.retain_bindings(table);
    }

    pub fn set_group_enabled(&mut self, group: GroupId, enabled: bool, table: &BindingTable) {
        self.tracker.set_group_enabled(group, enabled, table);
    }

    //--- Query Methods ----------------------------------------------------

    pub fn state(&self) -> &StateTracker {
        &self.tracker
    }

    pub fn is_pressed(&self, action: ActionId) -> bool {
        self.tracker.is_pressed(action)
    }

    pub fn is_just_pressed(&self, action: ActionId) -> bool {
        self.tracker.is_just_pressed(action)
    }

    pub fn is_just_released(&self, action: ActionId) -> bool {
        self.tracker.is_just_released(action)
    }

    pub fn axis(&self, axis: AxisId) -> f32 {
        self.tracker.axis(axis)
    }

    pub fn cursor_position(&self) -> (f32, f32) {
        self.tracker.cursor_position()
    }

    pub fn cursor_motion(&self) -> (f32, f32) {
        self.tracker.cursor_motion()
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new(LogicalResolution::default())
    }
}

//=== Resolution ==========================================================

/// Converts a raw event into its resolved form, or `None` when its binding
/// is unknown or its viewport is empty.
pub fn resolve(raw: &RawInputEvent, table: &BindingTable, logical: LogicalResolution) -> Option<InputEvent> {
    match raw {
        RawInputEvent::Action { action, state } => table
            .resolve_action(action)
            .map(|id| InputEvent::Action { id, state: *state }),

        RawInputEvent::Axis { axis, value } => table
            .resolve_axis(axis)
            .map(|id| InputEvent::Axis { id, value: *value }),

        RawInputEvent::CursorMove { delta } => Some(InputEvent::CursorMove { delta: *delta }),

        RawInputEvent::CursorPosition {
            x,
            y,
            viewport_width,
            viewport_height,
        } => Viewport::letterbox(*viewport_width, *viewport_height, logical).map(|viewport| {
            InputEvent::CursorPosition {
                position: viewport.to_logical(*x, *y),
            }
        }),

        RawInputEvent::CloseRequested => Some(InputEvent::CloseRequested),
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
