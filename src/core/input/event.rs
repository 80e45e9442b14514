//=========================================================================
// Input Event Types
//
// Host-originated input, in two forms:
//
// - `RawInputEvent`: what the host pushes. Actions and axes may be named
//   either by stable id or by binding name.
// - `InputEvent`: the resolved form. Every action/axis reference is an id
//   known to the binding table and cursor positions are in logical space.
//
// Event Flow:
// ```text
// Host / Platform adapter
//         ↓
//    RawInputEvent (this module)
//         ↓  EventQueue::drain()
//    BindingTable resolution (unknown ids/names dropped)
//         ↓
//    InputEvent → StateTracker
// ```
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::binding::{ActionId, AxisId};

//=== ButtonState =========================================================

/// Binary state carried by action events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
}

impl ButtonState {
    #[inline]
    pub fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

impl From<bool> for ButtonState {
    fn from(pressed: bool) -> Self {
        if pressed {
            Self::Pressed
        } else {
            Self::Released
        }
    }
}

//=== InputRef ============================================================

/// Reference to a binding, by stable id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputRef<I> {
    Id(I),
    Name(String),
}

//=== RawInputEvent =======================================================

/// Input event as pushed by the host, before binding resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    /// Action pressed or released.
    Action {
        action: InputRef<ActionId>,
        state: ButtonState,
    },

    /// New raw axis value (mapped through the axis range on resolution).
    Axis { axis: InputRef<AxisId>, value: f32 },

    /// Relative cursor motion.
    CursorMove { delta: (f32, f32) },

    /// Absolute cursor position in window pixels, with the window size.
    CursorPosition {
        x: f32,
        y: f32,
        viewport_width: u32,
        viewport_height: u32,
    },

    /// The host window was asked to close.
    CloseRequested,
}

impl RawInputEvent {
    pub fn action(id: ActionId, state: ButtonState) -> Self {
        Self::Action {
            action: InputRef::Id(id),
            state,
        }
    }

    pub fn action_named(name: impl Into<String>, state: ButtonState) -> Self {
        Self::Action {
            action: InputRef::Name(name.into()),
            state,
        }
    }

    pub fn axis(id: AxisId, value: f32) -> Self {
        Self::Axis {
            axis: InputRef::Id(id),
            value,
        }
    }

    pub fn axis_named(name: impl Into<String>, value: f32) -> Self {
        Self::Axis {
            axis: InputRef::Name(name.into()),
            value,
        }
    }

    pub fn cursor_move(dx: f32, dy: f32) -> Self {
        Self::CursorMove { delta: (dx, dy) }
    }

    pub fn cursor_position(x: f32, y: f32, viewport_width: u32, viewport_height: u32) -> Self {
        Self::CursorPosition {
            x,
            y,
            viewport_width,
            viewport_height,
        }
    }
}

//=== InputEvent ==========================================================

/// Resolved input event consumed by the live input state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Action { id: ActionId, state: ButtonState },
    Axis { id: AxisId, value: f32 },
    CursorMove { delta: (f32, f32) },
    /// Position in logical-resolution space.
    CursorPosition { position: (f32, f32) },
    CloseRequested,
}

//=========================================================================
// Unit Tests
//=========================================================================
