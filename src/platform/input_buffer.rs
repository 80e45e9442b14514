//=========================================================================
// Input Buffer
//
// Collects raw input events between two redraws so they reach the event
// queue as one batch per frame.
//
// Responsibilities:
// - Keep arrival order (delivery order is push order)
// - Drop consecutive duplicate discrete events (e.g. key auto-repeat)
// - Coalesce consecutive continuous events (cursor motion/position)
//
// Notes:
// The buffer lives on the event-loop thread and is drained on every
// `RedrawRequested`.
//=========================================================================

//=== Internal Modules ====================================================

use crate::core::event_queue::AppEvent;
use crate::core::input::event::RawInputEvent;

//=== InputBuffer Struct ==================================================

pub(crate) struct InputBuffer {
    events: Vec<RawInputEvent>,
}

impl InputBuffer {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        const BASE_CAPACITY: usize = 128;

        Self {
            events: Vec::with_capacity(BASE_CAPACITY),
        }
    }

    //--- Discrete Event Handling -----------------------------------------
    //
    // Appends a discrete input (action, axis value, close request).
    // A repeat of the immediately preceding event is ignored.
    //
    pub(crate) fn push_discrete(&mut self, event: RawInputEvent) {
        if self.events.last() != Some(&event) {
            self.events.push(event);
        }
    }

    //--- Continuous Event Handling ---------------------------------------
    //
    // Cursor motion directly following cursor motion is summed; a cursor
    // position directly following a cursor position replaces it.
    //
    pub(crate) fn push_continuous(&mut self, event: RawInputEvent) {
        if let RawInputEvent::CursorMove { delta: (dx, dy) } = event {
            if let Some(RawInputEvent::CursorMove { delta }) = self.events.last_mut() {
                delta.0 += dx;
                delta.1 += dy;
                return;
            }
        }

        if matches!(event, RawInputEvent::CursorPosition { .. }) {
            if let Some(last @ RawInputEvent::CursorPosition { .. }) = self.events.last_mut() {
                *last = event;
                return;
            }
        }

        self.events.push(event);
    }

    //--- Drain ------------------------------------------------------------

    /// Returns the frame's events as queue entries and empties the buffer,
    /// keeping its capacity.
    pub(crate) fn drain(&mut self) -> Vec<AppEvent> {
        self.events.drain(..).map(AppEvent::Input).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
