//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit events into name-based raw input events.
//
// Architecture:
//   Winit Events → InputProcessor (KeyMap) → RawInputEvent → InputBuffer
//
// Keys and buttons absent from the key map are filtered (returns nothing).
// Axis keys are stateful: the processor remembers which axis keys are held
// and emits the summed value of the axis on every change.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{KeyCode, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use super::keymap::{InputSource, KeyMap};
use crate::core::input::event::{ButtonState, RawInputEvent};

//=== InputProcessor ======================================================

pub(crate) struct InputProcessor {
    keymap: KeyMap,
    held_axis_keys: HashSet<KeyCode>,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            held_axis_keys: HashSet::new(),
        }
    }

    //--- Event Processing -------------------------------------------------

    /// Converts a Winit key event. Auto-repeats and unmapped keys yield nothing.
    pub(crate) fn process_key_event(&mut self, key_event: &KeyEvent) -> Vec<RawInputEvent> {
        if key_event.repeat {
            return Vec::new();
        }
        match key_event.physical_key {
            PhysicalKey::Code(code) => self.process_key(code, key_event.state),
            PhysicalKey::Unidentified(_) => Vec::new(),
        }
    }

    pub(crate) fn process_key(&mut self, code: KeyCode, state: ElementState) -> Vec<RawInputEvent> {
        let mut events = Vec::new();

        if let Some(action) = self.keymap.action_for(InputSource::Key(code)) {
            events.push(RawInputEvent::action_named(action, button_state(state)));
        }

        if let Some((axis, _)) = self.keymap.axis_for(code) {
            let changed = match state {
                ElementState::Pressed => self.held_axis_keys.insert(code),
                ElementState::Released => self.held_axis_keys.remove(&code),
            };
            if changed {
                let value = self.axis_value(axis);
                events.push(RawInputEvent::axis_named(axis, value));
            }
        }

        events
    }

    pub(crate) fn process_mouse_button(&self, button: MouseButton, state: ElementState) -> Option<RawInputEvent> {
        self.keymap
            .action_for(InputSource::Mouse(button))
            .map(|action| RawInputEvent::action_named(action, button_state(state)))
    }

    /// Absolute cursor position in window pixels.
    pub(crate) fn process_cursor_moved(&self, x: f64, y: f64, window_size: (u32, u32)) -> RawInputEvent {
        RawInputEvent::cursor_position(x as f32, y as f32, window_size.0, window_size.1)
    }

    /// Raw relative mouse motion.
    pub(crate) fn process_mouse_motion(&self, dx: f64, dy: f64) -> RawInputEvent {
        RawInputEvent::cursor_move(dx as f32, dy as f32)
    }

    /// Releases every held axis key (e.g. on focus loss), returning the
    /// resulting axis updates.
    pub(crate) fn release_all(&mut self) -> Vec<RawInputEvent> {
        let held: Vec<KeyCode> = self.held_axis_keys.iter().copied().collect();
        held.into_iter()
            .flat_map(|code| self.process_key(code, ElementState::Released))
            .collect()
    }

    //--- Internal Helpers -------------------------------------------------

    fn axis_value(&self, axis: &str) -> f32 {
        self.keymap
            .axis_keys(axis)
            .filter(|(key, _)| self.held_axis_keys.contains(key))
            .map(|(_, value)| value)
            .sum()
    }
}

fn button_state(state: ElementState) -> ButtonState {
    ButtonState::from(state.is_pressed())
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::keymap::{AxisKeyConfig, KeyMapConfig};

    fn processor() -> InputProcessor {
        let mut config = KeyMapConfig::default();
        config.actions.insert("Space".into(), "jump".into());
        config.actions.insert("MouseLeft".into(), "fire".into());
        config.axes.push(AxisKeyConfig { key: "KeyD".into(), axis: "move_x".into(), value: 1.0 });
        config.axes.push(AxisKeyConfig { key: "KeyA".into(), axis: "move_x".into(), value: -1.0 });
        InputProcessor::new(KeyMap::from_config(&config).unwrap())
    }

    #[test]
    fn mapped_key_becomes_named_action() {
        let mut processor = processor();

        assert_eq!(
            processor.process_key(KeyCode::Space, ElementState::Pressed),
            vec![RawInputEvent::action_named("jump", ButtonState::Pressed)]
        );
        assert_eq!(
            processor.process_key(KeyCode::Space, ElementState::Released),
            vec![RawInputEvent::action_named("jump", ButtonState::Released)]
        );
    }

    #[test]
    fn unmapped_inputs_are_filtered() {
        let mut processor = processor();

        assert!(processor.process_key(KeyCode::KeyQ, ElementState::Pressed).is_empty());
        assert!(processor.process_mouse_button(MouseButton::Right, ElementState::Pressed).is_none());
    }

    #[test]
    fn mouse_button_becomes_named_action() {
        let processor = processor();

        assert_eq!(
            processor.process_mouse_button(MouseButton::Left, ElementState::Pressed),
            Some(RawInputEvent::action_named("fire", ButtonState::Pressed))
        );
    }

    #[test]
    fn opposing_axis_keys_sum() {
        let mut processor = processor();

        assert_eq!(
            processor.process_key(KeyCode::KeyD, ElementState::Pressed),
            vec![RawInputEvent::axis_named("move_x", 1.0)]
        );
        assert_eq!(
            processor.process_key(KeyCode::KeyA, ElementState::Pressed),
            vec![RawInputEvent::axis_named("move_x", 0.0)]
        );
        assert_eq!(
            processor.process_key(KeyCode::KeyD, ElementState::Released),
            vec![RawInputEvent::axis_named("move_x", -1.0)]
        );
    }

    #[test]
    fn release_all_zeroes_axes() {
        let mut processor = processor();
        processor.process_key(KeyCode::KeyD, ElementState::Pressed);

        assert_eq!(processor.release_all(), vec![RawInputEvent::axis_named("move_x", 0.0)]);
        assert!(processor.release_all().is_empty());
    }

    #[test]
    fn cursor_events_carry_window_size() {
        let processor = processor();

        assert_eq!(
            processor.process_cursor_moved(10.5, 20.0, (800, 600)),
            RawInputEvent::cursor_position(10.5, 20.0, 800, 600)
        );
        assert_eq!(processor.process_mouse_motion(1.0, -2.0), RawInputEvent::cursor_move(1.0, -2.0));
    }
}
