//=========================================================================
// Key Map
//=========================================================================
//
// Host-side mapping from physical keys and mouse buttons to binding names.
//
// Architecture:
//   KeyMapConfig (names, TOML) → KeyMap::from_config() → KeyMap (winit codes)
//
// Key names follow winit's physical `KeyCode` names ("KeyA", "Digit1",
// "ArrowLeft", "Space", ...). Mouse buttons are "MouseLeft",
// "MouseRight", "MouseMiddle", "MouseBack" and "MouseForward".
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use winit::{event::MouseButton, keyboard::KeyCode};

//=== Internal Dependencies ===============================================

use crate::config::ConfigError;

//=== Configuration =======================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMapConfig {
    /// Key or mouse button name → action name.
    pub actions: BTreeMap<String, String>,
    /// Keys driving axes while held.
    pub axes: Vec<AxisKeyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisKeyConfig {
    pub key: String,
    pub axis: String,
    /// Contribution to the axis while the key is held.
    pub value: f32,
}

//=== InputSource =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Key(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "MouseLeft" => Some(Self::Mouse(MouseButton::Left)),
            "MouseRight" => Some(Self::Mouse(MouseButton::Right)),
            "MouseMiddle" => Some(Self::Mouse(MouseButton::Middle)),
            "MouseBack" => Some(Self::Mouse(MouseButton::Back)),
            "MouseForward" => Some(Self::Mouse(MouseButton::Forward)),
            _ => parse_key_code(name).map(Self::Key),
        }
    }
}

//=== KeyMap ==============================================================

#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    actions: HashMap<InputSource, String>,
    axes: HashMap<KeyCode, (String, f32)>,
}

impl KeyMap {
    pub fn from_config(config: &KeyMapConfig) -> Result<Self, ConfigError> {
        let mut map = Self::default();

        for (source, action) in &config.actions {
            let source = InputSource::parse(source)
                .ok_or_else(|| ConfigError::UnknownInput(source.clone()))?;
            map.actions.insert(source, action.clone());
        }

        for binding in &config.axes {
            let Some(InputSource::Key(key)) = InputSource::parse(&binding.key) else {
                return Err(ConfigError::UnknownInput(binding.key.clone()));
            };
            map.axes.insert(key, (binding.axis.clone(), binding.value));
        }

        Ok(map)
    }

    pub fn action_for(&self, source: InputSource) -> Option<&str> {
        self.actions.get(&source).map(String::as_str)
    }

    /// Axis name and contribution of a held key.
    pub fn axis_for(&self, key: KeyCode) -> Option<(&str, f32)> {
        self.axes.get(&key).map(|(axis, value)| (axis.as_str(), *value))
    }

    /// Keys contributing to `axis`.
    pub fn axis_keys<'a>(&'a self, axis: &'a str) -> impl Iterator<Item = (KeyCode, f32)> + 'a {
        self.axes
            .iter()
            .filter(move |(_, (name, _))| name == axis)
            .map(|(key, (_, value))| (*key, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.axes.is_empty()
    }
}

//=== Key Names ===========================================================

macro_rules! key_names {
    ($($name:ident),* $(,)?) => {
        fn parse_key_code(name: &str) -> Option<KeyCode> {
            match name {
                $(stringify!($name) => Some(KeyCode::$name),)*
                _ => None,
            }
        }
    };
}

key_names! {
    //--- Digits -------------------------------------------------------
    Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Letters ------------------------------------------------------
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
    KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Arrows -------------------------------------------------------
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,

    //--- Modifiers ----------------------------------------------------
    ShiftLeft, ShiftRight, ControlLeft, ControlRight, AltLeft, AltRight,

    //--- Function -----------------------------------------------------
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Special ------------------------------------------------------
    Space, Enter, Escape, Tab, Backspace, Delete,
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> KeyMapConfig {
        let mut actions = BTreeMap::new();
        actions.insert("Space".to_string(), "jump".to_string());
        actions.insert("MouseLeft".to_string(), "fire".to_string());

        KeyMapConfig {
            actions,
            axes: vec![
                AxisKeyConfig { key: "KeyD".into(), axis: "move_x".into(), value: 1.0 },
                AxisKeyConfig { key: "KeyA".into(), axis: "move_x".into(), value: -1.0 },
            ],
        }
    }

    #[test]
    fn parses_keys_and_mouse_buttons() {
        assert_eq!(InputSource::parse("KeyW"), Some(InputSource::Key(KeyCode::KeyW)));
        assert_eq!(InputSource::parse("F5"), Some(InputSource::Key(KeyCode::F5)));
        assert_eq!(InputSource::parse("MouseRight"), Some(InputSource::Mouse(MouseButton::Right)));
        assert_eq!(InputSource::parse("Hyper"), None);
    }

    #[test]
    fn builds_lookup_tables() {
        let map = KeyMap::from_config(&config()).unwrap();

        assert_eq!(map.action_for(InputSource::Key(KeyCode::Space)), Some("jump"));
        assert_eq!(map.action_for(InputSource::Mouse(MouseButton::Left)), Some("fire"));
        assert_eq!(map.axis_for(KeyCode::KeyA), Some(("move_x", -1.0)));
        assert_eq!(map.axis_keys("move_x").count(), 2);
    }

    #[test]
    fn unknown_names_are_rejected() {
        let mut bad = config();
        bad.actions.insert("NotAKey".into(), "x".into());

        assert!(matches!(
            KeyMap::from_config(&bad),
            Err(ConfigError::UnknownInput(name)) if name == "NotAKey"
        ));
    }

    #[test]
    fn mouse_buttons_cannot_drive_axes() {
        let mut bad = config();
        bad.axes.push(AxisKeyConfig { key: "MouseLeft".into(), axis: "x".into(), value: 1.0 });

        assert!(KeyMap::from_config(&bad).is_err());
    }
}
