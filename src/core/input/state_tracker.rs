//=========================================================================
// State Tracker
//=========================================================================
//
// Live action/axis/cursor state with per-frame edge tracking.
//
// Architecture:
//   InputEvent → process_events() → actions held / axis values → query
//
// Frame lifecycle: clear() → process_events() → advance(dt) → query
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

//=== Internal Dependencies ===============================================

use super::binding::{ActionId, AxisId, GroupId};
use super::event::{ButtonState, InputEvent};
use super::table::BindingTable;

//=== StateTracker ========================================================

/// Tracks persistent state (actions held, axis values) and per-frame deltas
/// (actions pressed/released, cursor motion).
pub struct StateTracker {
    //--- Persistent State (survives frame boundary) ----------------------
    actions_down: HashMap<ActionId, f32>,
    axes: HashMap<AxisId, f32>,
    cursor_position: (f32, f32),
    disabled_groups: HashSet<GroupId>,

    //--- Frame Deltas (reset each frame via clear()) --------------------
    actions_pressed_this_frame: HashSet<ActionId>,
    actions_released_this_frame: HashSet<ActionId>,
    cursor_motion: (f32, f32),
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            actions_down: HashMap::new(),
            axes: HashMap::new(),
            cursor_position: (0.0, 0.0),
            disabled_groups: HashSet::new(),
            actions_pressed_this_frame: HashSet::new(),
            actions_released_this_frame: HashSet::new(),
            cursor_motion: (0.0, 0.0),
        }
    }

    //--- Frame Processing -------------------------------------------------

    /// Clears frame-specific deltas (edges and cursor motion).
    pub(super) fn clear(&mut self) {
        self.actions_pressed_this_frame.clear();
        self.actions_released_this_frame.clear();
        self.cursor_motion = (0.0, 0.0);
    }

    /// Applies resolved events against `table`, in order, and returns how
    /// many reached live state.
    ///
    /// Events whose binding belongs to a disabled group are ignored.
    pub(super) fn process_events(&mut self, events: &[InputEvent], table: &BindingTable) -> usize {
        events
            .iter()
            .filter(|event| self.process_event(event, table))
            .count()
    }

    /// Advances hold timers of held actions by `dt` seconds.
    pub(super) fn advance(&mut self, dt: f32) {
        for held in self.actions_down.values_mut() {
            *held += dt;
        }
    }

    /// Forgets state for bindings absent from `table`.
    pub(super) fn retain_bindings(&mut self, table: &BindingTable) {
        self.actions_down.retain(|id, _| table.action(*id).is_some());
        self.axes.retain(|id, _| table.axis(*id).is_some());
        self.actions_pressed_this_frame.retain(|id| table.action(*id).is_some());
        self.actions_released_this_frame.retain(|id| table.action(*id).is_some());
    }

    /// Enables or disables a group.
    ///
    /// Disabling releases every held action of the group (reported as
    /// just-released) and zeroes its axes.
    pub(super) fn set_group_enabled(&mut self, group: GroupId, enabled: bool, table: &BindingTable) {
        if enabled {
            self.disabled_groups.remove(&group);
            return;
        }
        if !self.disabled_groups.insert(group) {
            return;
        }

        let released: Vec<ActionId> = self
            .actions_down
            .keys()
            .copied()
            .filter(|id| table.action(*id).is_some_and(|a| a.group == group))
            .collect();
        for id in released {
            self.actions_down.remove(&id);
            self.actions_released_this_frame.insert(id);
        }

        for (id, value) in self.axes.iter_mut() {
            if table.axis(*id).is_some_and(|a| a.group == group) {
                *value = 0.0;
            }
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn process_event(&mut self, event: &InputEvent, table: &BindingTable) -> bool {
        match *event {
            InputEvent::Action { id, state } => {
                let Some(action) = table.action(id) else { return false };
                if self.disabled_groups.contains(&action.group) {
                    return false;
                }
                match state {
                    ButtonState::Pressed => {
                        // Only an UP → DOWN transition is an edge
                        if !self.actions_down.contains_key(&id) {
                            self.actions_down.insert(id, 0.0);
                            self.actions_pressed_this_frame.insert(id);
                        }
                    }
                    ButtonState::Released => {
                        if self.actions_down.remove(&id).is_some() {
                            self.actions_released_this_frame.insert(id);
                        }
                    }
                }
            }

            InputEvent::Axis { id, value } => {
                let Some(axis) = table.axis(id) else { return false };
                if self.disabled_groups.contains(&axis.group) {
                    return false;
                }
                self.axes.insert(id, axis.range.apply(value));
            }

            InputEvent::CursorMove { delta } => {
                self.cursor_motion.0 += delta.0;
                self.cursor_motion.1 += delta.1;
                self.cursor_position.0 += delta.0;
                self.cursor_position.1 += delta.1;
            }

            InputEvent::CursorPosition { position } => {
                self.cursor_position = position;
            }

            InputEvent::CloseRequested => {}
        }
        true
    }

    //=====================================================================
    // Query API - Actions
    //=====================================================================

    /// Returns `true` while the action is held.
    pub fn is_pressed(&self, id: ActionId) -> bool {
        self.actions_down.contains_key(&id)
    }

    /// Returns `true` if the action transitioned UP → DOWN this frame.
    pub fn is_just_pressed(&self, id: ActionId) -> bool {
        self.actions_pressed_this_frame.contains(&id)
    }

    /// Returns `true` if the action transitioned DOWN → UP this frame.
    pub fn is_just_released(&self, id: ActionId) -> bool {
        self.actions_released_this_frame.contains(&id)
    }

    /// Seconds the action has been held, `None` when released.
    pub fn held_for(&self, id: ActionId) -> Option<f32> {
        self.actions_down.get(&id).copied()
    }

    //=====================================================================
    // Query API - Axes & Cursor
    //=====================================================================

    /// Current mapped axis value (0.0 until the axis is first set).
    pub fn axis(&self, id: AxisId) -> f32 {
        self.axes.get(&id).copied().unwrap_or(0.0)
    }

    /// Cursor position in logical-resolution space.
    pub fn cursor_position(&self) -> (f32, f32) {
        self.cursor_position
    }

    /// Accumulated relative motion this frame.
    pub fn cursor_motion(&self) -> (f32, f32) {
        self.cursor_motion
    }

    pub fn is_group_enabled(&self, group: GroupId) -> bool {
        !self.disabled_groups.contains(&group)
    }

    //=====================================================================
    // Query API - Iteration
    //=====================================================================

    pub fn actions_down(&self) -> impl Iterator<Item = &ActionId> {
        self.actions_down.keys()
    }

    pub fn actions_pressed(&self) -> impl Iterator<Item = &ActionId> {
        self.actions_pressed_this_frame.iter()
    }

    pub fn actions_released(&self) -> impl Iterator<Item = &ActionId> {
        self.actions_released_this_frame.iter()
    }
}

//--- Trait Implementations -----------------------------------------------

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::binding::AxisRange;

    //--- Test Helpers -----------------------------------------------------

    fn table() -> BindingTable {
        let mut builder = BindingTable::builder();
        builder.add_group("gameplay").unwrap();
        builder.add_group("ui").unwrap();
        builder.add_action("jump", "gameplay").unwrap();
        builder.add_action("fire", "gameplay").unwrap();
        builder.add_action("confirm", "ui").unwrap();
        builder
            .add_axis("move_x", "gameplay", AxisRange::Clamped { min: -1.0, max: 1.0 })
            .unwrap();
        builder.build()
    }

    fn press(name: &str) -> InputEvent {
        InputEvent::Action { id: ActionId::from_name(name), state: ButtonState::Pressed }
    }

    fn release(name: &str) -> InputEvent {
        InputEvent::Action { id: ActionId::from_name(name), state: ButtonState::Released }
    }

    fn id(name: &str) -> ActionId {
        ActionId::from_name(name)
    }

    //=====================================================================
    // Action Tests
    //=====================================================================

    #[test]
    fn just_pressed_only_on_transition_frame() {
        let table = table();
        let mut tracker = StateTracker::new();

        // Frame 1: press
        tracker.clear();
        tracker.process_events(&[press("jump")], &table);
        assert!(tracker.is_just_pressed(id("jump")));
        assert!(tracker.is_pressed(id("jump")));

        // Frame 2: held
        tracker.clear();
        tracker.process_events(&[], &table);
        assert!(!tracker.is_just_pressed(id("jump")));
        assert!(tracker.is_pressed(id("jump")));

        // Frame 3: released
        tracker.clear();
        tracker.process_events(&[release("jump")], &table);
        assert!(!tracker.is_pressed(id("jump")));
        assert!(tracker.is_just_released(id("jump")));
    }

    #[test]
    fn fast_tap_captures_both_edges() {
        let table = table();
        let mut tracker = StateTracker::new();

        tracker.process_events(&[press("fire"), release("fire")], &table);

        assert!(tracker.is_just_pressed(id("fire")));
        assert!(tracker.is_just_released(id("fire")));
        assert!(!tracker.is_pressed(id("fire")));
    }

    #[test]
    fn duplicate_press_and_spurious_release_ignored() {
        let table = table();
        let mut tracker = StateTracker::new();

        tracker.process_events(&[press("jump")], &table);
        tracker.clear();
        tracker.process_events(&[press("jump"), release("fire")], &table);

        assert!(!tracker.is_just_pressed(id("jump")));
        assert!(tracker.is_pressed(id("jump")));
        assert!(!tracker.is_just_released(id("fire")));
    }

    #[test]
    fn held_for_accumulates_while_pressed() {
        let table = table();
        let mut tracker = StateTracker::new();

        tracker.process_events(&[press("jump")], &table);
        tracker.advance(0.25);
        tracker.advance(0.5);
        assert_eq!(tracker.held_for(id("jump")), Some(0.75));

        tracker.process_events(&[release("jump")], &table);
        assert_eq!(tracker.held_for(id("jump")), None);
    }

    #[test]
    fn unknown_action_is_ignored() {
        let table = table();
        let mut tracker = StateTracker::new();

        tracker.process_events(&[press("unbound")], &table);

        assert_eq!(tracker.actions_down().count(), 0);
    }

    //=====================================================================
    // Axis Tests
    //=====================================================================

    #[test]
    fn axis_values_go_through_range() {
        let table = table();
        let mut tracker = StateTracker::new();
        let move_x = AxisId::from_name("move_x");

        assert_eq!(tracker.axis(move_x), 0.0);

        tracker.process_events(&[InputEvent::Axis { id: move_x, value: 4.0 }], &table);
        assert_eq!(tracker.axis(move_x), 1.0);

        tracker.clear();
        assert_eq!(tracker.axis(move_x), 1.0, "axis value persists across frames");
    }

    //=====================================================================
    // Group Tests
    //=====================================================================

    #[test]
    fn disabling_group_releases_actions_and_zeroes_axes() {
        let table = table();
        let mut tracker = StateTracker::new();
        let gameplay = GroupId::from_name("gameplay");
        let move_x = AxisId::from_name("move_x");

        tracker.process_events(
            &[press("jump"), press("confirm"), InputEvent::Axis { id: move_x, value: 0.5 }],
            &table,
        );
        tracker.clear();

        tracker.set_group_enabled(gameplay, false, &table);

        assert!(!tracker.is_pressed(id("jump")));
        assert!(tracker.is_just_released(id("jump")));
        assert!(tracker.is_pressed(id("confirm")));
        assert_eq!(tracker.axis(move_x), 0.0);
        assert!(!tracker.is_group_enabled(gameplay));
    }

    #[test]
    fn disabled_group_drops_events_until_reenabled() {
        let table = table();
        let mut tracker = StateTracker::new();
        let gameplay = GroupId::from_name("gameplay");

        tracker.set_group_enabled(gameplay, false, &table);
        tracker.process_events(&[press("jump")], &table);
        assert!(!tracker.is_pressed(id("jump")));

        tracker.set_group_enabled(gameplay, true, &table);
        tracker.process_events(&[press("jump")], &table);
        assert!(tracker.is_pressed(id("jump")));
    }

    #[test]
    fn retain_bindings_forgets_removed_ids() {
        let mut tracker = StateTracker::new();
        tracker.process_events(&[press("jump")], &table());

        let mut builder = BindingTable::builder();
        builder.add_group("gameplay").unwrap();
        builder.add_action("fire", "gameplay").unwrap();
        tracker.retain_bindings(&builder.build());

        assert!(!tracker.is_pressed(id("jump")));
        assert!(!tracker.is_just_pressed(id("jump")));
    }

    //=====================================================================
    // Cursor Tests
    //=====================================================================

    #[test]
    fn cursor_motion_accumulates_and_resets_per_frame() {
        let table = table();
        let mut tracker = StateTracker::new();

        tracker.process_events(
            &[
                InputEvent::CursorPosition { position: (100.0, 100.0) },
                InputEvent::CursorMove { delta: (5.0, -2.0) },
                InputEvent::CursorMove { delta: (1.0, 1.0) },
            ],
            &table,
        );

        assert_eq!(tracker.cursor_motion(), (6.0, -1.0));
        assert_eq!(tracker.cursor_position(), (106.0, 99.0));

        tracker.clear();
        assert_eq!(tracker.cursor_motion(), (0.0, 0.0));
        assert_eq!(tracker.cursor_position(), (106.0, 99.0));
    }
}
