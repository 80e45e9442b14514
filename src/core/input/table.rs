//=========================================================================
// Binding Table
//=========================================================================
//
// Immutable set of groups, actions and axes, plus the resolution of raw
// (id-or-name) references against it.
//
// Architecture:
//   BindingConfig (TOML) ─┐
//                          ├─► BindingTableBuilder ──build()──► BindingTable
//   code (add_group, ...) ─┘
//
// Invariants held by every built table:
// - ids are unique within their kind
// - every action/axis references a group present in the table
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

//=== Internal Dependencies ===============================================

use super::binding::{
    ActionId, AxisId, AxisRange, BindingError, BindingKind, BindingName, GroupId, InputAction,
    InputAxis, InputGroup,
};
use super::event::InputRef;
use crate::config::ConfigError;

//=== BindingTable ========================================================

/// One consistent generation of input bindings.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    groups: HashMap<GroupId, InputGroup>,
    actions: HashMap<ActionId, InputAction>,
    axes: HashMap<AxisId, InputAxis>,
}

impl BindingTable {
    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::new()
    }

    //--- Point Queries ----------------------------------------------------

    pub fn action(&self, id: ActionId) -> Option<&InputAction> {
        self.actions.get(&id)
    }

    pub fn axis(&self, id: AxisId) -> Option<&InputAxis> {
        self.axes.get(&id)
    }

    pub fn group(&self, id: GroupId) -> Option<&InputGroup> {
        self.groups.get(&id)
    }

    pub fn find_action(&self, name: &str) -> Option<&InputAction> {
        self.action(ActionId::from_name(name))
            .filter(|action| action.name.as_str() == name)
    }

    pub fn find_axis(&self, name: &str) -> Option<&InputAxis> {
        self.axis(AxisId::from_name(name))
            .filter(|axis| axis.name.as_str() == name)
    }

    pub fn find_group(&self, name: &str) -> Option<&InputGroup> {
        self.group(GroupId::from_name(name))
            .filter(|group| group.name.as_str() == name)
    }

    //--- Resolution -------------------------------------------------------

    /// Resolves an id-or-name action reference to a bound id.
    pub fn resolve_action(&self, action: &InputRef<ActionId>) -> Option<ActionId> {
        match action {
            InputRef::Id(id) => self.action(*id).map(|a| a.id),
            InputRef::Name(name) => self.find_action(name).map(|a| a.id),
        }
    }

    /// Resolves an id-or-name axis reference to a bound id.
    pub fn resolve_axis(&self, axis: &InputRef<AxisId>) -> Option<AxisId> {
        match axis {
            InputRef::Id(id) => self.axis(*id).map(|a| a.id),
            InputRef::Name(name) => self.find_axis(name).map(|a| a.id),
        }
    }

    //--- Iteration --------------------------------------------------------

    pub fn actions(&self) -> impl Iterator<Item = &InputAction> {
        self.actions.values()
    }

    pub fn axes(&self) -> impl Iterator<Item = &InputAxis> {
        self.axes.values()
    }

    pub fn groups(&self) -> impl Iterator<Item = &InputGroup> {
        self.groups.values()
    }

    /// Action ids in ascending order.
    pub fn action_ids(&self) -> Vec<ActionId> {
        let mut ids: Vec<_> = self.actions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Axis ids in ascending order.
    pub fn axis_ids(&self) -> Vec<AxisId> {
        let mut ids: Vec<_> = self.axes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Group ids in ascending order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        let mut ids: Vec<_> = self.groups.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.actions.is_empty() && self.axes.is_empty()
    }
}

//=== BindingTableBuilder =================================================

/// Incremental, validating constructor for [`BindingTable`].
///
/// Groups must be added before the actions and axes that reference them.
pub struct BindingTableBuilder {
    table: BindingTable,
}

impl BindingTableBuilder {
    pub fn new() -> Self {
        Self {
            table: BindingTable::default(),
        }
    }

    pub fn add_group(&mut self, name: &str) -> Result<GroupId, BindingError> {
        let name = BindingName::new(name)?;
        let id = GroupId::from_name(name.as_str());
        check_id(BindingKind::Group, &name, id.is_null())?;

        if let Some(existing) = self.table.groups.get(&id) {
            return Err(conflict(BindingKind::Group, &name, &existing.name));
        }

        self.table.groups.insert(id, InputGroup { id, name });
        Ok(id)
    }

    pub fn add_action(&mut self, name: &str, group: &str) -> Result<ActionId, BindingError> {
        let name = BindingName::new(name)?;
        let group = self.require_group(BindingKind::Action, &name, group)?;
        let id = ActionId::from_name(name.as_str());
        check_id(BindingKind::Action, &name, id.is_null())?;

        if let Some(existing) = self.table.actions.get(&id) {
            return Err(conflict(BindingKind::Action, &name, &existing.name));
        }

        self.table.actions.insert(id, InputAction { id, name, group });
        Ok(id)
    }

    pub fn add_axis(
        &mut self,
        name: &str,
        group: &str,
        range: AxisRange,
    ) -> Result<AxisId, BindingError> {
        let name = BindingName::new(name)?;
        let group = self.require_group(BindingKind::Axis, &name, group)?;
        if !range.is_valid() {
            return Err(BindingError::InvalidRange {
                name: name.to_string(),
                range,
            });
        }
        let id = AxisId::from_name(name.as_str());
        check_id(BindingKind::Axis, &name, id.is_null())?;

        if let Some(existing) = self.table.axes.get(&id) {
            return Err(conflict(BindingKind::Axis, &name, &existing.name));
        }

        self.table.axes.insert(id, InputAxis { id, name, group, range });
        Ok(id)
    }

    pub fn build(self) -> BindingTable {
        self.table
    }

    fn require_group(
        &self,
        kind: BindingKind,
        owner: &BindingName,
        group: &str,
    ) -> Result<GroupId, BindingError> {
        self.table
            .find_group(group)
            .map(|g| g.id)
            .ok_or_else(|| BindingError::UnknownGroup {
                kind,
                owner: owner.to_string(),
                group: group.to_string(),
            })
    }
}

impl Default for BindingTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn check_id(kind: BindingKind, name: &BindingName, is_null: bool) -> Result<(), BindingError> {
    if is_null {
        return Err(BindingError::ReservedId {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn conflict(kind: BindingKind, name: &BindingName, existing: &BindingName) -> BindingError {
    if name == existing {
        BindingError::Duplicate {
            kind,
            name: name.to_string(),
        }
    } else {
        BindingError::IdCollision {
            kind,
            name: name.to_string(),
            existing: existing.to_string(),
        }
    }
}

//=== BindingConfig =======================================================

/// Serializable binding set.
///
/// ```toml
/// [[groups]]
/// name = "gameplay"
///
/// [[actions]]
/// name = "jump"
/// group = "gameplay"
///
/// [[axes]]
/// name = "move_x"
/// group = "gameplay"
/// range = { kind = "clamped", min = -1.0, max = 1.0 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    pub groups: Vec<GroupConfig>,
    pub actions: Vec<ActionConfig>,
    pub axes: Vec<AxisConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub name: String,
    pub group: String,
    #[serde(default)]
    pub range: AxisRange,
}

impl BindingConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates the set and builds a table from it.
    pub fn build(&self) -> Result<BindingTable, BindingError> {
        let mut builder = BindingTableBuilder::new();
        for group in &self.groups {
            builder.add_group(&group.name)?;
        }
        for action in &self.actions {
            builder.add_action(&action.name, &action.group)?;
        }
        for axis in &self.axes {
            builder.add_axis(&axis.name, &axis.group, axis.range)?;
        }
        Ok(builder.build())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> BindingTable {
        let mut builder = BindingTable::builder();
        builder.add_group("gameplay").unwrap();
        builder.add_group("ui").unwrap();
        builder.add_action("jump", "gameplay").unwrap();
        builder.add_action("confirm", "ui").unwrap();
        builder
            .add_axis("move_x", "gameplay", AxisRange::Clamped { min: -1.0, max: 1.0 })
            .unwrap();
        builder.build()
    }

    //=====================================================================
    // Builder Tests
    //=====================================================================

    #[test]
    fn builder_assigns_name_derived_ids() {
        let table = sample_table();

        let jump = table.find_action("jump").unwrap();
        assert_eq!(jump.id, ActionId::from_name("jump"));
        assert_eq!(jump.group, GroupId::from_name("gameplay"));
    }

    #[test]
    fn duplicate_names_are_rejected_per_kind() {
        let mut builder = BindingTable::builder();
        builder.add_group("gameplay").unwrap();
        builder.add_action("jump", "gameplay").unwrap();

        assert_eq!(
            builder.add_action("jump", "gameplay"),
            Err(BindingError::Duplicate { kind: BindingKind::Action, name: "jump".into() })
        );
        assert_eq!(
            builder.add_group("gameplay"),
            Err(BindingError::Duplicate { kind: BindingKind::Group, name: "gameplay".into() })
        );
    }

    #[test]
    fn same_name_may_exist_in_each_kind() {
        let mut builder = BindingTable::builder();
        builder.add_group("look").unwrap();
        builder.add_action("look", "look").unwrap();
        builder.add_axis("look", "look", AxisRange::Infinite).unwrap();

        let table = builder.build();
        assert!(table.find_group("look").is_some());
        assert!(table.find_action("look").is_some());
        assert!(table.find_axis("look").is_some());
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut builder = BindingTable::builder();

        let result = builder.add_action("jump", "missing");

        assert_eq!(
            result,
            Err(BindingError::UnknownGroup {
                kind: BindingKind::Action,
                owner: "jump".into(),
                group: "missing".into(),
            })
        );
    }

    #[test]
    fn unusable_axis_range_is_rejected() {
        let mut builder = BindingTable::builder();
        builder.add_group("camera").unwrap();

        let zero_norm = AxisRange::Normalized { norm: 0.0 };
        assert_eq!(
            builder.add_axis("zoom", "camera", zero_norm),
            Err(BindingError::InvalidRange { name: "zoom".into(), range: zero_norm })
        );
        assert!(builder
            .add_axis("pitch", "camera", AxisRange::Clamped { min: 1.0, max: -1.0 })
            .is_err());
        assert!(builder.build().find_axis("zoom").is_none());
    }

    //=====================================================================
    // Resolution Tests
    //=====================================================================

    #[test]
    fn resolves_by_id_and_by_name_to_same_id() {
        let table = sample_table();
        let jump = ActionId::from_name("jump");

        assert_eq!(table.resolve_action(&InputRef::Id(jump)), Some(jump));
        assert_eq!(table.resolve_action(&InputRef::Name("jump".into())), Some(jump));
        assert_eq!(
            table.resolve_axis(&InputRef::Name("move_x".into())),
            Some(AxisId::from_name("move_x"))
        );
    }

    #[test]
    fn unknown_refs_resolve_to_none() {
        let table = sample_table();

        assert_eq!(table.resolve_action(&InputRef::Id(ActionId::from_raw(42))), None);
        assert_eq!(table.resolve_action(&InputRef::Name("fly".into())), None);
        assert_eq!(table.resolve_axis(&InputRef::Id(AxisId::from_name("jump"))), None);
    }

    #[test]
    fn id_lists_are_sorted_and_complete() {
        let table = sample_table();

        let actions = table.action_ids();
        assert_eq!(actions.len(), 2);
        assert!(actions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(table.group_ids().len(), 2);
        assert_eq!(table.axis_ids(), vec![AxisId::from_name("move_x")]);
    }

    //=====================================================================
    // Config Tests
    //=====================================================================

    #[test]
    fn config_parses_and_builds() {
        let config = BindingConfig::from_toml_str(
            r#"
            [[groups]]
            name = "gameplay"

            [[actions]]
            name = "jump"
            group = "gameplay"

            [[axes]]
            name = "move_x"
            group = "gameplay"
            range = { kind = "clamped", min = -1.0, max = 1.0 }

            [[axes]]
            name = "zoom"
            group = "gameplay"
            "#,
        )
        .unwrap();

        let table = config.build().unwrap();

        assert!(table.find_action("jump").is_some());
        assert_eq!(
            table.find_axis("move_x").unwrap().range,
            AxisRange::Clamped { min: -1.0, max: 1.0 }
        );
        assert_eq!(table.find_axis("zoom").unwrap().range, AxisRange::Infinite);
    }

    #[test]
    fn config_with_zero_norm_fails_to_build() {
        let config = BindingConfig::from_toml_str(
            r#"
            [[groups]]
            name = "camera"

            [[axes]]
            name = "zoom"
            group = "camera"
            range = { kind = "clamped_normalized", min = -1.0, max = 1.0, norm = 0.0 }
            "#,
        )
        .unwrap();

        assert!(matches!(config.build(), Err(BindingError::InvalidRange { .. })));
    }

    #[test]
    fn config_with_dangling_group_fails_to_build() {
        let config = BindingConfig {
            actions: vec![ActionConfig { name: "jump".into(), group: "nowhere".into() }],
            ..Default::default()
        };

        assert!(matches!(config.build(), Err(BindingError::UnknownGroup { .. })));
    }

    #[test]
    fn config_rejects_malformed_toml() {
        assert!(BindingConfig::from_toml_str("[[groups]\nname = ").is_err());
    }
}
