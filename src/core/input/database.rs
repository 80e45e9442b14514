//=========================================================================
// Input Binding Database
//=========================================================================
//
// Read-mostly store of the current binding table.
//
// Architecture:
// ```text
//   reload(table) ──write lock (swap only)──► RwLock<Arc<BindingTable>>
//                                                   │
//   current() ───read lock (clone Arc)──────────────┘──► Arc<BindingTable>
//   lookup() / export_snapshot() ─ read lock ─┘
// ```
//
// A frame resolves against the `Arc` it took from `current()`, so a reload
// landing mid-frame is only observed by the next frame.
//
// Every reload bumps a generation number stored next to the table. Owners
// of live input state compare it once per frame, whichever handle to the
// database performed the reload.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use log::info;

//=== Internal Dependencies ===============================================

use super::binding::{
    ActionId, AxisId, BindingError, BindingKey, BindingKind, BindingRecord, GroupId, InputAction,
    InputAxis, InputGroup,
};
use super::table::BindingTable;

//=== BindingSnapshot =====================================================

/// Owned, sorted id export of a binding table generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSnapshot {
    pub actions: Vec<ActionId>,
    pub axes: Vec<AxisId>,
    pub groups: Vec<GroupId>,
}

impl BindingSnapshot {
    pub fn from_table(table: &BindingTable) -> Self {
        Self {
            actions: table.action_ids(),
            axes: table.axis_ids(),
            groups: table.group_ids(),
        }
    }
}

//=== InputBindingDatabase ================================================

struct Generation {
    number: u64,
    table: Arc<BindingTable>,
}

pub struct InputBindingDatabase {
    current: RwLock<Generation>,
}

impl InputBindingDatabase {
    pub fn new(table: BindingTable) -> Self {
        Self {
            current: RwLock::new(Generation {
                number: 0,
                table: Arc::new(table),
            }),
        }
    }

    /// Current table generation.
    pub fn current(&self) -> Arc<BindingTable> {
        Arc::clone(&self.read().table)
    }

    /// Current table together with its generation number (0 until the
    /// first reload).
    pub fn current_generation(&self) -> (u64, Arc<BindingTable>) {
        let current = self.read();
        (current.number, Arc::clone(&current.table))
    }

    /// Replaces the whole table at once.
    pub fn reload(&self, table: BindingTable) {
        let next = Arc::new(table);
        let counts = (next.action_ids().len(), next.axis_ids().len(), next.group_ids().len());

        let number = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            current.number += 1;
            current.table = next;
            current.number
        };

        info!(
            target: "core::input",
            "Bindings reloaded (generation {}): {} actions, {} axes, {} groups",
            number, counts.0, counts.1, counts.2
        );
    }

    //--- Lookup -----------------------------------------------------------

    pub fn lookup(&self, key: BindingKey) -> Result<BindingRecord, BindingError> {
        let current = self.read();
        let table = &current.table;
        let record = match key {
            BindingKey::Action(id) => table.action(id).cloned().map(BindingRecord::Action),
            BindingKey::Axis(id) => table.axis(id).cloned().map(BindingRecord::Axis),
            BindingKey::Group(id) => table.group(id).cloned().map(BindingRecord::Group),
        };
        record.ok_or(BindingError::NotFound {
            kind: key.kind(),
            id: key.to_raw(),
        })
    }

    pub fn action(&self, id: ActionId) -> Result<InputAction, BindingError> {
        self.read()
            .table
            .action(id)
            .cloned()
            .ok_or(not_found(BindingKind::Action, id.to_raw()))
    }

    pub fn axis(&self, id: AxisId) -> Result<InputAxis, BindingError> {
        self.read()
            .table
            .axis(id)
            .cloned()
            .ok_or(not_found(BindingKind::Axis, id.to_raw()))
    }

    pub fn group(&self, id: GroupId) -> Result<InputGroup, BindingError> {
        self.read()
            .table
            .group(id)
            .cloned()
            .ok_or(not_found(BindingKind::Group, id.to_raw()))
    }

    /// Id export of the current generation. Does not touch the live table.
    pub fn export_snapshot(&self) -> BindingSnapshot {
        BindingSnapshot::from_table(&self.read().table)
    }

    fn read(&self) -> RwLockReadGuard<'_, Generation> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InputBindingDatabase {
    fn default() -> Self {
        Self::new(BindingTable::default())
    }
}

fn not_found(kind: BindingKind, id: u64) -> BindingError {
    BindingError::NotFound { kind, id }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::binding::AxisRange;
    use std::thread;

    fn table(prefix: &str) -> BindingTable {
        let mut builder = BindingTable::builder();
        builder.add_group(&format!("{prefix}_group")).unwrap();
        builder.add_action(&format!("{prefix}_jump"), &format!("{prefix}_group")).unwrap();
        builder.add_action(&format!("{prefix}_fire"), &format!("{prefix}_group")).unwrap();
        builder
            .add_axis(&format!("{prefix}_move"), &format!("{prefix}_group"), AxisRange::Infinite)
            .unwrap();
        builder.build()
    }

    #[test]
    fn every_snapshot_id_looks_up_with_known_group() {
        let db = InputBindingDatabase::new(table("a"));
        let snapshot = db.export_snapshot();

        for id in &snapshot.actions {
            let record = db.lookup(BindingKey::Action(*id)).unwrap();
            assert!(snapshot.groups.contains(&record.group().unwrap()));
        }
        for id in &snapshot.axes {
            let record = db.lookup(BindingKey::Axis(*id)).unwrap();
            assert!(snapshot.groups.contains(&record.group().unwrap()));
        }
        for id in &snapshot.groups {
            assert!(db.lookup(BindingKey::Group(*id)).is_ok());
        }
    }

    #[test]
    fn unknown_id_is_not_found() {
        let db = InputBindingDatabase::new(table("a"));
        let missing = ActionId::from_raw(7);

        assert_eq!(
            db.lookup(BindingKey::Action(missing)),
            Err(BindingError::NotFound { kind: BindingKind::Action, id: 7 })
        );
        assert!(db.axis(AxisId::from_name("a_jump")).is_err());
    }

    #[test]
    fn snapshot_is_independent_of_later_reload() {
        let db = InputBindingDatabase::new(table("a"));
        let before = db.export_snapshot();

        db.reload(table("b"));

        assert_eq!(before.actions.len(), 2);
        assert!(before.actions.contains(&ActionId::from_name("a_jump")));
        assert!(db.action(ActionId::from_name("a_jump")).is_err());
        assert!(db.action(ActionId::from_name("b_jump")).is_ok());
    }

    #[test]
    fn reload_bumps_generation_number() {
        let db = InputBindingDatabase::new(table("a"));
        assert_eq!(db.current_generation().0, 0);

        db.reload(table("b"));
        db.reload(table("a"));

        let (number, current) = db.current_generation();
        assert_eq!(number, 2);
        assert!(current.find_action("a_jump").is_some());
    }

    #[test]
    fn held_generation_survives_reload() {
        let db = InputBindingDatabase::new(table("a"));
        let frame_view = db.current();

        db.reload(table("b"));

        assert!(frame_view.find_action("a_jump").is_some());
        assert!(frame_view.find_action("b_jump").is_none());
        assert!(db.current().find_action("b_jump").is_some());
    }

    #[test]
    fn concurrent_readers_never_see_mixed_generations() {
        let db = Arc::new(InputBindingDatabase::new(table("a")));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let view = db.current();
                        let a = view.find_action("a_jump").is_some();
                        let b = view.find_action("b_jump").is_some();
                        assert!(a ^ b, "table mixes two generations");
                        assert_eq!(a, view.find_action("a_fire").is_some());
                    }
                })
            })
            .collect();

        for i in 0..100 {
            db.reload(table(if i % 2 == 0 { "b" } else { "a" }));
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
