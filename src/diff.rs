// src/diff.rs

//! State-to-state diffing: the core algorithm that turns two `State`
//! snapshots into an ordered list of [`Operation`]s.
//!
//! Phase order matters and is not negotiable:
//!
//! 1. Drop foreign keys whose source table is being removed (outgoing FKs).
//! 2. Drop tables present in `old` but absent from `new`.
//! 3. Create tables present in `new` but absent from `old`.
//! 4. Update tables present in both — renames and column/key changes.
//! 5. Add foreign keys whose source table now exists (incoming FKs).
//!
//! Every foreign key referencing a dropped or not-yet-created table would
//! break referential integrity if reordered; this phase order guarantees a
//! table is never touched while a dangling reference to or from it exists.

use std::collections::{HashMap, HashSet};

use crate::error::{MigrationError, Result};
use crate::model::{Column, ForeignKey, Key, State, Table};
use crate::operation::Operation;

/// Diff two states and produce the ordered list of operations that takes
/// `old` to `new`.
pub fn diff(old: &State, new: &State) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();

    let old_ids: HashSet<_> = old.tables.iter().map(|t| t.id.clone()).collect();
    let new_ids: HashSet<_> = new.tables.iter().map(|t| t.id.clone()).collect();

    let dropped_table_ids: HashSet<_> = old_ids.difference(&new_ids).cloned().collect();
    let created_table_ids: HashSet<_> = new_ids.difference(&old_ids).cloned().collect();

    // Phase 1: outgoing foreign keys — any FK whose source or target table
    // is being dropped must go before the table itself does. A FK that kept
    // its name but changed any other field also has to drop here, since
    // Phase 5 will re-add it under the same constraint name.
    for fk in &old.foreign_keys {
        let source_gone = dropped_table_ids.contains(&fk.source_table);
        let target_gone = dropped_table_ids.contains(&fk.target_table);
        let unchanged = new.foreign_keys.iter().any(|nfk| nfk == fk);
        if source_gone || target_gone || !unchanged {
            let source_name = old.table(&fk.source_table).map(|t| t.name.clone());
            let target_name = old.table(&fk.target_table).map(|t| t.name.clone());
            if let (Some(source_table), Some(target_table)) = (source_name, target_name) {
                ops.push(Operation::DropForeignKey {
                    source_table,
                    target_table,
                    fk: fk.clone(),
                });
            }
        }
    }

    // Phase 2: drop removed tables.
    for table in &old.tables {
        if dropped_table_ids.contains(&table.id) {
            ops.push(Operation::DropTable(table.clone()));
        }
    }

    // Phase 3: create added tables.
    for table in &new.tables {
        if created_table_ids.contains(&table.id) {
            validate_new_table(table)?;
            ops.push(Operation::CreateTable(table.clone()));
        }
    }

    // Phase 4: update tables present in both states.
    for new_table in &new.tables {
        if let Some(old_table) = old.table(&new_table.id) {
            update_table(old_table, new_table, &mut ops)?;
        }
    }

    // Phase 5: incoming foreign keys — any FK whose source table now exists
    // (freshly created or already present) and that is new or changed.
    for fk in &new.foreign_keys {
        let existed_before = old.foreign_keys.iter().any(|ofk| ofk == fk);
        if existed_before && !dropped_table_ids.contains(&fk.source_table) {
            continue;
        }
        let source_name = new.table(&fk.source_table).map(|t| t.name.clone());
        let target_name = new.table(&fk.target_table).map(|t| t.name.clone());
        let (Some(source_table), Some(target_table)) = (source_name, target_name) else {
            return Err(MigrationError::ReferenceNotFound(format!(
                "foreign key `{}` references a table absent from the target state",
                fk.name
            )));
        };
        ops.push(Operation::AddForeignKey {
            source_table,
            target_table,
            fk: fk.clone(),
        });
    }

    Ok(ops)
}

/// A table created via `CreateTable` must carry at least one column — an
/// empty-column table is a legal `State` but an illegal migration target.
fn validate_new_table(table: &Table) -> Result<()> {
    if table.columns.is_empty() {
        return Err(MigrationError::DiffValidation(format!(
            "table `{}` has no columns",
            table.name
        )));
    }
    validate_keys(table)
}

fn validate_keys(table: &Table) -> Result<()> {
    for key in table.primary_key.iter().chain(table.index.iter()) {
        if key.target.is_empty() {
            return Err(MigrationError::DiffValidation(format!(
                "key `{}` on table `{}` has no target columns",
                key.name, table.name
            )));
        }
    }
    let mut seen = HashSet::new();
    for key in table.primary_key.iter().chain(table.index.iter()) {
        if !seen.insert(&key.name) {
            return Err(MigrationError::DiffValidation(format!(
                "duplicate key name `{}` on table `{}`",
                key.name, table.name
            )));
        }
    }
    Ok(())
}

/// Diff a single table present in both states: rename first (so later
/// clauses can reference the table by its final name), then column and key
/// changes.
fn update_table(old: &Table, new: &Table, ops: &mut Vec<Operation>) -> Result<()> {
    if new.columns.is_empty() {
        return Err(MigrationError::DiffValidation(format!(
            "table `{}` would be left with no columns",
            new.name
        )));
    }
    validate_keys(new)?;

    if old.name != new.name {
        ops.push(Operation::RenameTable {
            id_name: new.id.to_string(),
            old_name: old.name.clone(),
            new_name: new.name.clone(),
        });
    }

    let old_columns: HashMap<_, _> = old.columns.iter().map(|c| (&c.id, c)).collect();
    let new_columns: HashMap<_, _> = new.columns.iter().map(|c| (&c.id, c)).collect();

    // Keys drop before columns: a secondary index on a column about to be
    // dropped must be gone first, or MySQL auto-drops it as a side effect of
    // the column drop and the explicit DropIndex below fails to find it.
    diff_keys_drop(&new.name, &old.primary_key, &new.primary_key, true, ops);
    diff_keys_drop(&new.name, &old.index, &new.index, false, ops);

    for col in &old.columns {
        if !new_columns.contains_key(&col.id) {
            ops.push(Operation::DropColumn {
                table: new.name.clone(),
                column: col.clone(),
            });
        }
    }
    for col in &new.columns {
        match old_columns.get(&col.id) {
            None => ops.push(Operation::AddColumn {
                table: new.name.clone(),
                column: col.clone(),
            }),
            Some(old_col) if *old_col != col => ops.push(Operation::UpdateColumn {
                table: new.name.clone(),
                old: (*old_col).clone(),
                new: col.clone(),
            }),
            Some(_) => {}
        }
    }

    // Keys add/retarget after columns: a new index can only reference
    // columns that already exist on the table.
    diff_keys_add(&new.name, &old.primary_key, &new.primary_key, true, ops);
    diff_keys_add(&new.name, &old.index, &new.index, false, ops);

    Ok(())
}

/// Emit drops for keys removed in `new` and the old side of keys whose
/// target changed. Call before column drops.
fn diff_keys_drop(table: &str, old: &[Key], new: &[Key], primary: bool, ops: &mut Vec<Operation>) {
    let new_by_name: HashMap<_, _> = new.iter().map(|k| (&k.name, k)).collect();
    for key in old {
        match new_by_name.get(&key.name) {
            None => push_drop_key(table, key, primary, ops),
            Some(new_key) if *new_key != key => push_drop_key(table, key, primary, ops),
            Some(_) => {}
        }
    }
}

/// Emit adds for keys introduced in `new` and the new side of keys whose
/// target changed. Call after column adds.
fn diff_keys_add(table: &str, old: &[Key], new: &[Key], primary: bool, ops: &mut Vec<Operation>) {
    let old_by_name: HashMap<_, _> = old.iter().map(|k| (&k.name, k)).collect();
    for key in new {
        match old_by_name.get(&key.name) {
            None => push_add_key(table, key, primary, ops),
            Some(old_key) if *old_key != key => push_add_key(table, key, primary, ops),
            Some(_) => {}
        }
    }
}

fn push_add_key(table: &str, key: &Key, primary: bool, ops: &mut Vec<Operation>) {
    ops.push(if primary {
        Operation::AddPrimaryKey {
            table: table.to_string(),
            key: key.clone(),
        }
    } else {
        Operation::AddIndex {
            table: table.to_string(),
            key: key.clone(),
        }
    });
}

fn push_drop_key(table: &str, key: &Key, primary: bool, ops: &mut Vec<Operation>) {
    ops.push(if primary {
        Operation::DropPrimaryKey {
            table: table.to_string(),
            key: key.clone(),
        }
    } else {
        Operation::DropIndex {
            table: table.to_string(),
            key: key.clone(),
        }
    });
}
