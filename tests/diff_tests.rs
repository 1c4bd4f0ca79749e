// tests/diff_tests.rs

//! End-to-end diff-engine scenarios, mirroring the kinds of schema changes a
//! real migration would make: new tables, renames, foreign keys, dropped
//! tables that are FK targets, and index retargeting.

use pretty_assertions::assert_eq;

use schemamig::diff::diff;
use schemamig::model::{Column, ColumnId, ForeignKey, Key, State, Table, TableId};
use schemamig::operation::Operation;

fn column(id: &str) -> Column {
    Column {
        id: ColumnId::from(id),
        name: id.to_string(),
        ty: "int".to_string(),
        unique: false,
        auto_increment: false,
        auto_update: false,
        not_null: false,
        default: String::new(),
    }
}

fn table(key: &str, name: &str, columns: Vec<Column>) -> Table {
    Table {
        id: TableId::definitions(key),
        name: name.to_string(),
        primary_key: vec![],
        index: vec![],
        columns,
    }
}

#[test]
fn empty_to_one_table_creates_it() {
    let old = State::new();
    let mut new = State::new();
    new.tables.push(table("t", "t", vec![column("c")]));

    let ops = diff(&old, &new).unwrap();
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        Operation::CreateTable(t) => {
            assert_eq!(ops[0].query(), "CREATE TABLE `t` (`c` int) ENGINE=InnoDB");
            assert_eq!(t.name, "t");
        }
        other => panic!("expected CreateTable, got {other:?}"),
    }
}

#[test]
fn rename_table_precedes_column_update() {
    let mut old = State::new();
    old.tables.push(table("t", "before", vec![column("c")]));

    let mut new = State::new();
    let mut renamed_col = column("c");
    renamed_col.name = "c".to_string(); // same id, same name: no column op expected
    new.tables.push(table("t", "after", vec![renamed_col]));

    let ops = diff(&old, &new).unwrap();
    assert_eq!(ops.len(), 1);
    match &ops[0] {
        Operation::RenameTable { old_name, new_name, .. } => {
            assert_eq!(old_name, "before");
            assert_eq!(new_name, "after");
        }
        other => panic!("expected RenameTable, got {other:?}"),
    }
    assert_eq!(ops[0].query(), "ALTER TABLE `before` RENAME `after`");
}

#[test]
fn foreign_key_added_last_after_table_exists() {
    let mut old = State::new();
    old.tables.push(table("a", "a", vec![column("x")]));
    old.tables.push(table("b", "b", vec![column("y")]));

    let mut new = old.clone();
    new.foreign_keys.push(ForeignKey {
        name: "fk1".to_string(),
        source_table: TableId::definitions("a"),
        source_column: ColumnId::from("x"),
        target_table: TableId::definitions("b"),
        target_column: ColumnId::from("y"),
        update_cascade: false,
        delete_cascade: true,
    });

    let ops = diff(&old, &new).unwrap();
    assert_eq!(ops.len(), 1);
    let last = ops.last().unwrap();
    assert!(matches!(last, Operation::AddForeignKey { .. }));
    assert_eq!(
        last.query(),
        "ALTER TABLE `a` ADD CONSTRAINT `fk1` FOREIGN KEY (`x`) REFERENCES `b` (`y`) ON DELETE CASCADE"
    );
}

#[test]
fn dropping_fk_target_table_drops_the_fk_first() {
    let mut old = State::new();
    old.tables.push(table("a", "a", vec![column("x")]));
    old.tables.push(table("b", "b", vec![column("y")]));
    old.foreign_keys.push(ForeignKey {
        name: "fk1".to_string(),
        source_table: TableId::definitions("a"),
        source_column: ColumnId::from("x"),
        target_table: TableId::definitions("b"),
        target_column: ColumnId::from("y"),
        update_cascade: false,
        delete_cascade: false,
    });

    let mut new = State::new();
    new.tables.push(table("a", "a", vec![column("x")]));

    let ops = diff(&old, &new).unwrap();
    let drop_fk_pos = ops
        .iter()
        .position(|op| matches!(op, Operation::DropForeignKey { .. }))
        .expect("expected a DropForeignKey op");
    let drop_table_pos = ops
        .iter()
        .position(|op| matches!(op, Operation::DropTable(t) if t.name == "b"))
        .expect("expected a DropTable op for b");
    assert!(drop_fk_pos < drop_table_pos, "FK must drop before its target table");
}

#[test]
fn index_retarget_is_drop_then_add_adjacent() {
    let mut old_table = table("t", "t", vec![column("c1"), column("c2")]);
    old_table.index.push(Key {
        name: "ix".to_string(),
        target: vec![ColumnId::from("c1")],
    });
    let mut old = State::new();
    old.tables.push(old_table);

    let mut new_table = table("t", "t", vec![column("c1"), column("c2")]);
    new_table.index.push(Key {
        name: "ix".to_string(),
        target: vec![ColumnId::from("c1"), ColumnId::from("c2")],
    });
    let mut new = State::new();
    new.tables.push(new_table);

    let ops = diff(&old, &new).unwrap();
    let drop_pos = ops.iter().position(|op| matches!(op, Operation::DropIndex { .. })).unwrap();
    let add_pos = ops.iter().position(|op| matches!(op, Operation::AddIndex { .. })).unwrap();
    assert_eq!(add_pos, drop_pos + 1, "drop and add of the same index must be adjacent");
}

#[test]
fn diff_is_idempotent_on_equal_states() {
    let mut state = State::new();
    state.tables.push(table("t", "t", vec![column("c")]));
    assert!(diff(&state, &state).unwrap().is_empty());
}

#[test]
fn stable_ordering_ignores_source_collection_order() {
    let mut a = State::new();
    a.tables.push(table("z", "z", vec![column("c2"), column("c1")]));
    a.tables.push(table("a", "a", vec![column("x")]));

    let mut b = State::new();
    b.tables.push(table("a", "a", vec![column("x")]));
    b.tables.push(table("z", "z", vec![column("c1"), column("c2")]));

    assert_eq!(a.clone().sorted(), b.clone().sorted());
    assert!(diff(&a.sorted(), &b.sorted()).unwrap().is_empty());
}

#[test]
fn fk_modified_in_place_emits_drop_then_add() {
    let mut old = State::new();
    old.tables.push(table("a", "a", vec![column("x")]));
    old.tables.push(table("b", "b", vec![column("y")]));
    old.foreign_keys.push(ForeignKey {
        name: "fk1".to_string(),
        source_table: TableId::definitions("a"),
        source_column: ColumnId::from("x"),
        target_table: TableId::definitions("b"),
        target_column: ColumnId::from("y"),
        update_cascade: false,
        delete_cascade: false,
    });

    let mut new = old.clone();
    new.foreign_keys[0].update_cascade = true;

    let ops = diff(&old, &new).unwrap();
    let drop_pos = ops.iter().position(|op| matches!(op, Operation::DropForeignKey { .. }));
    let add_pos = ops.iter().position(|op| matches!(op, Operation::AddForeignKey { .. }));
    assert!(drop_pos.is_some(), "changed FK must be dropped before it is re-added");
    assert!(drop_pos.unwrap() < add_pos.unwrap());
}

#[test]
fn index_drop_precedes_column_drop_and_index_add_follows_column_add() {
    let mut old_table = table("t", "t", vec![column("c1"), column("c2")]);
    old_table.index.push(Key {
        name: "ix".to_string(),
        target: vec![ColumnId::from("c2")],
    });
    let mut old = State::new();
    old.tables.push(old_table);

    // c2 is dropped and the index that targeted it is dropped too; a new
    // index on the surviving/new columns is added.
    let mut new_table = table("t", "t", vec![column("c1"), column("c3")]);
    new_table.index.push(Key {
        name: "ix2".to_string(),
        target: vec![ColumnId::from("c3")],
    });
    let mut new = State::new();
    new.tables.push(new_table);

    let ops = diff(&old, &new).unwrap();
    let drop_index_pos = ops.iter().position(|op| matches!(op, Operation::DropIndex { .. })).unwrap();
    let drop_column_pos = ops.iter().position(|op| matches!(op, Operation::DropColumn { .. })).unwrap();
    let add_column_pos = ops.iter().position(|op| matches!(op, Operation::AddColumn { .. })).unwrap();
    let add_index_pos = ops.iter().position(|op| matches!(op, Operation::AddIndex { .. })).unwrap();

    assert!(drop_index_pos < drop_column_pos, "index must drop before the column it targets");
    assert!(add_column_pos < add_index_pos, "column must exist before a new index can target it");
}

#[test]
fn column_rename_is_single_update_not_drop_add() {
    let mut old = State::new();
    old.tables.push(table("t", "t", vec![column("c")]));

    let mut renamed = column("c");
    renamed.name = "c_renamed".to_string();
    let mut new = State::new();
    new.tables.push(table("t", "t", vec![renamed]));

    let ops = diff(&old, &new).unwrap();
    assert_eq!(ops.len(), 1);
    assert!(matches!(ops[0], Operation::UpdateColumn { .. }));
}
