// src/operation.rs

//! DDL operations: one variant per kind of table mutation the diff engine
//! can emit. Each operation knows its own forward SQL, its own inverse (as
//! another `Operation`, not a bare string — so the executor can re-run the
//! same `query()`/`summary()` machinery on a rollback step), and a short
//! human-readable summary for `plan` output.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{Column, ForeignKey, Key, Table};

/// A single reversible schema mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateTable(Table),
    DropTable(Table),
    RenameTable { id_name: String, old_name: String, new_name: String },
    AddColumn { table: String, column: Column },
    DropColumn { table: String, column: Column },
    UpdateColumn { table: String, old: Column, new: Column },
    AddPrimaryKey { table: String, key: Key },
    DropPrimaryKey { table: String, key: Key },
    AddIndex { table: String, key: Key },
    DropIndex { table: String, key: Key },
    AddForeignKey { source_table: String, target_table: String, fk: ForeignKey },
    DropForeignKey { source_table: String, target_table: String, fk: ForeignKey },
}

fn datetime_precision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^datetime(?:\((\d+)\))?$").unwrap())
}

/// Extract the fractional-second precision suffix from a `datetime`/
/// `datetime(n)` type string. `None` means the type isn't datetime at all;
/// `Some(None)` means datetime with no precision; `Some(Some(n))` carries
/// the precision digits verbatim for reuse in `CURRENT_TIMESTAMP(n)`.
fn datetime_precision(ty: &str) -> Option<Option<&str>> {
    datetime_precision_re()
        .captures(ty)
        .map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Render a full column definition clause, as used in both `CREATE TABLE`
/// and `ADD COLUMN`/`CHANGE COLUMN`.
pub fn column_definition(column: &Column) -> String {
    let mut def = format!("`{}` {}", column.name, column.ty);
    if column.auto_increment {
        def.push_str(" AUTO_INCREMENT");
    }
    if column.not_null {
        def.push_str(" NOT NULL");
    }
    if column.unique {
        def.push_str(" UNIQUE");
    }

    match datetime_precision(&column.ty) {
        Some(precision) => {
            if column.auto_update {
                match precision {
                    Some(n) => def.push_str(&format!(" ON UPDATE CURRENT_TIMESTAMP({n})")),
                    None => def.push_str(" ON UPDATE CURRENT_TIMESTAMP"),
                }
            }
            if column.default.is_empty() {
                match precision {
                    Some(n) => def.push_str(&format!(" DEFAULT CURRENT_TIMESTAMP({n})")),
                    None => def.push_str(" DEFAULT CURRENT_TIMESTAMP"),
                }
            } else {
                def.push_str(&format!(" DEFAULT {}", column.default));
            }
        }
        None => {
            if !column.default.is_empty() {
                def.push_str(&format!(" DEFAULT '{}'", column.default));
            }
        }
    }
    def
}

fn key_clause(kind: &str, key: &Key) -> String {
    let cols = key
        .target
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{kind} `{}` ({cols})", key.name)
}

fn foreign_key_clause(target_table: &str, fk: &ForeignKey) -> String {
    let mut clause = format!(
        "CONSTRAINT `{}` FOREIGN KEY (`{}`) REFERENCES `{}` (`{}`)",
        fk.name, fk.source_column, target_table, fk.target_column
    );
    if fk.update_cascade {
        clause.push_str(" ON UPDATE CASCADE");
    }
    if fk.delete_cascade {
        clause.push_str(" ON DELETE CASCADE");
    }
    clause
}

impl Operation {
    /// The forward SQL statement this operation executes.
    pub fn query(&self) -> String {
        match self {
            Operation::CreateTable(table) => {
                let mut clauses: Vec<String> =
                    table.columns.iter().map(column_definition).collect();
                for pk in &table.primary_key {
                    clauses.push(key_clause("PRIMARY KEY", pk));
                }
                for idx in &table.index {
                    clauses.push(key_clause("KEY", idx));
                }
                format!(
                    "CREATE TABLE `{}` ({}) ENGINE=InnoDB",
                    table.name,
                    clauses.join(", ")
                )
            }
            Operation::DropTable(table) => format!("DROP TABLE `{}`", table.name),
            Operation::RenameTable { old_name, new_name, .. } => {
                format!("ALTER TABLE `{old_name}` RENAME `{new_name}`")
            }
            Operation::AddColumn { table, column } => {
                format!("ALTER TABLE `{table}` ADD COLUMN {}", column_definition(column))
            }
            Operation::DropColumn { table, column } => {
                format!("ALTER TABLE `{table}` DROP COLUMN `{}`", column.name)
            }
            Operation::UpdateColumn { table, old, new } => {
                format!(
                    "ALTER TABLE `{table}` CHANGE COLUMN `{}` {}",
                    old.name,
                    column_definition(new)
                )
            }
            Operation::AddPrimaryKey { table, key } => {
                format!("ALTER TABLE `{table}` ADD {}", key_clause("PRIMARY KEY", key))
            }
            Operation::DropPrimaryKey { table, .. } => {
                format!("ALTER TABLE `{table}` DROP PRIMARY KEY")
            }
            Operation::AddIndex { table, key } => {
                format!("ALTER TABLE `{table}` ADD {}", key_clause("KEY", key))
            }
            Operation::DropIndex { table, key } => {
                format!("ALTER TABLE `{table}` DROP INDEX `{}`", key.name)
            }
            Operation::AddForeignKey { source_table, target_table, fk } => {
                format!(
                    "ALTER TABLE `{source_table}` ADD {}",
                    foreign_key_clause(target_table, fk)
                )
            }
            Operation::DropForeignKey { source_table, fk, .. } => {
                format!("ALTER TABLE `{source_table}` DROP FOREIGN KEY `{}`", fk.name)
            }
        }
    }

    /// The operation that undoes this one, expressed as another `Operation`
    /// so the executor can reuse `query()`/`summary()` unchanged during
    /// rollback.
    pub fn rollback(&self) -> Operation {
        match self {
            Operation::CreateTable(table) => Operation::DropTable(table.clone()),
            Operation::DropTable(table) => Operation::CreateTable(table.clone()),
            Operation::RenameTable { id_name, old_name, new_name } => Operation::RenameTable {
                id_name: id_name.clone(),
                old_name: new_name.clone(),
                new_name: old_name.clone(),
            },
            Operation::AddColumn { table, column } => Operation::DropColumn {
                table: table.clone(),
                column: column.clone(),
            },
            Operation::DropColumn { table, column } => Operation::AddColumn {
                table: table.clone(),
                column: column.clone(),
            },
            Operation::UpdateColumn { table, old, new } => Operation::UpdateColumn {
                table: table.clone(),
                old: new.clone(),
                new: old.clone(),
            },
            Operation::AddPrimaryKey { table, key } => Operation::DropPrimaryKey {
                table: table.clone(),
                key: key.clone(),
            },
            Operation::DropPrimaryKey { table, key } => Operation::AddPrimaryKey {
                table: table.clone(),
                key: key.clone(),
            },
            Operation::AddIndex { table, key } => Operation::DropIndex {
                table: table.clone(),
                key: key.clone(),
            },
            Operation::DropIndex { table, key } => Operation::AddIndex {
                table: table.clone(),
                key: key.clone(),
            },
            Operation::AddForeignKey { source_table, target_table, fk } => {
                Operation::DropForeignKey {
                    source_table: source_table.clone(),
                    target_table: target_table.clone(),
                    fk: fk.clone(),
                }
            }
            Operation::DropForeignKey { source_table, target_table, fk } => {
                Operation::AddForeignKey {
                    source_table: source_table.clone(),
                    target_table: target_table.clone(),
                    fk: fk.clone(),
                }
            }
        }
    }

    /// A one-line human-readable description, used by `plan` and logging.
    pub fn summary(&self) -> String {
        match self {
            Operation::CreateTable(table) => format!("create table `{}`", table.name),
            Operation::DropTable(table) => format!("drop table `{}`", table.name),
            Operation::RenameTable { old_name, new_name, .. } => {
                format!("rename table `{old_name}` to `{new_name}`")
            }
            Operation::AddColumn { table, column } => {
                format!("add column `{}`.`{}`", table, column.name)
            }
            Operation::DropColumn { table, column } => {
                format!("drop column `{}`.`{}`", table, column.name)
            }
            Operation::UpdateColumn { table, old, new } => {
                format!("update column `{}`.`{}` -> `{}`", table, old.name, new.name)
            }
            Operation::AddPrimaryKey { table, key } => {
                format!("add primary key `{}` on `{}`", key.name, table)
            }
            Operation::DropPrimaryKey { table, key } => {
                format!("drop primary key `{}` on `{}`", key.name, table)
            }
            Operation::AddIndex { table, key } => {
                format!("add index `{}` on `{}`", key.name, table)
            }
            Operation::DropIndex { table, key } => {
                format!("drop index `{}` on `{}`", key.name, table)
            }
            Operation::AddForeignKey { fk, .. } => format!("add foreign key `{}`", fk.name),
            Operation::DropForeignKey { fk, .. } => format!("drop foreign key `{}`", fk.name),
        }
    }
}
