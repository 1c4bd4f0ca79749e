// src/schema/ingest.rs

//! Hyper-schema → [`State`] ingestion.
//!
//! Two passes: first every `table`-annotated node becomes a [`Table`] with
//! its columns and keys resolved against *that table's own* columns; then,
//! once every table exists, every column's `foreign_key` annotation is
//! resolved against the full table set. Resolving foreign keys only after
//! all tables exist means a foreign key may point at a table that is
//! declared later in the document.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{MigrationError, Result};
use crate::model::{Column, ColumnId, ForeignKey, Key, State, Table, TableId};

use super::{HyperSchema, SchemaNode};

#[derive(Debug, Deserialize)]
struct ForeignKeyAnnotation {
    name: String,
    target_table: String,
    target_column: String,
    #[serde(default)]
    update_cascade: bool,
    #[serde(default)]
    delete_cascade: bool,
}

#[derive(Debug, Deserialize)]
struct ColumnAnnotation {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default)]
    auto_update: bool,
    #[serde(default)]
    not_null: bool,
    #[serde(default)]
    default: String,
    #[serde(default)]
    foreign_key: Option<ForeignKeyAnnotation>,
}

#[derive(Debug, Deserialize)]
struct TableAnnotation {
    name: String,
    #[serde(default)]
    primary_key: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    index: Option<BTreeMap<String, Vec<String>>>,
}

/// A foreign-key annotation discovered on a column, deferred until every
/// table has been ingested and its target can be resolved.
struct PendingForeignKey {
    source_table: TableId,
    source_column: ColumnId,
    annotation: ForeignKeyAnnotation,
}

/// Walk a hyper-schema document and build a sorted [`State`].
pub fn ingest(doc: &HyperSchema) -> Result<State> {
    let mut state = State::new();
    let mut pending = Vec::new();

    for (key, node) in &doc.definitions {
        ingest_node(TableId::definitions(key), node, &mut state, &mut pending)?;
    }
    for (key, node) in &doc.properties {
        ingest_node(TableId::properties(key), node, &mut state, &mut pending)?;
    }
    for link in &doc.links {
        if let Some(node) = &link.schema {
            ingest_node(
                TableId::link_schema(&link.href),
                node,
                &mut state,
                &mut pending,
            )?;
        }
        if let Some(node) = &link.target_schema {
            ingest_node(
                TableId::link_target_schema(&link.href),
                node,
                &mut state,
                &mut pending,
            )?;
        }
    }

    state.foreign_keys = resolve_foreign_keys(&state, pending)?;
    Ok(state.sorted())
}

fn ingest_node(
    id: TableId,
    node: &SchemaNode,
    state: &mut State,
    pending: &mut Vec<PendingForeignKey>,
) -> Result<()> {
    let Some(raw_table) = node.extras.get("table") else {
        return Ok(());
    };
    let annotation: TableAnnotation = serde_json::from_value(raw_table.clone())
        .map_err(|e| MigrationError::SchemaStructural(format!("table `{id}`: {e}")))?;

    let mut columns = Vec::new();
    for (col_key, col_node) in &node.properties {
        let Some(raw_column) = col_node.extras.get("column") else {
            continue;
        };
        let col_annotation: ColumnAnnotation = serde_json::from_value(raw_column.clone())
            .map_err(|e| {
                MigrationError::SchemaStructural(format!(
                    "column `{col_key}` in table `{id}`: {e}"
                ))
            })?;
        let column_id: ColumnId = col_key.clone().into();

        if let Some(fk_annotation) = col_annotation.foreign_key {
            pending.push(PendingForeignKey {
                source_table: id.clone(),
                source_column: column_id.clone(),
                annotation: fk_annotation,
            });
        }

        columns.push(Column {
            id: column_id,
            name: col_annotation.name,
            ty: col_annotation.ty,
            unique: col_annotation.unique,
            auto_increment: col_annotation.auto_increment,
            auto_update: col_annotation.auto_update,
            not_null: col_annotation.not_null,
            default: col_annotation.default,
        });
    }

    let primary_key = resolve_keys(&id, &columns, annotation.primary_key)?;
    let index = resolve_keys(&id, &columns, annotation.index)?;

    state.tables.push(Table {
        id,
        name: annotation.name,
        primary_key,
        index,
        columns,
    });
    Ok(())
}

fn resolve_keys(
    table_id: &TableId,
    columns: &[Column],
    raw: Option<BTreeMap<String, Vec<String>>>,
) -> Result<Vec<Key>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let mut keys = Vec::new();
    for (name, targets) in raw {
        let mut target = Vec::with_capacity(targets.len());
        for col_id in targets {
            let id: ColumnId = col_id.clone().into();
            if !columns.iter().any(|c| c.id == id) {
                return Err(MigrationError::ReferenceNotFound(format!(
                    "key `{name}` in table `{table_id}` targets unknown column `{col_id}`"
                )));
            }
            target.push(id);
        }
        keys.push(Key { name, target });
    }
    Ok(keys)
}

fn resolve_foreign_keys(
    state: &State,
    pending: Vec<PendingForeignKey>,
) -> Result<Vec<ForeignKey>> {
    let mut foreign_keys = Vec::with_capacity(pending.len());
    for item in pending {
        let ann = item.annotation;
        let target_table_id: TableId = ann.target_table.clone().into();
        let target_table = state.table(&target_table_id).ok_or_else(|| {
            MigrationError::ReferenceNotFound(format!(
                "foreign key `{}` target table `{}` not found",
                ann.name, ann.target_table
            ))
        })?;

        let target_column_id: ColumnId = ann.target_column.clone().into();
        if !target_table.has_column(&target_column_id) {
            return Err(MigrationError::ReferenceNotFound(format!(
                "foreign key `{}` target column `{}` not found in table `{}`",
                ann.name, ann.target_column, target_table_id
            )));
        }

        foreign_keys.push(ForeignKey {
            name: ann.name,
            source_table: item.source_table,
            source_column: item.source_column,
            target_table: target_table_id,
            target_column: target_column_id,
            update_cascade: ann.update_cascade,
            delete_cascade: ann.delete_cascade,
        });
    }
    Ok(foreign_keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{parse, SchemaFormat};

    const DOC: &str = r##"
definitions:
  user:
    table:
      name: users
      primary_key:
        pk_user: ["id"]
    properties:
      id:
        column: { name: id, type: "int", auto_increment: true, not_null: true }
      name:
        column: { name: name, type: "varchar(255)" }
  post:
    table:
      name: posts
      index:
        idx_author: ["author_id"]
    properties:
      id:
        column: { name: id, type: "int", auto_increment: true, not_null: true }
      author_id:
        column:
          name: author_id
          type: "int"
          foreign_key:
            name: fk_post_author
            target_table: "#/definitions/user"
            target_column: id
            delete_cascade: true
"##;

    #[test]
    fn ingests_tables_columns_keys_and_foreign_keys() {
        let doc = parse(DOC, SchemaFormat::Yaml).unwrap();
        let state = ingest(&doc).unwrap();

        assert_eq!(state.tables.len(), 2);
        let user = state.table(&TableId::definitions("user")).unwrap();
        assert_eq!(user.name, "users");
        assert_eq!(user.columns.len(), 2);
        assert_eq!(user.primary_key[0].name, "pk_user");
        assert_eq!(user.primary_key[0].target, vec![ColumnId::from("id")]);

        let post = state.table(&TableId::definitions("post")).unwrap();
        assert_eq!(post.index[0].name, "idx_author");

        assert_eq!(state.foreign_keys.len(), 1);
        let fk = &state.foreign_keys[0];
        assert_eq!(fk.name, "fk_post_author");
        assert_eq!(fk.source_table, TableId::definitions("post"));
        assert_eq!(fk.target_table, TableId::definitions("user"));
        assert!(fk.delete_cascade);
        assert!(!fk.update_cascade);
    }

    #[test]
    fn column_without_annotation_is_skipped() {
        let doc = parse(
            r#"
definitions:
  t:
    table: { name: t }
    properties:
      untouched:
        type: string
      id:
        column: { name: id, type: "int" }
"#,
            SchemaFormat::Yaml,
        )
        .unwrap();
        let state = ingest(&doc).unwrap();
        assert_eq!(state.tables[0].columns.len(), 1);
    }

    #[test]
    fn unresolved_key_target_errors() {
        let doc = parse(
            r#"
definitions:
  t:
    table:
      name: t
      primary_key:
        pk: ["missing"]
    properties:
      id:
        column: { name: id, type: "int" }
"#,
            SchemaFormat::Yaml,
        )
        .unwrap();
        let err = ingest(&doc).unwrap_err();
        assert!(matches!(err, MigrationError::ReferenceNotFound(_)));
    }

    #[test]
    fn unresolved_foreign_key_target_errors() {
        let doc = parse(
            r##"
definitions:
  t:
    table: { name: t }
    properties:
      id:
        column:
          name: id
          type: "int"
          foreign_key:
            name: fk
            target_table: "#/definitions/missing"
            target_column: id
"##,
            SchemaFormat::Yaml,
        )
        .unwrap();
        let err = ingest(&doc).unwrap_err();
        assert!(matches!(err, MigrationError::ReferenceNotFound(_)));
    }

    #[test]
    fn links_schema_and_target_schema_are_ingested() {
        let doc = parse(
            r#"
links:
  - href: "/widgets"
    schema:
      table: { name: widgets }
      properties:
        id:
          column: { name: id, type: "int" }
    targetSchema:
      table: { name: widget_responses }
      properties:
        id:
          column: { name: id, type: "int" }
"#,
            SchemaFormat::Yaml,
        )
        .unwrap();
        let state = ingest(&doc).unwrap();
        assert_eq!(state.tables.len(), 2);
        assert!(state
            .has_table(&TableId::link_schema("/widgets")));
        assert!(state
            .has_table(&TableId::link_target_schema("/widgets")));
    }
}
