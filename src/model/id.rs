// src/model/id.rs

//! Stable identifiers for tables and columns.
//!
//! Identity is derived once, at ingestion time, from the hyper-schema
//! document's own JSON-path position. It never changes for the lifetime of
//! a table or column in state, even across renames — `name` changes, `id`
//! does not. Diffing and lookup code must always compare by `id`, never by
//! `name`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a table: `#/definitions/<key>`, `#/properties/<key>`,
/// or one of the `#/links<href>/...` forms for schemas reachable through a
/// hyper-schema link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableId(String);

impl TableId {
    pub fn definitions(key: &str) -> Self {
        TableId(format!("#/definitions/{key}"))
    }

    pub fn properties(key: &str) -> Self {
        TableId(format!("#/properties/{key}"))
    }

    pub fn link_schema(href: &str) -> Self {
        TableId(format!("#/links{href}/schema"))
    }

    pub fn link_target_schema(href: &str) -> Self {
        TableId(format!("#/links{href}/target_schema"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TableId {
    fn from(value: String) -> Self {
        TableId(value)
    }
}

impl From<&str> for TableId {
    fn from(value: &str) -> Self {
        TableId(value.to_string())
    }
}

/// Stable identifier for a column: the raw hyper-schema property key, unique
/// within its owning table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ColumnId {
    fn from(value: String) -> Self {
        ColumnId(value)
    }
}

impl From<&str> for ColumnId {
    fn from(value: &str) -> Self {
        ColumnId(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_id_format() {
        assert_eq!(TableId::definitions("user").as_str(), "#/definitions/user");
    }

    #[test]
    fn properties_id_format() {
        assert_eq!(TableId::properties("user").as_str(), "#/properties/user");
    }

    #[test]
    fn link_id_formats() {
        assert_eq!(
            TableId::link_schema("/users").as_str(),
            "#/links/users/schema"
        );
        assert_eq!(
            TableId::link_target_schema("/users").as_str(),
            "#/links/users/target_schema"
        );
    }

    #[test]
    fn ids_order_lexically() {
        let mut ids = vec![TableId::definitions("b"), TableId::definitions("a")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "#/definitions/a");
    }
}
