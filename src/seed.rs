// src/seed.rs

//! Bulk seed-data loading: reads a YAML file of `{ table: [ {col: val, …}, … ] }`
//! rows and inserts them, with foreign-key checks suppressed so seed order
//! doesn't have to respect the FK graph.

use std::collections::BTreeMap;

use mysql::prelude::Queryable;
use mysql::Conn;
use serde_yaml::Value;
use tracing::info;

use crate::error::{MigrationError, Result};

type SeedDocument = BTreeMap<String, Vec<BTreeMap<String, Value>>>;

/// Load and execute every insert described by the seed file at `path`
/// against `conn`.
pub fn load(conn: &mut Conn, path: &str) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let doc: SeedDocument = serde_yaml::from_str(&text)?;

    conn.query_drop("SET FOREIGN_KEY_CHECKS=0")?;
    let result = (|| {
        for (table, rows) in &doc {
            for row in rows {
                let query = insert_query(table, row)?;
                conn.query_drop(&query)?;
            }
        }
        Ok(())
    })();
    conn.query_drop("SET FOREIGN_KEY_CHECKS=1")?;

    if result.is_ok() {
        info!(path, "seed data loaded");
    }
    result
}

fn insert_query(table: &str, row: &BTreeMap<String, Value>) -> Result<String> {
    if row.is_empty() {
        return Err(MigrationError::SchemaStructural(format!(
            "seed row for table `{table}` has no columns"
        )));
    }
    let columns: Vec<&str> = row.keys().map(String::as_str).collect();
    let values: Vec<String> = row.values().map(sql_literal).collect();
    Ok(format!(
        "INSERT INTO `{table}` ({}) VALUES ({})",
        columns
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", "),
        values.join(", ")
    ))
}

fn sql_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Null => "NULL".to_string(),
        other => format!("'{}'", serde_yaml::to_string(other).unwrap_or_default().trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_query_renders_quoted_strings_and_raw_numbers() {
        let mut row = BTreeMap::new();
        row.insert("name".to_string(), Value::String("O'Brien".to_string()));
        row.insert("age".to_string(), Value::Number(30.into()));
        let q = insert_query("users", &row).unwrap();
        assert!(q.starts_with("INSERT INTO `users`"));
        assert!(q.contains("'O''Brien'"));
        assert!(q.contains("30"));
    }

    #[test]
    fn empty_row_is_rejected() {
        let row = BTreeMap::new();
        assert!(insert_query("users", &row).is_err());
    }
}
