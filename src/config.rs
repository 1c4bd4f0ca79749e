// src/config.rs

//! Typed option records and database-configuration loading.
//!
//! The CLI only ever hands in a [`MigrateOptions`]; nothing in this module
//! touches `clap` directly, so the core stays testable without constructing
//! a `Cli` struct.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MigrationError, Result};
use crate::model::DatabaseConfig;
use crate::schema::SchemaFormat;

/// Options shared by `plan` and `run`.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub schema_path: PathBuf,
    pub schema_format: SchemaFormat,
    pub state_path: PathBuf,
    pub database_config_path: PathBuf,
    pub environment: String,
}

impl MigrateOptions {
    pub fn load_schema_text(&self) -> Result<String> {
        fs::read_to_string(&self.schema_path).map_err(MigrationError::from)
    }

    pub fn load_database_config(&self) -> Result<DatabaseConfig> {
        load_database_config(&self.database_config_path, &self.environment)
    }
}

/// A `database.yml`-style file: a map of environment name to connection
/// parameters.
#[derive(Debug, Deserialize)]
struct DatabaseConfigFile(HashMap<String, DatabaseConfig>);

/// Read `path` and select the `environment` entry.
pub fn load_database_config(path: &Path, environment: &str) -> Result<DatabaseConfig> {
    let text = fs::read_to_string(path).map_err(|e| {
        MigrationError::ConfigInvalid(format!("reading `{}`: {e}", path.display()))
    })?;
    let file: DatabaseConfigFile = serde_yaml::from_str(&text).map_err(|e| {
        MigrationError::ConfigInvalid(format!("parsing `{}`: {e}", path.display()))
    })?;
    file.0.get(environment).cloned().ok_or_else(|| {
        MigrationError::ConfigInvalid(format!(
            "environment `{environment}` not found in `{}`",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_environment_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yml");
        fs::write(&path, "default:\n  user: root\n  passwd: x\n  addr: 127.0.0.1:3306\n  dbname: app\n").unwrap();
        let err = load_database_config(&path, "staging").unwrap_err();
        assert!(matches!(err, MigrationError::ConfigInvalid(_)));
    }

    #[test]
    fn selects_requested_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yml");
        fs::write(
            &path,
            "default:\n  user: root\n  passwd: x\n  addr: 127.0.0.1:3306\n  dbname: app\nstaging:\n  user: stage\n  passwd: y\n  addr: db:3306\n  dbname: app_staging\n",
        )
        .unwrap();
        let cfg = load_database_config(&path, "staging").unwrap();
        assert_eq!(cfg.user, "stage");
        assert_eq!(cfg.dbname, "app_staging");
    }
}
