// src/persist.rs

//! Loading and saving `State` snapshots as YAML on disk.
//!
//! A missing or empty state file is not an error — it means "nothing has
//! been migrated yet" and is treated as an empty `State`. Saving writes to a
//! temp file in the same directory and renames it into place, so a crash
//! mid-write never leaves a truncated snapshot behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::model::State;

/// Load a state snapshot from `path`. Returns an empty `State` if the file
/// does not exist or is empty.
pub fn load(path: &Path) -> Result<State> {
    if !path.exists() {
        debug!(path = %path.display(), "no state file, starting from empty state");
        return Ok(State::new());
    }
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(State::new());
    }
    Ok(serde_yaml::from_str(&text)?)
}

/// Persist `state` to `path`, replacing any existing snapshot atomically.
pub fn save(path: &Path, state: &State) -> Result<()> {
    let yaml = serde_yaml::to_string(state)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::Builder::new()
        .prefix(".schemamig-state-")
        .tempfile_in(dir.unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(yaml.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "wrote state snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, ColumnId, Table, TableId};

    fn sample_state() -> State {
        let mut state = State::new();
        state.tables.push(Table {
            id: TableId::definitions("user"),
            name: "users".to_string(),
            primary_key: vec![],
            index: vec![],
            columns: vec![Column {
                id: ColumnId::from("id"),
                name: "id".to_string(),
                ty: "int".to_string(),
                unique: false,
                auto_increment: true,
                auto_update: false,
                not_null: true,
                default: String::new(),
            }],
        });
        state
    }

    #[test]
    fn missing_file_loads_as_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yml");
        let state = load(&path).unwrap();
        assert!(state.tables.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yml");
        let state = sample_state();
        save(&path, &state).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.tables, state.tables);
    }

    #[test]
    fn empty_file_loads_as_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.yml");
        fs::write(&path, "").unwrap();
        let state = load(&path).unwrap();
        assert!(state.tables.is_empty());
    }
}
