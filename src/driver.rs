// src/driver.rs

//! Orchestration: ingest → load old state → diff → announce → execute →
//! save. `plan` stops after announcing; `run` executes and persists.

use tracing::info;

use crate::config::MigrateOptions;
use crate::diff::diff;
use crate::error::{MigrationError, Result};
use crate::exec::Executor;
use crate::model::State;
use crate::operation::Operation;
use crate::persist;
use crate::schema;

/// Ingest the desired schema, load the previous snapshot, and diff them.
/// Used by both `plan` and `run` so the two modes can never disagree about
/// what the plan is.
fn build_plan(options: &MigrateOptions) -> Result<(State, State, Vec<Operation>)> {
    let text = options.load_schema_text()?;
    let doc = schema::parse(&text, options.schema_format)?;
    let mut new_state = schema::ingest::ingest(&doc)?;
    new_state.database = options.load_database_config()?;

    let old_state = persist::load(&options.state_path)?;
    let ops = diff(&old_state, &new_state)?;
    Ok((old_state, new_state, ops))
}

/// Print the plan a migration would execute, in order, with no database
/// contact.
pub fn plan(options: &MigrateOptions) -> Result<Vec<Operation>> {
    let (_, _, ops) = build_plan(options)?;
    announce(&ops);
    Ok(ops)
}

/// Ingest, diff, announce, execute, and (on success) persist the new state.
pub fn run(options: &MigrateOptions) -> Result<()> {
    let (_, new_state, ops) = build_plan(options)?;
    announce(&ops);

    if ops.is_empty() {
        info!("nothing to do");
        return Ok(());
    }

    let mut executor = Executor::connect(&new_state.database.dsn())?;
    match executor.apply(&ops) {
        Ok(()) => {
            persist::save(&options.state_path, &new_state.clone().sorted())?;
            Ok(())
        }
        Err(MigrationError::RollbackFailure { migration, rollback }) => {
            println!(">>> MIGRATION FAILED: {migration}");
            println!(">>> RECOVERY FAILED: {rollback}");
            Err(MigrationError::RollbackFailure { migration, rollback })
        }
        Err(e) => {
            println!(">>> MIGRATION FAILED: {e}");
            println!(">>> RECOVERY SUCCEEDED");
            Err(e)
        }
    }
}

/// Print the plan in human-readable form. Always called before execution.
pub fn announce(ops: &[Operation]) {
    if ops.is_empty() {
        println!("(no changes)");
        return;
    }
    for (i, op) in ops.iter().enumerate() {
        println!("{:>3}. {}", i + 1, op.summary());
    }
}
