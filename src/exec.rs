// src/exec.rs

//! Execution of a migration plan against MySQL.
//!
//! `Executor::apply` runs each operation's `query()` in order. If one fails,
//! it rolls back every operation that already succeeded, in strict reverse
//! order, by running each one's `rollback()` query. If the rollback itself
//! fails partway through, the executor reports both failures via
//! `MigrationError::RollbackFailure` rather than leaving the caller to guess
//! how far recovery got.

use mysql::prelude::Queryable;
use mysql::{Conn, Opts};
use tracing::{debug, error, info, warn};

use crate::error::{MigrationError, Result};
use crate::operation::Operation;

/// A connection to the target database plus the machinery to apply and
/// roll back a plan.
pub struct Executor {
    conn: Conn,
}

impl Executor {
    /// Connect using a `mysql://` DSN.
    pub fn connect(dsn: &str) -> Result<Self> {
        let opts = Opts::from_url(dsn).map_err(mysql::Error::from)?;
        let conn = Conn::new(opts)?;
        Ok(Executor { conn })
    }

    /// Apply every operation in `plan`, in order. On failure, roll back the
    /// prefix that already succeeded and return the original error (or a
    /// `RollbackFailure` wrapping both, if recovery also failed).
    pub fn apply(&mut self, plan: &[Operation]) -> Result<()> {
        for (index, op) in plan.iter().enumerate() {
            let query = op.query();
            debug!(index, query = %query, "applying operation");
            if let Err(source) = self.conn.query_drop(&query) {
                error!(index, summary = %op.summary(), "operation failed");
                let migration_err = MigrationError::DdlExecution { index, query, source };
                return match self.rollback_prefix(&plan[..index]) {
                    Ok(()) => Err(migration_err),
                    Err(rollback_err) => Err(MigrationError::RollbackFailure {
                        migration: Box::new(migration_err),
                        rollback: Box::new(rollback_err),
                    }),
                };
            }
            info!(summary = %op.summary(), "applied");
        }
        Ok(())
    }

    /// Roll back `applied`, in strict reverse order. Used both internally by
    /// `apply` and directly by callers that need to revert a plan that
    /// succeeded but should not have been kept (e.g. a dry run gone wrong).
    pub fn rollback_prefix(&mut self, applied: &[Operation]) -> Result<()> {
        for (index, op) in applied.iter().enumerate().rev() {
            let rollback = op.rollback();
            let query = rollback.query();
            warn!(index, query = %query, "rolling back operation");
            if let Err(source) = self.conn.query_drop(&query) {
                return Err(MigrationError::DdlExecution { index, query, source });
            }
        }
        Ok(())
    }
}
