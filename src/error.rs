// src/error.rs

use thiserror::Error;

/// Core error types for schemamig
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A required CLI flag or option was absent.
    #[error("option `{0}` is required but was not supplied")]
    OptionEmpty(String),

    /// Database configuration file missing, malformed, or missing the
    /// requested environment.
    #[error("database configuration invalid: {0}")]
    ConfigInvalid(String),

    /// A hyper-schema annotation had the wrong shape (not a map/array/string
    /// where one was expected).
    #[error("schema structure invalid: {0}")]
    SchemaStructural(String),

    /// A foreign key or key target referenced a table/column id that does
    /// not exist.
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    /// The new side of a table update failed a diff-time invariant (empty
    /// column list, empty key target, duplicate key name).
    #[error("invalid table update: {0}")]
    DiffValidation(String),

    /// Opening the MySQL connection failed.
    #[error("database connection error: {0}")]
    DbConnection(#[from] mysql::Error),

    /// A specific DDL statement failed while applying the plan.
    #[error("migration failed at operation {index} (`{query}`): {source}")]
    DdlExecution {
        index: usize,
        query: String,
        #[source]
        source: mysql::Error,
    },

    /// Rolling back the already-applied prefix of a failed plan itself
    /// failed. Carries both the original failure and the rollback failure.
    #[error("recovery failed after migration error ({migration}): {rollback}")]
    RollbackFailure {
        migration: Box<MigrationError>,
        rollback: Box<MigrationError>,
    },

    /// I/O error reading or writing a schema, state, or config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/serialize error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse/serialize error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using schemamig's error type.
pub type Result<T> = std::result::Result<T, MigrationError>;
