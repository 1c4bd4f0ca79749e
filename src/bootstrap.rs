// src/bootstrap.rs

//! `CREATE DATABASE` bootstrap: used by `init` to create the target schema
//! before the first migration runs against it.

use mysql::prelude::Queryable;
use mysql::{Conn, Opts};
use tracing::info;

use crate::error::Result;
use crate::model::DatabaseConfig;

/// Connect to the server (no schema selected) and create `config.dbname` if
/// it doesn't already exist.
pub fn create_database_if_missing(config: &DatabaseConfig) -> Result<()> {
    let opts = Opts::from_url(&config.server_dsn()).map_err(mysql::Error::from)?;
    let mut conn = Conn::new(opts)?;
    conn.query_drop(format!(
        "CREATE DATABASE IF NOT EXISTS `{}` CHARACTER SET utf8mb4",
        config.dbname
    ))?;
    info!(dbname = %config.dbname, "database ensured");
    Ok(())
}
