// src/wait.rs

//! Database liveness waiter: polls the server DSN (no schema selected) until
//! a trivial query succeeds or a 60-second budget runs out.

use std::thread;
use std::time::{Duration, Instant};

use mysql::prelude::Queryable;
use mysql::{Conn, Opts};
use tracing::info;

use crate::error::{MigrationError, Result};

const BUDGET: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Block until `server_dsn` accepts queries, or the 60-second budget
/// expires.
pub fn until_ready(server_dsn: &str) -> Result<()> {
    let deadline = Instant::now() + BUDGET;
    let opts = Opts::from_url(server_dsn).map_err(mysql::Error::from)?;

    loop {
        match Conn::new(opts.clone()).and_then(|mut conn| conn.query_drop("SHOW DATABASES")) {
            Ok(()) => {
                info!("database accepting connections");
                return Ok(());
            }
            Err(source) => {
                if Instant::now() >= deadline {
                    return Err(MigrationError::DbConnection(source));
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    }
}
