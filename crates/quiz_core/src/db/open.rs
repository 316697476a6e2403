//! Opening quiz databases.
//!
//! # Invariants
//! - Returned connections enforce foreign keys, so deleting a quiz or
//!   question cascades to its links, answers and results.
//! - Returned connections are fully migrated.

use super::migrations::{apply_migrations, schema_version};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Concurrent CLI runs against one file wait this long for the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating when missing) and migrates the quiz database at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    prepare("file", || Connection::open(path))
}

/// Opens a private, migrated in-memory database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    prepare("memory", Connection::open_in_memory)
}

fn prepare(
    target: &'static str,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started = Instant::now();
    let result = connect()
        .map_err(DbError::from)
        .and_then(|mut conn| configure(&mut conn).map(|()| conn));

    let elapsed_ms = started.elapsed().as_millis();
    match &result {
        Ok(conn) => info!(
            "event=db_open module=db status=ok target={target} schema_version={} duration_ms={elapsed_ms}",
            schema_version(conn).unwrap_or_default()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error target={target} duration_ms={elapsed_ms} error={err}"
        ),
    }
    result
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
