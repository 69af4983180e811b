pub mod fixtures;
pub mod migrations;
pub mod repository;
pub mod store;

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

pub use store::{fetch, RecordStore};

/// Opens the database file and brings the schema up to date.
pub fn open(path: &Path) -> Result<Connection> {
    let conn =
        Connection::open(path).with_context(|| format!("Opening database at {:?}", path))?;
    // WAL lets `flock attendance check-in` write while the dashboard is open
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
    migrations::run_migrations(&conn).unwrap();
    conn
}
