use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub const SETUP_DONE: &str = "setup_done";
pub const SEEDED_ON: &str = "seeded_on";

/// Key/value bookkeeping that is not church data.
pub struct MetaRepo;

impl MetaRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_meta WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map(Option::flatten)
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn unset(conn: &Connection, key: &str) -> Result<()> {
        conn.execute("DELETE FROM app_meta WHERE key = ?1", params![key])?;
        Ok(())
    }

    pub fn is_set(conn: &Connection, key: &str) -> Result<bool> {
        Ok(Self::get(conn, key)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn set_overwrites_and_unset_clears() {
        let conn = open_in_memory();
        assert!(!MetaRepo::is_set(&conn, SETUP_DONE).unwrap());
        MetaRepo::set(&conn, SEEDED_ON, "2026-01-04").unwrap();
        MetaRepo::set(&conn, SEEDED_ON, "2026-02-01").unwrap();
        assert_eq!(
            MetaRepo::get(&conn, SEEDED_ON).unwrap().as_deref(),
            Some("2026-02-01")
        );
        MetaRepo::unset(&conn, SEEDED_ON).unwrap();
        assert_eq!(MetaRepo::get(&conn, SEEDED_ON).unwrap(), None);
    }
}
