use anyhow::Result;
use rusqlite::Connection;

use crate::board::{Filter, Filterable, Record, Sortable};
use crate::error::FlockError;
use crate::service::{call, Envelope};

/// The CRUD boundary each dashboard section reads and writes through.
///
/// Stores are unit structs with associated functions over a borrowed
/// connection. `create` and `update` return the stored record as the
/// database now holds it, so callers can replace optimistic copies.
pub trait RecordStore {
    type Record: Record + Filterable + Sortable + Clone;
    type Draft;

    fn all(conn: &Connection) -> Result<Vec<Self::Record>>;

    fn list(
        conn: &Connection,
        filter: &Filter<<Self::Record as Filterable>::Facet>,
    ) -> Result<Vec<Self::Record>> {
        let all = Self::all(conn)?;
        Ok(filter.apply(&all).into_iter().cloned().collect())
    }

    fn get(conn: &Connection, id: i64) -> Result<Self::Record> {
        Self::all(conn)?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| FlockError::not_found(Self::Record::ENTITY, id).into())
    }

    fn create(conn: &Connection, draft: &Self::Draft) -> Result<Self::Record>;
    fn update(conn: &Connection, record: &Self::Record) -> Result<Self::Record>;
    fn remove(conn: &Connection, id: i64) -> Result<()>;
}

/// Lists through `S` and wraps the outcome in an envelope.
pub fn fetch<S: RecordStore>(
    conn: &Connection,
    filter: &Filter<<S::Record as Filterable>::Facet>,
) -> Envelope<Vec<S::Record>> {
    let action = format!("load {} records", S::Record::ENTITY);
    call(&action, || S::list(conn, filter))
}
