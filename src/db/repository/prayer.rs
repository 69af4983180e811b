use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;

use super::{ensure_changed, require};
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{NewPrayerRequest, PrayerComment, PrayerRequest, PrayerUpdate, Transitions};

const COLUMNS: &str = "id, title, description, requester, status, priority, is_private, created_at";

fn request_from_row(row: &Row) -> rusqlite::Result<PrayerRequest> {
    Ok(PrayerRequest {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        requester: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        is_private: row.get(6)?,
        created_at: row.get(7)?,
        comments: Vec::new(),
        updates: Vec::new(),
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<PrayerComment> {
    Ok(PrayerComment {
        id: row.get(0)?,
        request_id: row.get(1)?,
        author: row.get(2)?,
        body: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn update_from_row(row: &Row) -> rusqlite::Result<PrayerUpdate> {
    Ok(PrayerUpdate {
        id: row.get(0)?,
        request_id: row.get(1)?,
        body: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub struct PrayerRepo;

impl PrayerRepo {
    /// Attaches comments and updates, oldest first.
    fn hydrate(conn: &Connection, requests: &mut [PrayerRequest]) -> Result<()> {
        let mut comments: HashMap<i64, Vec<PrayerComment>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT id, request_id, author, body, created_at FROM prayer_comments
             ORDER BY created_at, id",
        )?;
        for comment in stmt.query_map([], comment_from_row)? {
            let comment = comment?;
            comments.entry(comment.request_id).or_default().push(comment);
        }

        let mut updates: HashMap<i64, Vec<PrayerUpdate>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT id, request_id, body, created_at FROM prayer_updates ORDER BY created_at, id",
        )?;
        for update in stmt.query_map([], update_from_row)? {
            let update = update?;
            updates.entry(update.request_id).or_default().push(update);
        }

        for request in requests.iter_mut() {
            request.comments = comments.remove(&request.id).unwrap_or_default();
            request.updates = updates.remove(&request.id).unwrap_or_default();
        }
        Ok(())
    }

    pub fn add_comment(
        conn: &Connection,
        request_id: i64,
        author: &str,
        body: &str,
        now: NaiveDateTime,
    ) -> Result<PrayerComment> {
        require(conn, "prayer_requests", "prayer request", request_id)?;
        if body.trim().is_empty() {
            return Err(FlockError::validation("comment", "is required").into());
        }
        conn.execute(
            "INSERT INTO prayer_comments (request_id, author, body, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![request_id, author.trim(), body.trim(), now],
        )?;
        conn.query_row(
            "SELECT id, request_id, author, body, created_at FROM prayer_comments WHERE id = ?1",
            params![conn.last_insert_rowid()],
            comment_from_row,
        )
        .map_err(anyhow::Error::from)
    }

    pub fn add_update(
        conn: &Connection,
        request_id: i64,
        body: &str,
        now: NaiveDateTime,
    ) -> Result<PrayerUpdate> {
        require(conn, "prayer_requests", "prayer request", request_id)?;
        if body.trim().is_empty() {
            return Err(FlockError::validation("update", "is required").into());
        }
        conn.execute(
            "INSERT INTO prayer_updates (request_id, body, created_at) VALUES (?1, ?2, ?3)",
            params![request_id, body.trim(), now],
        )?;
        conn.query_row(
            "SELECT id, request_id, body, created_at FROM prayer_updates WHERE id = ?1",
            params![conn.last_insert_rowid()],
            update_from_row,
        )
        .map_err(anyhow::Error::from)
    }

    pub fn create_at(
        conn: &Connection,
        draft: &NewPrayerRequest,
        now: NaiveDateTime,
    ) -> Result<PrayerRequest> {
        conn.execute(
            "INSERT INTO prayer_requests (title, description, requester, status, priority,
                                          is_private, created_at)
             VALUES (?1, ?2, ?3, 'new', ?4, ?5, ?6)",
            params![
                draft.title,
                draft.description,
                draft.requester,
                draft.priority,
                draft.is_private,
                now,
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }
}

impl RecordStore for PrayerRepo {
    type Record = PrayerRequest;
    type Draft = NewPrayerRequest;

    fn all(conn: &Connection) -> Result<Vec<PrayerRequest>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prayer_requests ORDER BY created_at DESC, id DESC",
            COLUMNS
        ))?;
        let mut requests = stmt
            .query_map([], request_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Self::hydrate(conn, &mut requests)?;
        Ok(requests)
    }

    fn get(conn: &Connection, id: i64) -> Result<PrayerRequest> {
        let request = conn
            .query_row(
                &format!("SELECT {} FROM prayer_requests WHERE id = ?1", COLUMNS),
                params![id],
                request_from_row,
            )
            .optional()?
            .ok_or(FlockError::not_found("prayer request", id))?;
        let mut one = [request];
        Self::hydrate(conn, &mut one)?;
        let [request] = one;
        Ok(request)
    }

    fn create(conn: &Connection, draft: &NewPrayerRequest) -> Result<PrayerRequest> {
        Self::create_at(conn, draft, Local::now().naive_local())
    }

    fn update(conn: &Connection, request: &PrayerRequest) -> Result<PrayerRequest> {
        let current = Self::get(conn, request.id)?;
        if current.status != request.status {
            current.status.check_transition(request.status)?;
            log::info!(
                "prayer request #{} {} -> {}",
                request.id,
                current.status.as_str(),
                request.status.as_str()
            );
        }
        conn.execute(
            "UPDATE prayer_requests
             SET title = ?1, description = ?2, requester = ?3, status = ?4, priority = ?5,
                 is_private = ?6
             WHERE id = ?7",
            params![
                request.title,
                request.description,
                request.requester,
                request.status,
                request.priority,
                request.is_private,
                request.id,
            ],
        )?;
        Self::get(conn, request.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM prayer_requests WHERE id = ?1", params![id])?;
        ensure_changed(changed, "prayer request", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::models::{PrayerStatus, Priority};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn request(conn: &Connection) -> PrayerRequest {
        PrayerRepo::create_at(
            conn,
            &NewPrayerRequest {
                title: "Surgery recovery".into(),
                description: "For Tom's knee".into(),
                requester: "Tom Hale".into(),
                priority: Priority::High,
                is_private: true,
            },
            at(9),
        )
        .unwrap()
    }

    #[test]
    fn comments_and_updates_come_back_in_order() {
        let conn = open_in_memory();
        let req = request(&conn);
        PrayerRepo::add_comment(&conn, req.id, "Grace", "Praying for you", at(11)).unwrap();
        PrayerRepo::add_comment(&conn, req.id, "Paul", "Same here", at(10)).unwrap();
        PrayerRepo::add_update(&conn, req.id, "Surgery went well", at(12)).unwrap();

        let loaded = PrayerRepo::get(&conn, req.id).unwrap();
        let authors: Vec<&str> = loaded.comments.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, vec!["Paul", "Grace"]);
        assert_eq!(loaded.updates.len(), 1);
        assert_eq!(loaded.display_requester(), "(private)");
    }

    #[test]
    fn answered_request_cannot_reopen() {
        let conn = open_in_memory();
        let mut req = request(&conn);
        req.status = PrayerStatus::Answered;
        let mut req = PrayerRepo::update(&conn, &req).unwrap();
        req.status = PrayerStatus::New;
        assert!(PrayerRepo::update(&conn, &req).is_err());
        assert_eq!(
            PrayerRepo::get(&conn, req.id).unwrap().status,
            PrayerStatus::Answered
        );
    }

    #[test]
    fn comment_on_missing_request_is_not_found() {
        let conn = open_in_memory();
        let err = PrayerRepo::add_comment(&conn, 5, "Ann", "hello", at(9)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlockError>(),
            Some(&FlockError::not_found("prayer request", 5))
        );
    }
}
