use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::ensure_changed;
use crate::db::repository::MemberRepo;
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{MemberStatus, NewNewsletter, Newsletter, NewsletterStatus, Transitions};

const COLUMNS: &str =
    "id, title, body, status, scheduled_for, sent_at, recipients, open_rate, click_rate";

fn newsletter_from_row(row: &Row) -> rusqlite::Result<Newsletter> {
    Ok(Newsletter {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        status: row.get(3)?,
        scheduled_for: row.get(4)?,
        sent_at: row.get(5)?,
        recipients: row.get(6)?,
        open_rate: row.get(7)?,
        click_rate: row.get(8)?,
    })
}

pub struct NewsletterRepo;

impl RecordStore for NewsletterRepo {
    type Record = Newsletter;
    type Draft = NewNewsletter;

    fn all(conn: &Connection) -> Result<Vec<Newsletter>> {
        let mut stmt = conn.prepare(&format!("SELECT {} FROM newsletters ORDER BY id DESC", COLUMNS))?;
        let rows = stmt.query_map([], newsletter_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Newsletter> {
        conn.query_row(
            &format!("SELECT {} FROM newsletters WHERE id = ?1", COLUMNS),
            params![id],
            newsletter_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("newsletter", id).into())
    }

    fn create(conn: &Connection, draft: &NewNewsletter) -> Result<Newsletter> {
        conn.execute(
            "INSERT INTO newsletters (title, body, status) VALUES (?1, ?2, 'draft')",
            params![draft.title, draft.body],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    /// Status changes are checked against the stored status. A newsletter
    /// sent without a recipient count goes to every active member.
    fn update(conn: &Connection, newsletter: &Newsletter) -> Result<Newsletter> {
        let current = Self::get(conn, newsletter.id)?;
        let mut next = newsletter.clone();
        if current.status != next.status {
            current.status.check_transition(next.status)?;
            log::info!(
                "newsletter #{} {} -> {}",
                next.id,
                current.status.as_str(),
                next.status.as_str()
            );
        }
        if next.status == NewsletterStatus::Scheduled && next.scheduled_for.is_none() {
            return Err(FlockError::validation("scheduled_for", "a scheduled newsletter needs a date").into());
        }
        if next.status == NewsletterStatus::Sent && next.recipients == 0 {
            next.recipients = MemberRepo::count_by_status(conn, MemberStatus::Active)?;
        }
        conn.execute(
            "UPDATE newsletters
             SET title = ?1, body = ?2, status = ?3, scheduled_for = ?4, sent_at = ?5,
                 recipients = ?6, open_rate = ?7, click_rate = ?8
             WHERE id = ?9",
            params![
                next.title,
                next.body,
                next.status,
                next.scheduled_for,
                next.sent_at,
                next.recipients,
                next.open_rate,
                next.click_rate,
                next.id,
            ],
        )?;
        Self::get(conn, next.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM newsletters WHERE id = ?1", params![id])?;
        ensure_changed(changed, "newsletter", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lifecycle, NewMember};
    use crate::db::open_in_memory;
    use chrono::NaiveDate;

    #[test]
    fn sending_stamps_active_member_count() {
        let conn = open_in_memory();
        for (name, status) in [
            ("Ada", MemberStatus::Active),
            ("Ben", MemberStatus::Active),
            ("Cy", MemberStatus::Visitor),
        ] {
            MemberRepo::create(
                &conn,
                &NewMember {
                    name: name.into(),
                    email: format!("{}@example.org", name),
                    phone: None,
                    department: None,
                    status,
                    joined_on: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                },
            )
            .unwrap();
        }
        let draft = NewsletterRepo::create(
            &conn,
            &NewNewsletter {
                title: "Harvest Sunday".into(),
                body: "Bring a can".into(),
            },
        )
        .unwrap();
        let now = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();

        let sent = NewsletterRepo::update(&conn, &draft.advanced(now).unwrap()).unwrap();
        assert_eq!(sent.status, NewsletterStatus::Scheduled);
        assert_eq!(sent.scheduled_for, Some(NaiveDate::from_ymd_opt(2026, 10, 8).unwrap()));

        let sent = NewsletterRepo::update(&conn, &sent.sent(0, now).unwrap()).unwrap();
        assert_eq!(sent.status, NewsletterStatus::Sent);
        assert_eq!(sent.recipients, 2);
        assert_eq!(sent.sent_at, Some(now));

        let mut again = sent.clone();
        again.status = NewsletterStatus::Draft;
        let err = NewsletterRepo::update(&conn, &again).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlockError>(),
            Some(FlockError::InvalidTransition { .. })
        ));
    }
}
