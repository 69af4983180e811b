use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::ensure_changed;
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{Member, MemberStatus, NewMember, Transitions};

const COLUMNS: &str = "id, name, email, phone, department, status, joined_on";

fn member_from_row(row: &Row) -> rusqlite::Result<Member> {
    Ok(Member {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        department: row.get(4)?,
        status: row.get(5)?,
        joined_on: row.get(6)?,
    })
}

pub struct MemberRepo;

impl MemberRepo {
    pub fn find(conn: &Connection, id: i64) -> Result<Option<Member>> {
        conn.query_row(
            &format!("SELECT {} FROM members WHERE id = ?1", COLUMNS),
            params![id],
            member_from_row,
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn count_by_status(conn: &Connection, status: MemberStatus) -> Result<u32> {
        conn.query_row(
            "SELECT COUNT(*) FROM members WHERE status = ?1",
            params![status],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }

    pub fn count(conn: &Connection) -> Result<u32> {
        conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
            .map_err(anyhow::Error::from)
    }
}

impl RecordStore for MemberRepo {
    type Record = Member;
    type Draft = NewMember;

    fn all(conn: &Connection) -> Result<Vec<Member>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM members ORDER BY name COLLATE NOCASE, id",
            COLUMNS
        ))?;
        let rows = stmt.query_map([], member_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Member> {
        Self::find(conn, id)?.ok_or_else(|| FlockError::not_found("member", id).into())
    }

    fn create(conn: &Connection, draft: &NewMember) -> Result<Member> {
        conn.execute(
            "INSERT INTO members (name, email, phone, department, status, joined_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                draft.name,
                draft.email,
                draft.phone,
                draft.department,
                draft.status,
                draft.joined_on,
            ],
        )?;
        let id = conn.last_insert_rowid();
        log::debug!("created member #{}", id);
        Self::get(conn, id)
    }

    fn update(conn: &Connection, member: &Member) -> Result<Member> {
        let current = Self::get(conn, member.id)?;
        if current.status != member.status {
            current.status.check_transition(member.status)?;
            log::info!(
                "member #{} {} -> {}",
                member.id,
                current.status.as_str(),
                member.status.as_str()
            );
        }
        conn.execute(
            "UPDATE members SET name = ?1, email = ?2, phone = ?3, department = ?4, status = ?5
             WHERE id = ?6",
            params![
                member.name,
                member.email,
                member.phone,
                member.department,
                member.status,
                member.id,
            ],
        )?;
        Self::get(conn, member.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM members WHERE id = ?1", params![id])?;
        ensure_changed(changed, "member", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Filter;
    use crate::db::open_in_memory;
    use crate::models::member::MemberFacet;
    use chrono::NaiveDate;

    fn draft(name: &str, status: MemberStatus) -> NewMember {
        NewMember {
            name: name.into(),
            email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
            phone: None,
            department: Some("Worship".into()),
            status,
            joined_on: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        }
    }

    #[test]
    fn create_list_and_filter() {
        let conn = open_in_memory();
        MemberRepo::create(&conn, &draft("Naomi Reed", MemberStatus::Active)).unwrap();
        MemberRepo::create(&conn, &draft("Caleb Stone", MemberStatus::Visitor)).unwrap();

        assert_eq!(MemberRepo::all(&conn).unwrap().len(), 2);
        let visitors = MemberRepo::list(
            &conn,
            &Filter::new().with(MemberFacet::Status(MemberStatus::Visitor)),
        )
        .unwrap();
        assert_eq!(visitors.len(), 1);
        assert_eq!(visitors[0].name, "Caleb Stone");
    }

    #[test]
    fn update_enforces_status_table() {
        let conn = open_in_memory();
        let member = MemberRepo::create(&conn, &draft("Naomi Reed", MemberStatus::Active)).unwrap();

        let mut back_to_visitor = member.clone();
        back_to_visitor.status = MemberStatus::Visitor;
        let err = MemberRepo::update(&conn, &back_to_visitor).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlockError>(),
            Some(FlockError::InvalidTransition { .. })
        ));

        let mut inactive = member;
        inactive.status = MemberStatus::Inactive;
        let stored = MemberRepo::update(&conn, &inactive).unwrap();
        assert_eq!(stored.status, MemberStatus::Inactive);
    }

    #[test]
    fn removing_unknown_member_is_not_found() {
        let conn = open_in_memory();
        let err = MemberRepo::remove(&conn, 42).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlockError>(),
            Some(&FlockError::not_found("member", 42))
        );
    }
}
