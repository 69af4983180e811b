use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_changed, require};
use crate::board::Filter;
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::attendance::AttendanceFacet;
use crate::models::{AttendanceRecord, NewAttendance};

const SELECT: &str = "SELECT a.id, a.member_id, m.name, a.service_type, a.service_date,
                             a.status, a.checked_in_at
                      FROM attendance a JOIN members m ON m.id = a.member_id";

fn record_from_row(row: &Row) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: row.get(0)?,
        member_id: row.get(1)?,
        member_name: row.get(2)?,
        service_type: row.get(3)?,
        service_date: row.get(4)?,
        status: row.get(5)?,
        checked_in_at: row.get(6)?,
    })
}

pub struct AttendanceRepo;

impl AttendanceRepo {
    pub fn on_date(conn: &Connection, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE a.service_date = ?1 ORDER BY a.checked_in_at DESC, a.id DESC",
            SELECT
        ))?;
        let rows = stmt.query_map(params![date], record_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn find(conn: &Connection, id: i64) -> Result<Option<AttendanceRecord>> {
        conn.query_row(&format!("{} WHERE a.id = ?1", SELECT), params![id], record_from_row)
            .optional()
            .map_err(anyhow::Error::from)
    }
}

impl RecordStore for AttendanceRepo {
    type Record = AttendanceRecord;
    type Draft = NewAttendance;

    fn all(conn: &Connection) -> Result<Vec<AttendanceRecord>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY a.service_date DESC, a.checked_in_at DESC, a.id DESC",
            SELECT
        ))?;
        let rows = stmt.query_map([], record_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// A selected date is answered in SQL; everything else filters in memory.
    fn list(conn: &Connection, filter: &Filter<AttendanceFacet>) -> Result<Vec<AttendanceRecord>> {
        let date = filter.selected().iter().find_map(|f| match f {
            AttendanceFacet::Date(d) => Some(*d),
            _ => None,
        });
        let rows = match date {
            Some(date) => Self::on_date(conn, date)?,
            None => Self::all(conn)?,
        };
        Ok(filter.apply(&rows).into_iter().cloned().collect())
    }

    fn get(conn: &Connection, id: i64) -> Result<AttendanceRecord> {
        Self::find(conn, id)?.ok_or_else(|| FlockError::not_found("attendance", id).into())
    }

    fn create(conn: &Connection, draft: &NewAttendance) -> Result<AttendanceRecord> {
        require(conn, "members", "member", draft.member_id)?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT m.name FROM attendance a JOIN members m ON m.id = a.member_id
                 WHERE a.member_id = ?1 AND a.service_type = ?2 AND a.service_date = ?3",
                params![draft.member_id, draft.service_type, draft.service_date],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(name) = existing {
            return Err(FlockError::Duplicate {
                entity: "check-in",
                value: format!("{}, {} {}", name, draft.service_type, draft.service_date),
            }
            .into());
        }

        conn.execute(
            "INSERT INTO attendance (member_id, service_type, service_date, status, checked_in_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.member_id,
                draft.service_type,
                draft.service_date,
                draft.status,
                draft.checked_in_at,
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    /// Corrections may move between any two statuses.
    fn update(conn: &Connection, record: &AttendanceRecord) -> Result<AttendanceRecord> {
        let changed = conn.execute(
            "UPDATE attendance SET status = ?1, service_type = ?2 WHERE id = ?3",
            params![record.status, record.service_type, record.id],
        )?;
        ensure_changed(changed, "attendance", record.id)?;
        Self::get(conn, record.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM attendance WHERE id = ?1", params![id])?;
        ensure_changed(changed, "attendance", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::MemberRepo;
    use crate::models::{AttendanceStatus, MemberStatus, NewMember, ServiceType};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    fn setup() -> (Connection, i64) {
        let conn = open_in_memory();
        let member = MemberRepo::create(
            &conn,
            &NewMember {
                name: "Joel Ford".into(),
                email: "joel@example.org".into(),
                phone: None,
                department: None,
                status: MemberStatus::Active,
                joined_on: day(1),
            },
        )
        .unwrap();
        (conn, member.id)
    }

    fn check_in(member_id: i64, date: NaiveDate) -> NewAttendance {
        NewAttendance {
            member_id,
            service_type: ServiceType::SundayMorning,
            service_date: date,
            status: AttendanceStatus::Present,
            checked_in_at: date.and_hms_opt(9, 55, 0).unwrap(),
        }
    }

    #[test]
    fn check_in_joins_member_name() {
        let (conn, member_id) = setup();
        let record = AttendanceRepo::create(&conn, &check_in(member_id, day(3))).unwrap();
        assert_eq!(record.member_name, "Joel Ford");
        assert_eq!(record.checked_in_at, day(3).and_hms_opt(9, 55, 0).unwrap());
    }

    #[test]
    fn second_check_in_for_same_service_is_duplicate() {
        let (conn, member_id) = setup();
        AttendanceRepo::create(&conn, &check_in(member_id, day(3))).unwrap();
        let err = AttendanceRepo::create(&conn, &check_in(member_id, day(3))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlockError>(),
            Some(FlockError::Duplicate { .. })
        ));
    }

    #[test]
    fn date_facet_limits_rows() {
        let (conn, member_id) = setup();
        AttendanceRepo::create(&conn, &check_in(member_id, day(3))).unwrap();
        AttendanceRepo::create(&conn, &check_in(member_id, day(10))).unwrap();
        let rows =
            AttendanceRepo::list(&conn, &Filter::new().with(AttendanceFacet::Date(day(10)))).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].service_date, day(10));
    }

    #[test]
    fn unknown_member_is_not_found() {
        let (conn, _) = setup();
        let err = AttendanceRepo::create(&conn, &check_in(99, day(3))).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlockError>(),
            Some(&FlockError::not_found("member", 99))
        );
    }
}
