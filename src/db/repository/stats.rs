use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use rusqlite::{params, Connection};

use crate::db::repository::{BudgetRepo, MemberRepo};
use crate::db::store::RecordStore;
use crate::models::{BudgetStatus, DailyAttendance, DashboardSummary, MemberStatus};

pub struct StatsRepo;

impl StatsRepo {
    /// Headline figures for the dashboard as of `today`.
    pub fn dashboard(conn: &Connection, today: NaiveDate) -> Result<DashboardSummary> {
        let week_start = today - Duration::days(6);
        let month_start = today.with_day(1).unwrap_or(today);

        let attendance_this_week: u32 = conn.query_row(
            "SELECT COUNT(*) FROM attendance
             WHERE service_date >= ?1 AND service_date <= ?2
               AND status IN ('present', 'late', 'partial')",
            params![week_start, today],
            |row| row.get(0),
        )?;
        let giving_this_month: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM donations
             WHERE status = 'completed' AND given_on >= ?1 AND given_on <= ?2",
            params![month_start, today],
            |row| row.get(0),
        )?;
        let open_prayers: u32 = conn.query_row(
            "SELECT COUNT(*) FROM prayer_requests WHERE status IN ('new', 'in_progress')",
            [],
            |row| row.get(0),
        )?;
        let newsletters_scheduled: u32 = conn.query_row(
            "SELECT COUNT(*) FROM newsletters WHERE status = 'scheduled'",
            [],
            |row| row.get(0),
        )?;

        // status is derived, never stored
        let budgets = BudgetRepo::all(conn)?;
        let budgets_in = |status: BudgetStatus| {
            budgets.iter().filter(|b| b.status() == status).count() as u32
        };

        Ok(DashboardSummary {
            members_total: MemberRepo::count(conn)?,
            members_active: MemberRepo::count_by_status(conn, MemberStatus::Active)?,
            visitors: MemberRepo::count_by_status(conn, MemberStatus::Visitor)?,
            attendance_this_week,
            giving_this_month,
            budgets_exceeded: budgets_in(BudgetStatus::Exceeded),
            budgets_warning: budgets_in(BudgetStatus::Warning),
            open_prayers,
            newsletters_scheduled,
        })
    }

    /// Attended vs recorded check-ins per service date, oldest first.
    pub fn daily_attendance(
        conn: &Connection,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyAttendance>> {
        let mut stmt = conn.prepare(
            "SELECT service_date,
                    SUM(CASE WHEN status IN ('present', 'late', 'partial') THEN 1 ELSE 0 END),
                    COUNT(*)
             FROM attendance
             WHERE service_date >= ?1 AND service_date <= ?2
             GROUP BY service_date
             ORDER BY service_date",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok(DailyAttendance {
                date: row.get(0)?,
                attended: row.get(1)?,
                total: row.get(2)?,
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::AttendanceRepo;
    use crate::models::{
        AttendanceStatus, BudgetPeriod, NewAttendance, NewBudget, NewExpense, NewMember,
        ServiceType,
    };

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn member(conn: &Connection, name: &str, status: MemberStatus) -> i64 {
        MemberRepo::create(
            conn,
            &NewMember {
                name: name.into(),
                email: format!("{}@example.org", name.to_lowercase()),
                phone: None,
                department: None,
                status,
                joined_on: date(1, 4),
            },
        )
        .unwrap()
        .id
    }

    fn check_in(conn: &Connection, member_id: i64, on: NaiveDate, status: AttendanceStatus) {
        AttendanceRepo::create(
            conn,
            &NewAttendance {
                member_id,
                service_type: ServiceType::SundayMorning,
                service_date: on,
                status,
                checked_in_at: on.and_hms_opt(9, 55, 0).unwrap(),
            },
        )
        .unwrap();
    }

    #[test]
    fn daily_attendance_groups_by_date() {
        let conn = open_in_memory();
        let ada = member(&conn, "Ada", MemberStatus::Active);
        let ben = member(&conn, "Ben", MemberStatus::Active);
        check_in(&conn, ada, date(3, 1), AttendanceStatus::Present);
        check_in(&conn, ben, date(3, 1), AttendanceStatus::Absent);
        check_in(&conn, ada, date(3, 8), AttendanceStatus::Late);

        let days = StatsRepo::daily_attendance(&conn, date(3, 1), date(3, 31)).unwrap();
        assert_eq!(
            days,
            vec![
                DailyAttendance { date: date(3, 1), attended: 1, total: 2 },
                DailyAttendance { date: date(3, 8), attended: 1, total: 1 },
            ]
        );
        assert_eq!(days[0].completion_ratio(), 0.5);
    }

    #[test]
    fn dashboard_counts() {
        let conn = open_in_memory();
        let ada = member(&conn, "Ada", MemberStatus::Active);
        member(&conn, "Cy", MemberStatus::Visitor);
        check_in(&conn, ada, date(3, 8), AttendanceStatus::Present);
        check_in(&conn, ada, date(2, 1), AttendanceStatus::Present);

        let budget = BudgetRepo::create(
            &conn,
            &NewBudget {
                name: "Youth".into(),
                department: "Youth".into(),
                period: BudgetPeriod::Annual,
                amount: 100.0,
            },
        )
        .unwrap();
        BudgetRepo::record_expense(
            &conn,
            &NewExpense {
                budget_id: budget.id,
                amount: 150.0,
                description: "Retreat".into(),
                spent_on: date(3, 2),
            },
        )
        .unwrap();

        let summary = StatsRepo::dashboard(&conn, date(3, 10)).unwrap();
        assert_eq!(summary.members_total, 2);
        assert_eq!(summary.members_active, 1);
        assert_eq!(summary.visitors, 1);
        assert_eq!(summary.attendance_this_week, 1);
        assert_eq!(summary.budgets_exceeded, 1);
        assert_eq!(summary.budgets_warning, 0);
        assert_eq!(summary.giving_this_month, 0.0);
    }
}
