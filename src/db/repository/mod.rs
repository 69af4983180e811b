pub mod attendance;
pub mod departments;
pub mod finance;
pub mod groups;
pub mod members;
pub mod meta;
pub mod newsletters;
pub mod prayer;
pub mod stats;
pub mod sunday_school;

pub use attendance::AttendanceRepo;
pub use departments::{DepartmentMemberRepo, DepartmentRepo, RoleRepo};
pub use finance::{BudgetRepo, DonationRepo};
pub use groups::{EventRepo, GroupRepo};
pub use members::MemberRepo;
pub use meta::MetaRepo;
pub use newsletters::NewsletterRepo;
pub use prayer::PrayerRepo;
pub use stats::StatsRepo;
pub use sunday_school::{ClassRepo, StudentRepo, TeacherRepo};

use anyhow::Result;
use rusqlite::Connection;

use crate::error::FlockError;

/// Turns "no row touched" into a not-found error.
fn ensure_changed(changed: usize, entity: &'static str, id: i64) -> Result<()> {
    if changed == 0 {
        return Err(FlockError::not_found(entity, id).into());
    }
    Ok(())
}

fn exists(conn: &Connection, table: &str, id: i64) -> Result<bool> {
    let found: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE id = ?1", table),
        [id],
        |row| row.get(0),
    )?;
    Ok(found > 0)
}

fn require(conn: &Connection, table: &str, entity: &'static str, id: i64) -> Result<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(FlockError::not_found(entity, id).into())
    }
}
