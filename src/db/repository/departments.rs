use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_changed, require};
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{
    Department, DepartmentMember, DepartmentRole, NewAssignment, NewDepartment, NewRole,
    RoleLevel,
};

// ─── Departments ─────────────────────────────────────────────────────────────

const DEPARTMENT_SELECT: &str = "SELECT d.id, d.name, d.description,
           (SELECT COUNT(*) FROM department_members dm WHERE dm.department_id = d.id),
           (SELECT COUNT(*) FROM department_roles dr WHERE dr.department_id = d.id)
    FROM departments d";

fn department_from_row(row: &Row) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        member_count: row.get(3)?,
        role_count: row.get(4)?,
    })
}

pub struct DepartmentRepo;

impl DepartmentRepo {
    fn ensure_unique_name(conn: &Connection, name: &str, except: i64) -> Result<()> {
        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM departments WHERE name = ?1 COLLATE NOCASE AND id != ?2",
                params![name, except],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(FlockError::Duplicate {
                entity: "department",
                value: name.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl RecordStore for DepartmentRepo {
    type Record = Department;
    type Draft = NewDepartment;

    fn all(conn: &Connection) -> Result<Vec<Department>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY d.name COLLATE NOCASE", DEPARTMENT_SELECT))?;
        let rows = stmt.query_map([], department_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Department> {
        conn.query_row(
            &format!("{} WHERE d.id = ?1", DEPARTMENT_SELECT),
            params![id],
            department_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("department", id).into())
    }

    fn create(conn: &Connection, draft: &NewDepartment) -> Result<Department> {
        Self::ensure_unique_name(conn, &draft.name, 0)?;
        conn.execute(
            "INSERT INTO departments (name, description) VALUES (?1, ?2)",
            params![draft.name, draft.description],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    fn update(conn: &Connection, department: &Department) -> Result<Department> {
        Self::ensure_unique_name(conn, &department.name, department.id)?;
        let changed = conn.execute(
            "UPDATE departments SET name = ?1, description = ?2 WHERE id = ?3",
            params![department.name, department.description, department.id],
        )?;
        ensure_changed(changed, "department", department.id)?;
        Self::get(conn, department.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM departments WHERE id = ?1", params![id])?;
        ensure_changed(changed, "department", id)
    }
}

// ─── Roles ───────────────────────────────────────────────────────────────────

const ROLE_COLUMNS: &str = "id, department_id, title, level, description, responsibilities";

fn role_from_row(row: &Row) -> rusqlite::Result<DepartmentRole> {
    let raw: String = row.get(5)?;
    let responsibilities: Vec<String> = serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(DepartmentRole {
        id: row.get(0)?,
        department_id: row.get(1)?,
        title: row.get(2)?,
        level: row.get(3)?,
        description: row.get(4)?,
        responsibilities,
    })
}

pub struct RoleRepo;

impl RoleRepo {
    pub fn for_department(conn: &Connection, department_id: i64) -> Result<Vec<DepartmentRole>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM department_roles WHERE department_id = ?1 ORDER BY id",
            ROLE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![department_id], role_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// A department has at most one head.
    fn ensure_single_head(
        conn: &Connection,
        department_id: i64,
        level: RoleLevel,
        except: i64,
    ) -> Result<()> {
        if level != RoleLevel::Head {
            return Ok(());
        }
        let existing: Option<String> = conn
            .query_row(
                "SELECT title FROM department_roles
                 WHERE department_id = ?1 AND level = 'head' AND id != ?2",
                params![department_id, except],
                |row| row.get(0),
            )
            .optional()?;
        match existing {
            Some(title) => Err(FlockError::Duplicate {
                entity: "head role",
                value: title,
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl RecordStore for RoleRepo {
    type Record = DepartmentRole;
    type Draft = NewRole;

    fn all(conn: &Connection) -> Result<Vec<DepartmentRole>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM department_roles ORDER BY department_id, id",
            ROLE_COLUMNS
        ))?;
        let rows = stmt.query_map([], role_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<DepartmentRole> {
        conn.query_row(
            &format!("SELECT {} FROM department_roles WHERE id = ?1", ROLE_COLUMNS),
            params![id],
            role_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("role", id).into())
    }

    fn create(conn: &Connection, draft: &NewRole) -> Result<DepartmentRole> {
        require(conn, "departments", "department", draft.department_id)?;
        Self::ensure_single_head(conn, draft.department_id, draft.level, 0)?;
        let responsibilities =
            serde_json::to_string(&draft.responsibilities).context("Encoding responsibilities")?;
        conn.execute(
            "INSERT INTO department_roles (department_id, title, level, description, responsibilities)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.department_id,
                draft.title,
                draft.level,
                draft.description,
                responsibilities,
            ],
        )?;
        let id = conn.last_insert_rowid();
        log::info!("added role '{}' to department #{}", draft.title, draft.department_id);
        Self::get(conn, id)
    }

    fn update(conn: &Connection, role: &DepartmentRole) -> Result<DepartmentRole> {
        Self::ensure_single_head(conn, role.department_id, role.level, role.id)?;
        let responsibilities =
            serde_json::to_string(&role.responsibilities).context("Encoding responsibilities")?;
        let changed = conn.execute(
            "UPDATE department_roles
             SET title = ?1, level = ?2, description = ?3, responsibilities = ?4
             WHERE id = ?5",
            params![role.title, role.level, role.description, responsibilities, role.id],
        )?;
        ensure_changed(changed, "role", role.id)?;
        Self::get(conn, role.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM department_roles WHERE id = ?1", params![id])?;
        ensure_changed(changed, "role", id)
    }
}

// ─── Department members ──────────────────────────────────────────────────────

const ASSIGNMENT_SELECT: &str = "SELECT dm.id, dm.department_id, dm.member_id, m.name,
           dm.role_id, r.title, r.level
    FROM department_members dm
    JOIN members m ON m.id = dm.member_id
    LEFT JOIN department_roles r ON r.id = dm.role_id";

fn assignment_from_row(row: &Row) -> rusqlite::Result<DepartmentMember> {
    Ok(DepartmentMember {
        id: row.get(0)?,
        department_id: row.get(1)?,
        member_id: row.get(2)?,
        member_name: row.get(3)?,
        role_id: row.get(4)?,
        role_title: row.get(5)?,
        role_level: row.get(6)?,
    })
}

pub struct DepartmentMemberRepo;

impl DepartmentMemberRepo {
    pub fn for_department(conn: &Connection, department_id: i64) -> Result<Vec<DepartmentMember>> {
        let mut stmt = conn.prepare(&format!(
            "{} WHERE dm.department_id = ?1 ORDER BY m.name COLLATE NOCASE",
            ASSIGNMENT_SELECT
        ))?;
        let rows = stmt.query_map(params![department_id], assignment_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn check_role(conn: &Connection, department_id: i64, role_id: Option<i64>) -> Result<()> {
        let Some(role_id) = role_id else {
            return Ok(());
        };
        let role = RoleRepo::get(conn, role_id)?;
        if role.department_id != department_id {
            return Err(FlockError::validation(
                "role",
                format!("'{}' belongs to another department", role.title),
            )
            .into());
        }
        Ok(())
    }
}

impl RecordStore for DepartmentMemberRepo {
    type Record = DepartmentMember;
    type Draft = NewAssignment;

    fn all(conn: &Connection) -> Result<Vec<DepartmentMember>> {
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY dm.department_id, m.name COLLATE NOCASE",
            ASSIGNMENT_SELECT
        ))?;
        let rows = stmt.query_map([], assignment_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<DepartmentMember> {
        conn.query_row(
            &format!("{} WHERE dm.id = ?1", ASSIGNMENT_SELECT),
            params![id],
            assignment_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("department member", id).into())
    }

    fn create(conn: &Connection, draft: &NewAssignment) -> Result<DepartmentMember> {
        require(conn, "departments", "department", draft.department_id)?;
        require(conn, "members", "member", draft.member_id)?;
        Self::check_role(conn, draft.department_id, draft.role_id)?;

        let already: Option<String> = conn
            .query_row(
                "SELECT m.name FROM department_members dm JOIN members m ON m.id = dm.member_id
                 WHERE dm.department_id = ?1 AND dm.member_id = ?2",
                params![draft.department_id, draft.member_id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(name) = already {
            return Err(FlockError::Duplicate {
                entity: "department member",
                value: name,
            }
            .into());
        }

        conn.execute(
            "INSERT INTO department_members (department_id, member_id, role_id) VALUES (?1, ?2, ?3)",
            params![draft.department_id, draft.member_id, draft.role_id],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    /// Only the role can change; moving departments is remove + create.
    fn update(conn: &Connection, assignment: &DepartmentMember) -> Result<DepartmentMember> {
        Self::check_role(conn, assignment.department_id, assignment.role_id)?;
        let changed = conn.execute(
            "UPDATE department_members SET role_id = ?1 WHERE id = ?2",
            params![assignment.role_id, assignment.id],
        )?;
        ensure_changed(changed, "department member", assignment.id)?;
        Self::get(conn, assignment.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM department_members WHERE id = ?1", params![id])?;
        ensure_changed(changed, "department member", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::MemberRepo;
    use crate::forms::RoleForm;
    use crate::models::{MemberStatus, NewMember};
    use chrono::NaiveDate;

    fn worship(conn: &Connection) -> Department {
        DepartmentRepo::create(
            conn,
            &NewDepartment {
                name: "Worship".into(),
                description: "Music and liturgy".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn role_form_adds_exactly_one_role() {
        let conn = open_in_memory();
        let dept = worship(&conn);
        let form = RoleForm {
            department_id: dept.id,
            title: "Worship Leader".into(),
            level: "leader".into(),
            description: "Leads worship".into(),
            responsibilities: "Plan setlist\nRehearse band".into(),
        };
        let before = RoleRepo::for_department(&conn, dept.id).unwrap().len();
        let role = RoleRepo::create(&conn, &form.validate().unwrap()).unwrap();
        let after = RoleRepo::for_department(&conn, dept.id).unwrap();

        assert_eq!(after.len(), before + 1);
        assert_eq!(role.title, "Worship Leader");
        assert_eq!(role.responsibilities, vec!["Plan setlist", "Rehearse band"]);
        assert_eq!(after.last(), Some(&role));
        assert_eq!(DepartmentRepo::get(&conn, dept.id).unwrap().role_count, 1);
    }

    #[test]
    fn department_names_are_unique() {
        let conn = open_in_memory();
        worship(&conn);
        let err = DepartmentRepo::create(
            &conn,
            &NewDepartment {
                name: "worship".into(),
                description: String::new(),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlockError>(),
            Some(FlockError::Duplicate { entity: "department", .. })
        ));
    }

    #[test]
    fn only_one_head_per_department() {
        let conn = open_in_memory();
        let dept = worship(&conn);
        let head = |title: &str| NewRole {
            department_id: dept.id,
            title: title.into(),
            level: RoleLevel::Head,
            description: String::new(),
            responsibilities: vec![],
        };
        RoleRepo::create(&conn, &head("Music Director")).unwrap();
        assert!(RoleRepo::create(&conn, &head("Pastor of Worship")).is_err());
    }

    #[test]
    fn member_joins_a_department_once() {
        let conn = open_in_memory();
        let dept = worship(&conn);
        let member = MemberRepo::create(
            &conn,
            &NewMember {
                name: "Lydia Moss".into(),
                email: "lydia@example.org".into(),
                phone: None,
                department: None,
                status: MemberStatus::Active,
                joined_on: NaiveDate::from_ymd_opt(2023, 2, 5).unwrap(),
            },
        )
        .unwrap();
        let draft = NewAssignment {
            department_id: dept.id,
            member_id: member.id,
            role_id: None,
        };
        let placed = DepartmentMemberRepo::create(&conn, &draft).unwrap();
        assert_eq!(placed.member_name, "Lydia Moss");
        assert!(DepartmentMemberRepo::create(&conn, &draft).is_err());
        assert_eq!(DepartmentRepo::get(&conn, dept.id).unwrap().member_count, 1);
    }
}
