use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_changed, require};
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{
    ClassAttendance, ClassStats, NewClass, NewStudent, NewTeacher, SchoolClass, Student, Teacher,
};

// ─── Classes ─────────────────────────────────────────────────────────────────

const CLASS_SELECT: &str = "SELECT c.id, c.name, c.age_group, c.room, c.schedule, c.capacity,
           c.teacher_id, t.name,
           (SELECT COUNT(*) FROM school_students s WHERE s.class_id = c.id),
           (SELECT COUNT(*) FROM class_attendance a WHERE a.class_id = c.id),
           (SELECT COUNT(*) FROM class_attendance a WHERE a.class_id = c.id AND a.present = 1)
    FROM school_classes c LEFT JOIN school_teachers t ON t.id = c.teacher_id";

fn class_from_row(row: &Row) -> rusqlite::Result<SchoolClass> {
    let class_id = row.get(0)?;
    let stats = ClassStats {
        class_id,
        marks: row.get(9)?,
        present: row.get(10)?,
    };
    Ok(SchoolClass {
        id: class_id,
        name: row.get(1)?,
        age_group: row.get(2)?,
        room: row.get(3)?,
        schedule: row.get(4)?,
        capacity: row.get(5)?,
        teacher_id: row.get(6)?,
        teacher_name: row.get(7)?,
        student_count: row.get(8)?,
        attendance_rate: stats.attendance_rate(),
    })
}

pub struct ClassRepo;

impl ClassRepo {
    /// Records one student's presence for a date; marking again overwrites.
    pub fn mark(
        conn: &Connection,
        class_id: i64,
        student_id: i64,
        date: NaiveDate,
        present: bool,
    ) -> Result<ClassAttendance> {
        let student = StudentRepo::get(conn, student_id)?;
        if student.class_id != class_id {
            return Err(FlockError::validation(
                "student",
                format!("{} is not enrolled in class #{}", student.name, class_id),
            )
            .into());
        }
        conn.execute(
            "INSERT INTO class_attendance (class_id, student_id, date, present)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(student_id, date) DO UPDATE SET present = ?4, class_id = ?1",
            params![class_id, student_id, date, present],
        )?;
        conn.query_row(
            "SELECT id, class_id, student_id, date, present FROM class_attendance
             WHERE student_id = ?1 AND date = ?2",
            params![student_id, date],
            |row| {
                Ok(ClassAttendance {
                    id: row.get(0)?,
                    class_id: row.get(1)?,
                    student_id: row.get(2)?,
                    date: row.get(3)?,
                    present: row.get(4)?,
                })
            },
        )
        .map_err(anyhow::Error::from)
    }

    pub fn marks(conn: &Connection, class_id: i64) -> Result<Vec<ClassAttendance>> {
        let mut stmt = conn.prepare(
            "SELECT id, class_id, student_id, date, present FROM class_attendance
             WHERE class_id = ?1 ORDER BY date, student_id",
        )?;
        let rows = stmt.query_map(params![class_id], |row| {
            Ok(ClassAttendance {
                id: row.get(0)?,
                class_id: row.get(1)?,
                student_id: row.get(2)?,
                date: row.get(3)?,
                present: row.get(4)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

impl RecordStore for ClassRepo {
    type Record = SchoolClass;
    type Draft = NewClass;

    fn all(conn: &Connection) -> Result<Vec<SchoolClass>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY c.name COLLATE NOCASE", CLASS_SELECT))?;
        let rows = stmt.query_map([], class_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<SchoolClass> {
        conn.query_row(&format!("{} WHERE c.id = ?1", CLASS_SELECT), params![id], class_from_row)
            .optional()?
            .ok_or_else(|| FlockError::not_found("class", id).into())
    }

    fn create(conn: &Connection, draft: &NewClass) -> Result<SchoolClass> {
        if let Some(teacher_id) = draft.teacher_id {
            require(conn, "school_teachers", "teacher", teacher_id)?;
        }
        conn.execute(
            "INSERT INTO school_classes (name, age_group, room, schedule, capacity, teacher_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                draft.name,
                draft.age_group,
                draft.room,
                draft.schedule,
                draft.capacity,
                draft.teacher_id,
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    fn update(conn: &Connection, class: &SchoolClass) -> Result<SchoolClass> {
        if let Some(teacher_id) = class.teacher_id {
            require(conn, "school_teachers", "teacher", teacher_id)?;
        }
        let changed = conn.execute(
            "UPDATE school_classes
             SET name = ?1, age_group = ?2, room = ?3, schedule = ?4, capacity = ?5, teacher_id = ?6
             WHERE id = ?7",
            params![
                class.name,
                class.age_group,
                class.room,
                class.schedule,
                class.capacity,
                class.teacher_id,
                class.id,
            ],
        )?;
        ensure_changed(changed, "class", class.id)?;
        Self::get(conn, class.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM school_classes WHERE id = ?1", params![id])?;
        ensure_changed(changed, "class", id)
    }
}

// ─── Teachers ────────────────────────────────────────────────────────────────

pub struct TeacherRepo;

impl TeacherRepo {
    fn class_names(conn: &Connection, teacher_id: i64) -> Result<Vec<String>> {
        let mut stmt =
            conn.prepare("SELECT name FROM school_classes WHERE teacher_id = ?1 ORDER BY name")?;
        let rows = stmt.query_map(params![teacher_id], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

fn teacher_from_row(row: &Row) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        started_on: row.get(3)?,
        assigned_classes: Vec::new(),
    })
}

impl RecordStore for TeacherRepo {
    type Record = Teacher;
    type Draft = NewTeacher;

    fn all(conn: &Connection) -> Result<Vec<Teacher>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, email, started_on FROM school_teachers ORDER BY name COLLATE NOCASE",
        )?;
        let mut teachers = stmt
            .query_map([], teacher_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for teacher in &mut teachers {
            teacher.assigned_classes = Self::class_names(conn, teacher.id)?;
        }
        Ok(teachers)
    }

    fn get(conn: &Connection, id: i64) -> Result<Teacher> {
        let mut teacher = conn
            .query_row(
                "SELECT id, name, email, started_on FROM school_teachers WHERE id = ?1",
                params![id],
                teacher_from_row,
            )
            .optional()?
            .ok_or(FlockError::not_found("teacher", id))?;
        teacher.assigned_classes = Self::class_names(conn, id)?;
        Ok(teacher)
    }

    fn create(conn: &Connection, draft: &NewTeacher) -> Result<Teacher> {
        conn.execute(
            "INSERT INTO school_teachers (name, email, started_on) VALUES (?1, ?2, ?3)",
            params![draft.name, draft.email, draft.started_on],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    fn update(conn: &Connection, teacher: &Teacher) -> Result<Teacher> {
        let changed = conn.execute(
            "UPDATE school_teachers SET name = ?1, email = ?2, started_on = ?3 WHERE id = ?4",
            params![teacher.name, teacher.email, teacher.started_on, teacher.id],
        )?;
        ensure_changed(changed, "teacher", teacher.id)?;
        Self::get(conn, teacher.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM school_teachers WHERE id = ?1", params![id])?;
        ensure_changed(changed, "teacher", id)
    }
}

// ─── Students ────────────────────────────────────────────────────────────────

fn student_from_row(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        class_id: row.get(2)?,
        guardian: row.get(3)?,
    })
}

pub struct StudentRepo;

impl StudentRepo {
    pub fn get(conn: &Connection, id: i64) -> Result<Student> {
        conn.query_row(
            "SELECT id, name, class_id, guardian FROM school_students WHERE id = ?1",
            params![id],
            student_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("student", id).into())
    }

    pub fn in_class(conn: &Connection, class_id: i64) -> Result<Vec<Student>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, class_id, guardian FROM school_students
             WHERE class_id = ?1 ORDER BY name COLLATE NOCASE",
        )?;
        let rows = stmt.query_map(params![class_id], student_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Enrols a student, refusing when the class is at capacity.
    pub fn enrol(conn: &Connection, draft: &NewStudent) -> Result<Student> {
        let class = ClassRepo::get(conn, draft.class_id)?;
        if class.student_count >= class.capacity {
            return Err(FlockError::Capacity {
                group: class.name,
                max: class.capacity,
            }
            .into());
        }
        conn.execute(
            "INSERT INTO school_students (name, class_id, guardian) VALUES (?1, ?2, ?3)",
            params![draft.name, draft.class_id, draft.guardian],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn class_with_students(conn: &Connection, names: &[&str]) -> (SchoolClass, Vec<Student>) {
        let teacher = TeacherRepo::create(
            conn,
            &NewTeacher {
                name: "Martha Lee".into(),
                email: "martha@example.org".into(),
                started_on: NaiveDate::from_ymd_opt(2018, 9, 10).unwrap(),
            },
        )
        .unwrap();
        let class = ClassRepo::create(
            conn,
            &NewClass {
                name: "Primary".into(),
                age_group: "6-8".into(),
                room: "B2".into(),
                schedule: "Sundays 9:30".into(),
                capacity: 3,
                teacher_id: Some(teacher.id),
            },
        )
        .unwrap();
        let students = names
            .iter()
            .map(|name| {
                StudentRepo::enrol(
                    conn,
                    &NewStudent {
                        name: name.to_string(),
                        class_id: class.id,
                        guardian: None,
                    },
                )
                .unwrap()
            })
            .collect();
        (class, students)
    }

    #[test]
    fn attendance_rate_recomputed_on_load() {
        let conn = open_in_memory();
        let (class, students) = class_with_students(&conn, &["Eli", "Mia", "Noah"]);
        ClassRepo::mark(&conn, class.id, students[0].id, day(1), true).unwrap();
        ClassRepo::mark(&conn, class.id, students[1].id, day(1), true).unwrap();
        ClassRepo::mark(&conn, class.id, students[2].id, day(1), false).unwrap();

        let loaded = ClassRepo::get(&conn, class.id).unwrap();
        assert_eq!(loaded.student_count, 3);
        assert_eq!(loaded.attendance_rate, 67);
        assert_eq!(loaded.teacher_name.as_deref(), Some("Martha Lee"));

        ClassRepo::mark(&conn, class.id, students[2].id, day(1), true).unwrap();
        assert_eq!(ClassRepo::get(&conn, class.id).unwrap().attendance_rate, 100);
        assert_eq!(ClassRepo::marks(&conn, class.id).unwrap().len(), 3);
    }

    #[test]
    fn class_without_marks_reports_zero() {
        let conn = open_in_memory();
        let (class, _) = class_with_students(&conn, &[]);
        assert_eq!(ClassRepo::get(&conn, class.id).unwrap().attendance_rate, 0);
    }

    #[test]
    fn teacher_lists_assigned_classes() {
        let conn = open_in_memory();
        let (class, _) = class_with_students(&conn, &[]);
        let teacher = TeacherRepo::get(&conn, class.teacher_id.unwrap()).unwrap();
        assert_eq!(teacher.assigned_classes, vec!["Primary"]);
    }

    #[test]
    fn full_class_refuses_enrolment() {
        let conn = open_in_memory();
        let (class, _) = class_with_students(&conn, &["Eli", "Mia", "Noah"]);
        let err = StudentRepo::enrol(
            &conn,
            &NewStudent {
                name: "Zoe".into(),
                class_id: class.id,
                guardian: Some("Ann".into()),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FlockError>(),
            Some(FlockError::Capacity { max: 3, .. })
        ));
    }
}
