use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS members (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL,
            phone       TEXT,
            department  TEXT,
            status      TEXT NOT NULL DEFAULT 'active'
                        CHECK(status IN ('active','inactive','visitor')),
            joined_on   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS attendance (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            member_id     INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            service_type  TEXT NOT NULL,
            service_date  TEXT NOT NULL,
            status        TEXT NOT NULL
                          CHECK(status IN ('present','late','absent','excused','partial')),
            checked_in_at TEXT NOT NULL,
            UNIQUE(member_id, service_type, service_date)
        );

        CREATE TABLE IF NOT EXISTS departments (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS department_roles (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            department_id    INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
            title            TEXT NOT NULL,
            level            TEXT NOT NULL
                             CHECK(level IN ('head','leader','coordinator','member')),
            description      TEXT NOT NULL DEFAULT '',
            responsibilities TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS department_members (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            department_id INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
            member_id     INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            role_id       INTEGER REFERENCES department_roles(id) ON DELETE SET NULL,
            UNIQUE(department_id, member_id)
        );

        CREATE TABLE IF NOT EXISTS church_groups (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            category    TEXT NOT NULL,
            leader      TEXT NOT NULL,
            max_members INTEGER,
            schedule    TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS group_members (
            group_id  INTEGER NOT NULL REFERENCES church_groups(id) ON DELETE CASCADE,
            member_id INTEGER NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            PRIMARY KEY(group_id, member_id)
        );

        CREATE TABLE IF NOT EXISTS group_events (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id   INTEGER NOT NULL REFERENCES church_groups(id) ON DELETE CASCADE,
            title      TEXT NOT NULL,
            event_date TEXT NOT NULL,
            location   TEXT
        );

        CREATE TABLE IF NOT EXISTS budgets (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            department TEXT NOT NULL,
            period     TEXT NOT NULL CHECK(period IN ('monthly','quarterly','annual')),
            amount     REAL NOT NULL,
            spent      REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS expenses (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            budget_id   INTEGER NOT NULL REFERENCES budgets(id) ON DELETE CASCADE,
            amount      REAL NOT NULL CHECK(amount > 0),
            description TEXT NOT NULL,
            spent_on    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS donations (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            donor_name     TEXT NOT NULL,
            member_id      INTEGER REFERENCES members(id) ON DELETE SET NULL,
            amount         REAL NOT NULL CHECK(amount > 0),
            giving_type    TEXT NOT NULL,
            category       TEXT NOT NULL,
            method         TEXT NOT NULL,
            status         TEXT NOT NULL
                           CHECK(status IN ('pending','completed','failed','refunded')),
            given_on       TEXT NOT NULL,
            receipt_number TEXT NOT NULL UNIQUE,
            note           TEXT
        );

        CREATE TABLE IF NOT EXISTS newsletters (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            title         TEXT NOT NULL,
            body          TEXT NOT NULL DEFAULT '',
            status        TEXT NOT NULL DEFAULT 'draft'
                          CHECK(status IN ('draft','scheduled','sent')),
            scheduled_for TEXT,
            sent_at       TEXT,
            recipients    INTEGER NOT NULL DEFAULT 0,
            open_rate     REAL NOT NULL DEFAULT 0,
            click_rate    REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS prayer_requests (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            requester   TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'new'
                        CHECK(status IN ('new','in_progress','answered','closed')),
            priority    TEXT NOT NULL DEFAULT 'normal',
            is_private  INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS prayer_comments (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            request_id INTEGER NOT NULL REFERENCES prayer_requests(id) ON DELETE CASCADE,
            author     TEXT NOT NULL,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS prayer_updates (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            request_id INTEGER NOT NULL REFERENCES prayer_requests(id) ON DELETE CASCADE,
            body       TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS school_teachers (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            email      TEXT NOT NULL,
            started_on TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS school_classes (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            age_group  TEXT NOT NULL,
            room       TEXT NOT NULL,
            schedule   TEXT NOT NULL,
            capacity   INTEGER NOT NULL,
            teacher_id INTEGER REFERENCES school_teachers(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS school_students (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            name     TEXT NOT NULL,
            class_id INTEGER NOT NULL REFERENCES school_classes(id) ON DELETE CASCADE,
            guardian TEXT
        );

        CREATE TABLE IF NOT EXISTS class_attendance (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id   INTEGER NOT NULL REFERENCES school_classes(id) ON DELETE CASCADE,
            student_id INTEGER NOT NULL REFERENCES school_students(id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            present    INTEGER NOT NULL,
            UNIQUE(student_id, date)
        );

        CREATE TABLE IF NOT EXISTS app_meta (
            key   TEXT PRIMARY KEY,
            value TEXT
        );
    ")?;
    Ok(())
}
