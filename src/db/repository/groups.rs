use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_changed, require};
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{EventEdit, Group, GroupEvent, NewGroup, NewGroupEvent};

// ─── Groups ──────────────────────────────────────────────────────────────────

const GROUP_SELECT: &str = "SELECT g.id, g.name, g.category, g.leader, g.max_members, g.schedule,
           (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id)
    FROM church_groups g";

fn group_from_row(row: &Row) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        leader: row.get(3)?,
        max_members: row.get(4)?,
        schedule: row.get(5)?,
        member_count: row.get(6)?,
    })
}

pub struct GroupRepo;

impl GroupRepo {
    /// Adds a member to a group, refusing when the group is at capacity.
    pub fn join(conn: &Connection, group_id: i64, member_id: i64) -> Result<Group> {
        let group = Self::get(conn, group_id)?;
        require(conn, "members", "member", member_id)?;

        let already: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM group_members WHERE group_id = ?1 AND member_id = ?2",
            params![group_id, member_id],
            |row| row.get(0),
        )?;
        if already {
            return Err(FlockError::Duplicate {
                entity: "group member",
                value: format!("member #{} in {}", member_id, group.name),
            }
            .into());
        }
        if let (true, Some(max)) = (group.is_full(), group.max_members) {
            log::warn!("{} is full, rejecting member #{}", group.name, member_id);
            return Err(FlockError::Capacity {
                group: group.name,
                max,
            }
            .into());
        }

        conn.execute(
            "INSERT INTO group_members (group_id, member_id) VALUES (?1, ?2)",
            params![group_id, member_id],
        )?;
        Self::get(conn, group_id)
    }

    pub fn leave(conn: &Connection, group_id: i64, member_id: i64) -> Result<Group> {
        let changed = conn.execute(
            "DELETE FROM group_members WHERE group_id = ?1 AND member_id = ?2",
            params![group_id, member_id],
        )?;
        ensure_changed(changed, "group member", member_id)?;
        Self::get(conn, group_id)
    }
}

impl RecordStore for GroupRepo {
    type Record = Group;
    type Draft = NewGroup;

    fn all(conn: &Connection) -> Result<Vec<Group>> {
        let mut stmt = conn.prepare(&format!("{} ORDER BY g.name COLLATE NOCASE", GROUP_SELECT))?;
        let rows = stmt.query_map([], group_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Group> {
        conn.query_row(&format!("{} WHERE g.id = ?1", GROUP_SELECT), params![id], group_from_row)
            .optional()?
            .ok_or_else(|| FlockError::not_found("group", id).into())
    }

    fn create(conn: &Connection, draft: &NewGroup) -> Result<Group> {
        conn.execute(
            "INSERT INTO church_groups (name, category, leader, max_members, schedule)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.category,
                draft.leader,
                draft.max_members,
                draft.schedule,
            ],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    fn update(conn: &Connection, group: &Group) -> Result<Group> {
        let changed = conn.execute(
            "UPDATE church_groups
             SET name = ?1, category = ?2, leader = ?3, max_members = ?4, schedule = ?5
             WHERE id = ?6",
            params![
                group.name,
                group.category,
                group.leader,
                group.max_members,
                group.schedule,
                group.id,
            ],
        )?;
        ensure_changed(changed, "group", group.id)?;
        Self::get(conn, group.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM church_groups WHERE id = ?1", params![id])?;
        ensure_changed(changed, "group", id)
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str = "id, group_id, title, event_date, location";

fn event_from_row(row: &Row) -> rusqlite::Result<GroupEvent> {
    Ok(GroupEvent {
        id: row.get(0)?,
        group_id: row.get(1)?,
        title: row.get(2)?,
        event_date: row.get(3)?,
        location: row.get(4)?,
    })
}

pub struct EventRepo;

impl EventRepo {
    pub fn for_group(conn: &Connection, group_id: i64) -> Result<Vec<GroupEvent>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM group_events WHERE group_id = ?1 ORDER BY event_date, id",
            EVENT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![group_id], event_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Applies a partial edit and returns the stored event.
    pub fn edit(conn: &Connection, id: i64, edit: &EventEdit) -> Result<GroupEvent> {
        let current = Self::get(conn, id)?;
        Self::update(conn, &current.edited(edit))
    }
}

impl RecordStore for EventRepo {
    type Record = GroupEvent;
    type Draft = NewGroupEvent;

    fn all(conn: &Connection) -> Result<Vec<GroupEvent>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM group_events ORDER BY event_date, id",
            EVENT_COLUMNS
        ))?;
        let rows = stmt.query_map([], event_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<GroupEvent> {
        conn.query_row(
            &format!("SELECT {} FROM group_events WHERE id = ?1", EVENT_COLUMNS),
            params![id],
            event_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("event", id).into())
    }

    fn create(conn: &Connection, draft: &NewGroupEvent) -> Result<GroupEvent> {
        require(conn, "church_groups", "group", draft.group_id)?;
        conn.execute(
            "INSERT INTO group_events (group_id, title, event_date, location) VALUES (?1, ?2, ?3, ?4)",
            params![draft.group_id, draft.title, draft.event_date, draft.location],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    fn update(conn: &Connection, event: &GroupEvent) -> Result<GroupEvent> {
        let changed = conn.execute(
            "UPDATE group_events SET title = ?1, event_date = ?2, location = ?3 WHERE id = ?4",
            params![event.title, event.event_date, event.location, event.id],
        )?;
        ensure_changed(changed, "event", event.id)?;
        Self::get(conn, event.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM group_events WHERE id = ?1", params![id])?;
        ensure_changed(changed, "event", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::db::repository::MemberRepo;
    use crate::models::{GroupCategory, MemberStatus, NewMember};
    use chrono::NaiveDate;

    fn add_member(conn: &Connection, name: &str) -> i64 {
        MemberRepo::create(
            conn,
            &NewMember {
                name: name.into(),
                email: "x@example.org".into(),
                phone: None,
                department: None,
                status: MemberStatus::Active,
                joined_on: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            },
        )
        .unwrap()
        .id
    }

    fn small_group(conn: &Connection, max: Option<u32>) -> Group {
        GroupRepo::create(
            conn,
            &NewGroup {
                name: "Tuesday Prayer".into(),
                category: GroupCategory::SmallGroup,
                leader: "Ann Vale".into(),
                max_members: max,
                schedule: "Tuesdays 6pm".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn join_stops_at_capacity() {
        let conn = open_in_memory();
        let group = small_group(&conn, Some(2));
        let a = add_member(&conn, "A");
        let b = add_member(&conn, "B");
        let c = add_member(&conn, "C");

        GroupRepo::join(&conn, group.id, a).unwrap();
        let joined = GroupRepo::join(&conn, group.id, b).unwrap();
        assert_eq!(joined.member_count, 2);

        let err = GroupRepo::join(&conn, group.id, c).unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlockError>(),
            Some(&FlockError::Capacity {
                group: "Tuesday Prayer".into(),
                max: 2
            })
        );
        assert!(GroupRepo::join(&conn, group.id, a).is_err());
    }

    #[test]
    fn partial_event_edit() {
        let conn = open_in_memory();
        let group = small_group(&conn, None);
        let event = EventRepo::create(
            &conn,
            &NewGroupEvent {
                group_id: group.id,
                title: "Potluck".into(),
                event_date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
                location: Some("Fellowship Hall".into()),
            },
        )
        .unwrap();

        let moved = NaiveDate::from_ymd_opt(2026, 7, 11).unwrap();
        let edited = EventRepo::edit(
            &conn,
            event.id,
            &EventEdit {
                event_date: Some(moved),
                ..EventEdit::default()
            },
        )
        .unwrap();
        assert_eq!(edited.event_date, moved);
        assert_eq!(edited.title, "Potluck");
        assert_eq!(EventRepo::for_group(&conn, group.id).unwrap(), vec![edited]);
    }
}
