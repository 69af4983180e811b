use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};

text_enum! {
    pub enum GroupCategory ("group category") {
        SmallGroup => "small_group", "Small Group";
        Ministry => "ministry", "Ministry";
        Youth => "youth", "Youth";
        Outreach => "outreach", "Outreach";
        Study => "study", "Bible Study";
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub category: GroupCategory,
    pub leader: String,
    pub max_members: Option<u32>,
    pub schedule: String,
    pub member_count: u32,
}

impl Group {
    pub fn is_full(&self) -> bool {
        self.max_members.is_some_and(|max| self.member_count >= max)
    }

    pub fn capacity_label(&self) -> String {
        match self.max_members {
            Some(max) => format!("{}/{}", self.member_count, max),
            None => format!("{}", self.member_count),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGroup {
    pub name: String,
    pub category: GroupCategory,
    pub leader: String,
    pub max_members: Option<u32>,
    pub schedule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEvent {
    pub id: i64,
    pub group_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGroupEvent {
    pub group_id: i64,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
}

/// Partial update of an event; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventEdit {
    pub title: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub location: Option<String>,
}

impl GroupEvent {
    pub fn provisional(draft: &NewGroupEvent) -> Self {
        Self {
            id: 0,
            group_id: draft.group_id,
            title: draft.title.clone(),
            event_date: draft.event_date,
            location: draft.location.clone(),
        }
    }

    pub fn edited(&self, edit: &EventEdit) -> GroupEvent {
        GroupEvent {
            id: self.id,
            group_id: self.group_id,
            title: edit.title.clone().unwrap_or_else(|| self.title.clone()),
            event_date: edit.event_date.unwrap_or(self.event_date),
            location: edit.location.clone().or_else(|| self.location.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GroupFacet {
    Category(GroupCategory),
    Full(bool),
}

impl Record for Group {
    const ENTITY: &'static str = "group";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Group {
    type Facet = GroupFacet;

    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.leader.as_str(), self.schedule.as_str()]
    }

    fn facets(&self) -> Vec<GroupFacet> {
        vec![GroupFacet::Category(self.category), GroupFacet::Full(self.is_full())]
    }
}

impl Sortable for Group {
    fn sort_keys() -> &'static [&'static str] {
        &["name", "members"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.name.clone()),
            _ => SortValue::Number(self.member_count as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventFacet {
    Group(i64),
}

impl Record for GroupEvent {
    const ENTITY: &'static str = "event";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for GroupEvent {
    type Facet = EventFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        if let Some(location) = &self.location {
            fields.push(location);
        }
        fields
    }

    fn facets(&self) -> Vec<EventFacet> {
        vec![EventFacet::Group(self.group_id)]
    }
}

impl Sortable for GroupEvent {
    fn sort_keys() -> &'static [&'static str] {
        &["date", "title"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Date(self.event_date),
            _ => SortValue::Text(self.title.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(max: Option<u32>, count: u32) -> Group {
        Group {
            id: 1,
            name: "Young Adults".into(),
            category: GroupCategory::SmallGroup,
            leader: "Ruth Okafor".into(),
            max_members: max,
            schedule: "Thursdays 7pm".into(),
            member_count: count,
        }
    }

    #[test]
    fn capacity() {
        assert!(!group(None, 40).is_full());
        assert!(!group(Some(12), 11).is_full());
        assert!(group(Some(12), 12).is_full());
        assert_eq!(group(Some(12), 3).capacity_label(), "3/12");
    }

    #[test]
    fn edit_keeps_untouched_fields() {
        let event = GroupEvent {
            id: 4,
            group_id: 1,
            title: "Picnic".into(),
            event_date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            location: Some("Park".into()),
        };
        let edited = event.edited(&EventEdit {
            title: Some("Summer Picnic".into()),
            ..EventEdit::default()
        });
        assert_eq!(edited.title, "Summer Picnic");
        assert_eq!(edited.event_date, event.event_date);
        assert_eq!(edited.location.as_deref(), Some("Park"));
    }
}
