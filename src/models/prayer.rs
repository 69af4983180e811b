use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};
use crate::models::status::{Lifecycle, Transitions};

text_enum! {
    pub enum PrayerStatus ("prayer status") {
        New => "new", "New";
        InProgress => "in_progress", "In Progress";
        Answered => "answered", "Answered";
        Closed => "closed", "Closed";
    }
}

impl Transitions for PrayerStatus {
    const ENTITY: &'static str = "prayer request";

    fn next_states(&self) -> &'static [Self] {
        match self {
            PrayerStatus::New => &[
                PrayerStatus::InProgress,
                PrayerStatus::Answered,
                PrayerStatus::Closed,
            ],
            PrayerStatus::InProgress => &[PrayerStatus::Answered, PrayerStatus::Closed],
            PrayerStatus::Answered => &[PrayerStatus::Closed],
            PrayerStatus::Closed => &[],
        }
    }
}

text_enum! {
    pub enum Priority ("priority") {
        Low => "low", "Low";
        Normal => "normal", "Normal";
        High => "high", "High";
        Urgent => "urgent", "Urgent";
    }
}

impl Priority {
    fn rank(&self) -> u8 {
        match self {
            Priority::Low => 0,
            Priority::Normal => 1,
            Priority::High => 2,
            Priority::Urgent => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerComment {
    pub id: i64,
    pub request_id: i64,
    pub author: String,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerUpdate {
    pub id: i64,
    pub request_id: i64,
    pub body: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerRequest {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub requester: String,
    pub status: PrayerStatus,
    pub priority: Priority,
    pub is_private: bool,
    pub created_at: NaiveDateTime,
    pub comments: Vec<PrayerComment>,
    pub updates: Vec<PrayerUpdate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPrayerRequest {
    pub title: String,
    pub description: String,
    pub requester: String,
    pub priority: Priority,
    pub is_private: bool,
}

impl PrayerRequest {
    pub fn provisional(draft: &NewPrayerRequest, now: NaiveDateTime) -> Self {
        Self {
            id: 0,
            title: draft.title.clone(),
            description: draft.description.clone(),
            requester: draft.requester.clone(),
            status: PrayerStatus::New,
            priority: draft.priority,
            is_private: draft.is_private,
            created_at: now,
            comments: Vec::new(),
            updates: Vec::new(),
        }
    }

    /// Private requests are listed without the requester's name.
    pub fn display_requester(&self) -> &str {
        if self.is_private { "(private)" } else { self.requester.as_str() }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.status, PrayerStatus::New | PrayerStatus::InProgress)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrayerFacet {
    Status(PrayerStatus),
    Priority(Priority),
}

impl Record for PrayerRequest {
    const ENTITY: &'static str = "prayer request";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for PrayerRequest {
    type Facet = PrayerFacet;

    fn haystacks(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.description.as_str(),
            self.display_requester(),
        ]
    }

    fn facets(&self) -> Vec<PrayerFacet> {
        vec![
            PrayerFacet::Status(self.status),
            PrayerFacet::Priority(self.priority),
        ]
    }
}

impl Sortable for PrayerRequest {
    fn sort_keys() -> &'static [&'static str] {
        &["priority", "created"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Number(self.priority.rank() as f64),
            _ => SortValue::Date(self.created_at.date()),
        }
    }
}

impl Lifecycle for PrayerRequest {
    type Status = PrayerStatus;

    fn status(&self) -> PrayerStatus {
        self.status
    }

    fn set_status(&mut self, status: PrayerStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answered_cannot_reopen() {
        assert!(!PrayerStatus::Answered.can_transition_to(PrayerStatus::New));
        assert!(!PrayerStatus::Closed.can_transition_to(PrayerStatus::InProgress));
        assert!(PrayerStatus::New.can_transition_to(PrayerStatus::Answered));
        assert!(PrayerStatus::Closed.is_final());
    }
}
