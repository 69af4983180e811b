use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};
use crate::models::status::{Lifecycle, Transitions};

text_enum! {
    pub enum ServiceType ("service type") {
        SundayMorning => "sunday_morning", "Sunday Morning";
        SundayEvening => "sunday_evening", "Sunday Evening";
        Midweek => "midweek", "Midweek";
        Youth => "youth", "Youth";
        Special => "special", "Special";
    }
}

text_enum! {
    pub enum AttendanceStatus ("attendance status") {
        Present => "present", "Present";
        Late => "late", "Late";
        Absent => "absent", "Absent";
        Excused => "excused", "Excused";
        Partial => "partial", "Partial";
    }
}

impl AttendanceStatus {
    /// Whether the person was in the service at all.
    pub fn attended(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present | AttendanceStatus::Late | AttendanceStatus::Partial
        )
    }
}

// Corrections are unrestricted; the order only drives "advance".
impl Transitions for AttendanceStatus {
    const ENTITY: &'static str = "attendance";

    fn next_states(&self) -> &'static [Self] {
        use AttendanceStatus::*;
        match self {
            Present => &[Late, Absent, Excused, Partial],
            Late => &[Absent, Excused, Partial, Present],
            Absent => &[Excused, Partial, Present, Late],
            Excused => &[Partial, Present, Late, Absent],
            Partial => &[Present, Late, Absent, Excused],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub service_type: ServiceType,
    pub service_date: NaiveDate,
    pub status: AttendanceStatus,
    pub checked_in_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub member_id: i64,
    pub service_type: ServiceType,
    pub service_date: NaiveDate,
    pub status: AttendanceStatus,
    pub checked_in_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttendanceFacet {
    Status(AttendanceStatus),
    Service(ServiceType),
    Date(NaiveDate),
}

impl Record for AttendanceRecord {
    const ENTITY: &'static str = "attendance record";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for AttendanceRecord {
    type Facet = AttendanceFacet;

    fn haystacks(&self) -> Vec<&str> {
        vec![self.member_name.as_str()]
    }

    fn facets(&self) -> Vec<AttendanceFacet> {
        vec![
            AttendanceFacet::Status(self.status),
            AttendanceFacet::Service(self.service_type),
            AttendanceFacet::Date(self.service_date),
        ]
    }
}

impl Sortable for AttendanceRecord {
    fn sort_keys() -> &'static [&'static str] {
        &["date", "member"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Date(self.service_date),
            _ => SortValue::Text(self.member_name.clone()),
        }
    }
}

impl Lifecycle for AttendanceRecord {
    type Status = AttendanceStatus;

    fn status(&self) -> AttendanceStatus {
        self.status
    }

    fn set_status(&mut self, status: AttendanceStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn any_status_can_be_corrected() {
        for from in AttendanceStatus::ALL {
            for to in AttendanceStatus::ALL {
                if from != to {
                    assert!(from.can_transition_to(*to), "{} -> {}", from, to);
                }
            }
        }
    }

    #[test]
    fn parses_loose_service_names() {
        assert_eq!(
            ServiceType::from_str("Sunday Morning").unwrap(),
            ServiceType::SundayMorning
        );
        assert_eq!(ServiceType::from_str("sunday-evening").unwrap(), ServiceType::SundayEvening);
        assert!(ServiceType::from_str("vespers").is_err());
    }
}
