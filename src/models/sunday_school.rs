use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolClass {
    pub id: i64,
    pub name: String,
    pub age_group: String,
    pub room: String,
    pub schedule: String,
    pub capacity: u32,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub student_count: u32,
    /// Percent of recorded attendance marks that were present.
    pub attendance_rate: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewClass {
    pub name: String,
    pub age_group: String,
    pub room: String,
    pub schedule: String,
    pub capacity: u32,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub started_on: NaiveDate,
    pub assigned_classes: Vec<String>,
}

impl Teacher {
    /// Whole years served as of `today`.
    pub fn years_of_service(&self, today: NaiveDate) -> u32 {
        if today < self.started_on {
            return 0;
        }
        let mut years = today.year() - self.started_on.year();
        if (today.month(), today.day()) < (self.started_on.month(), self.started_on.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTeacher {
    pub name: String,
    pub email: String,
    pub started_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub class_id: i64,
    pub guardian: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub class_id: i64,
    pub guardian: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassAttendance {
    pub id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub present: bool,
}

/// Per-class figures recomputed from attendance marks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    pub class_id: i64,
    pub marks: u32,
    pub present: u32,
}

impl ClassStats {
    pub fn from_marks(class_id: i64, marks: &[ClassAttendance]) -> Self {
        let own: Vec<&ClassAttendance> = marks.iter().filter(|m| m.class_id == class_id).collect();
        Self {
            class_id,
            marks: own.len() as u32,
            present: own.iter().filter(|m| m.present).count() as u32,
        }
    }

    /// `round(present / marks * 100)`; no marks reports 0.
    pub fn attendance_rate(&self) -> u32 {
        if self.marks == 0 {
            return 0;
        }
        (self.present as f64 / self.marks as f64 * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassFacet {
    AgeGroup(String),
    Teacher(i64),
}

impl Record for SchoolClass {
    const ENTITY: &'static str = "class";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for SchoolClass {
    type Facet = ClassFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.room.as_str(), self.age_group.as_str()];
        if let Some(teacher) = &self.teacher_name {
            fields.push(teacher);
        }
        fields
    }

    fn facets(&self) -> Vec<ClassFacet> {
        let mut facets = vec![ClassFacet::AgeGroup(self.age_group.clone())];
        if let Some(id) = self.teacher_id {
            facets.push(ClassFacet::Teacher(id));
        }
        facets
    }
}

impl Sortable for SchoolClass {
    fn sort_keys() -> &'static [&'static str] {
        &["name", "attendance"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.name.clone()),
            _ => SortValue::Number(self.attendance_rate as f64),
        }
    }
}

impl Record for Teacher {
    const ENTITY: &'static str = "teacher";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Teacher {
    type Facet = ();

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        fields.extend(self.assigned_classes.iter().map(String::as_str));
        fields
    }

    fn facets(&self) -> Vec<()> {
        Vec::new()
    }
}

impl Sortable for Teacher {
    fn sort_keys() -> &'static [&'static str] {
        &["name", "started"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.name.clone()),
            _ => SortValue::Date(self.started_on),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn years_of_service_counts_whole_years() {
        let teacher = Teacher {
            id: 1,
            name: "Martha Lee".into(),
            email: "martha@example.org".into(),
            started_on: date(2018, 9, 10),
            assigned_classes: vec![],
        };
        assert_eq!(teacher.years_of_service(date(2026, 9, 9)), 7);
        assert_eq!(teacher.years_of_service(date(2026, 9, 10)), 8);
        assert_eq!(teacher.years_of_service(date(2017, 1, 1)), 0);
    }

    #[test]
    fn attendance_rate_from_marks() {
        let marks: Vec<ClassAttendance> = [true, true, false, true, false, true]
            .iter()
            .enumerate()
            .map(|(i, present)| ClassAttendance {
                id: i as i64 + 1,
                class_id: if i < 3 { 1 } else { 2 },
                student_id: i as i64,
                date: date(2026, 5, 3),
                present: *present,
            })
            .collect();
        let first = ClassStats::from_marks(1, &marks);
        assert_eq!((first.marks, first.present), (3, 2));
        assert_eq!(first.attendance_rate(), 67);
        assert_eq!(ClassStats::from_marks(9, &marks).attendance_rate(), 0);
    }
}
