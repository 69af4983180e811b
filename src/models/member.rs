use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};
use crate::models::status::{Lifecycle, Transitions};

text_enum! {
    pub enum MemberStatus ("member status") {
        Active => "active", "Active";
        Inactive => "inactive", "Inactive";
        Visitor => "visitor", "Visitor";
    }
}

impl Transitions for MemberStatus {
    const ENTITY: &'static str = "member";

    fn next_states(&self) -> &'static [Self] {
        match self {
            MemberStatus::Active => &[MemberStatus::Inactive],
            MemberStatus::Inactive => &[MemberStatus::Active],
            MemberStatus::Visitor => &[MemberStatus::Active, MemberStatus::Inactive],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: MemberStatus,
    pub joined_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub status: MemberStatus,
    pub joined_on: NaiveDate,
}

impl Member {
    /// Unsaved copy of a draft, shown until the store assigns an id.
    pub fn provisional(draft: &NewMember) -> Self {
        Self {
            id: 0,
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            department: draft.department.clone(),
            status: draft.status,
            joined_on: draft.joined_on,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberFacet {
    Status(MemberStatus),
    Department(String),
}

impl Record for Member {
    const ENTITY: &'static str = "member";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Member {
    type Facet = MemberFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        if let Some(dept) = &self.department {
            fields.push(dept);
        }
        fields
    }

    fn facets(&self) -> Vec<MemberFacet> {
        let mut facets = vec![MemberFacet::Status(self.status)];
        if let Some(dept) = &self.department {
            facets.push(MemberFacet::Department(dept.clone()));
        }
        facets
    }
}

impl Sortable for Member {
    fn sort_keys() -> &'static [&'static str] {
        &["name", "joined"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.name.clone()),
            _ => SortValue::Date(self.joined_on),
        }
    }
}

impl Lifecycle for Member {
    type Status = MemberStatus;

    fn status(&self) -> MemberStatus {
        self.status
    }

    fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }
}
