use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};

text_enum! {
    pub enum RoleLevel ("role level") {
        Head => "head", "Head";
        Leader => "leader", "Leader";
        Coordinator => "coordinator", "Coordinator";
        Member => "member", "Member";
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub member_count: i64,
    pub role_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDepartment {
    pub name: String,
    pub description: String,
}

impl Department {
    pub fn provisional(draft: &NewDepartment) -> Self {
        Self {
            id: 0,
            name: draft.name.clone(),
            description: draft.description.clone(),
            member_count: 0,
            role_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRole {
    pub id: i64,
    pub department_id: i64,
    pub title: String,
    pub level: RoleLevel,
    pub description: String,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRole {
    pub department_id: i64,
    pub title: String,
    pub level: RoleLevel,
    pub description: String,
    pub responsibilities: Vec<String>,
}

impl DepartmentRole {
    pub fn provisional(draft: &NewRole) -> Self {
        Self {
            id: 0,
            department_id: draft.department_id,
            title: draft.title.clone(),
            level: draft.level,
            description: draft.description.clone(),
            responsibilities: draft.responsibilities.clone(),
        }
    }
}

/// Places a member in a department, optionally in one of its roles.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssignment {
    pub department_id: i64,
    pub member_id: i64,
    pub role_id: Option<i64>,
}

/// A member's place in a department, with the role title joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentMember {
    pub id: i64,
    pub department_id: i64,
    pub member_id: i64,
    pub member_name: String,
    pub role_id: Option<i64>,
    pub role_title: Option<String>,
    pub role_level: Option<RoleLevel>,
}

impl Record for Department {
    const ENTITY: &'static str = "department";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Department {
    type Facet = ();

    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str()]
    }

    fn facets(&self) -> Vec<()> {
        Vec::new()
    }
}

impl Sortable for Department {
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
pub enum RoleFacet {
    Department(i64),
    Level(RoleLevel),
}

impl Record for DepartmentRole {
    const ENTITY: &'static str = "role";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for DepartmentRole {
    type Facet = RoleFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.description.as_str()];
        fields.extend(self.responsibilities.iter().map(String::as_str));
        fields
    }

    fn facets(&self) -> Vec<RoleFacet> {
        vec![
            RoleFacet::Department(self.department_id),
            RoleFacet::Level(self.level),
        ]
    }
}

impl Sortable for DepartmentRole {
    fn sort_keys() -> &'static [&'static str] {
        &["title"]
    }

    fn sort_value(&self, _key: usize) -> SortValue {
        SortValue::Text(self.title.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DepartmentMemberFacet {
    Department(i64),
    Level(RoleLevel),
}

impl Record for DepartmentMember {
    const ENTITY: &'static str = "department member";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for DepartmentMember {
    type Facet = DepartmentMemberFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.member_name.as_str()];
        if let Some(title) = &self.role_title {
            fields.push(title);
        }
        fields
    }

    fn facets(&self) -> Vec<DepartmentMemberFacet> {
        let mut facets = vec![DepartmentMemberFacet::Department(self.department_id)];
        if let Some(level) = self.role_level {
            facets.push(DepartmentMemberFacet::Level(level));
        }
        facets
    }
}

impl Sortable for DepartmentMember {
    fn sort_keys() -> &'static [&'static str] {
        &["member"]
    }

    fn sort_value(&self, _key: usize) -> SortValue {
        SortValue::Text(self.member_name.clone())
    }
}
