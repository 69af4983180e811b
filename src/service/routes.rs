use anyhow::{anyhow, Result};

/// Every screen of the dashboard, addressable by a stable path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Members,
    MemberDetail(i64),
    Attendance,
    CheckIn,
    Departments,
    DepartmentMembers(i64),
    DepartmentRoles(i64),
    Groups,
    GroupEvents { group: i64, edit: Option<i64> },
    Budgets,
    BudgetAdd,
    Giving,
    DonationAdd,
    Reports,
    Newsletters,
    PrayerRequests,
    PrayerDetail(i64),
    SundaySchool,
    Teachers,
}

/// Anything that can move the user to another screen.
pub trait Navigator {
    fn navigate(&mut self, path: &str) -> Result<()>;
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Dashboard => "/dashboard".to_string(),
            Route::Members => "/dashboard/members".to_string(),
            Route::MemberDetail(id) => format!("/dashboard/members/{}", id),
            Route::Attendance => "/dashboard/attendance".to_string(),
            Route::CheckIn => "/dashboard/attendance/check-in".to_string(),
            Route::Departments => "/dashboard/departments".to_string(),
            Route::DepartmentMembers(id) => format!("/dashboard/departments/{}/members", id),
            Route::DepartmentRoles(id) => format!("/dashboard/departments/{}/roles", id),
            Route::Groups => "/dashboard/groups".to_string(),
            Route::GroupEvents { group, edit: None } => {
                format!("/dashboard/groups/{}/events", group)
            }
            Route::GroupEvents {
                group,
                edit: Some(event),
            } => format!("/dashboard/groups/{}/events?edit={}", group, event),
            Route::Budgets => "/dashboard/finance/budgets".to_string(),
            Route::BudgetAdd => "/dashboard/finance/budgets/add".to_string(),
            Route::Giving => "/dashboard/finance/giving".to_string(),
            Route::DonationAdd => "/dashboard/finance/giving/add".to_string(),
            Route::Reports => "/dashboard/finance/reports".to_string(),
            Route::Newsletters => "/dashboard/communications/newsletters".to_string(),
            Route::PrayerRequests => "/dashboard/prayer-requests".to_string(),
            Route::PrayerDetail(id) => format!("/dashboard/prayer-requests/{}", id),
            Route::SundaySchool => "/dashboard/sunday-school".to_string(),
            Route::Teachers => "/dashboard/sunday-school/teachers".to_string(),
        }
    }

    pub fn parse(path: &str) -> Result<Route> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let route = match segments.as_slice() {
            ["dashboard"] | [""] => Route::Dashboard,
            ["dashboard", "members"] => Route::Members,
            ["dashboard", "members", id] => Route::MemberDetail(parse_id(id)?),
            ["dashboard", "attendance"] => Route::Attendance,
            ["dashboard", "attendance", "check-in"] => Route::CheckIn,
            ["dashboard", "departments"] => Route::Departments,
            ["dashboard", "departments", id, "members"] => {
                Route::DepartmentMembers(parse_id(id)?)
            }
            ["dashboard", "departments", id, "roles"] => Route::DepartmentRoles(parse_id(id)?),
            ["dashboard", "groups"] => Route::Groups,
            ["dashboard", "groups", id, "events"] => Route::GroupEvents {
                group: parse_id(id)?,
                edit: query.map(edit_param).transpose()?.flatten(),
            },
            ["dashboard", "finance", "budgets"] => Route::Budgets,
            ["dashboard", "finance", "budgets", "add"] => Route::BudgetAdd,
            ["dashboard", "finance", "giving"] => Route::Giving,
            ["dashboard", "finance", "giving", "add"] => Route::DonationAdd,
            ["dashboard", "finance", "reports"] => Route::Reports,
            ["dashboard", "communications", "newsletters"] => Route::Newsletters,
            ["dashboard", "prayer-requests"] => Route::PrayerRequests,
            ["dashboard", "prayer-requests", id] => Route::PrayerDetail(parse_id(id)?),
            ["dashboard", "sunday-school"] => Route::SundaySchool,
            ["dashboard", "sunday-school", "teachers"] => Route::Teachers,
            _ => return Err(anyhow!("Unknown route: {}", path)),
        };
        Ok(route)
    }

    /// The tab a route belongs to, numbered as on the tab bar.
    pub fn tab(&self) -> usize {
        match self {
            Route::Dashboard => 0,
            Route::Members | Route::MemberDetail(_) => 1,
            Route::Attendance | Route::CheckIn => 2,
            Route::Giving | Route::DonationAdd | Route::Reports => 3,
            Route::Budgets | Route::BudgetAdd => 4,
            Route::Departments | Route::DepartmentMembers(_) | Route::DepartmentRoles(_) => 5,
            Route::Groups | Route::GroupEvents { .. } => 6,
            Route::Newsletters => 7,
            Route::PrayerRequests | Route::PrayerDetail(_) => 8,
            Route::SundaySchool | Route::Teachers => 9,
        }
    }

    pub fn tabs() -> [(Route, &'static str); 10] {
        [
            (Route::Dashboard, "Home"),
            (Route::Members, "Members"),
            (Route::Attendance, "Attendance"),
            (Route::Giving, "Giving"),
            (Route::Budgets, "Budgets"),
            (Route::Departments, "Departments"),
            (Route::Groups, "Groups"),
            (Route::Newsletters, "Newsletters"),
            (Route::PrayerRequests, "Prayer"),
            (Route::SundaySchool, "Sunday School"),
        ]
    }
}

fn parse_id(segment: &str) -> Result<i64> {
    segment
        .parse::<i64>()
        .map_err(|_| anyhow!("'{}' is not a valid id", segment))
}

fn edit_param(query: &str) -> Result<Option<i64>> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "edit")
        .map(|(_, value)| parse_id(value))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_parse_back_to_the_same_route() {
        let routes = [
            Route::Dashboard,
            Route::MemberDetail(12),
            Route::CheckIn,
            Route::DepartmentMembers(3),
            Route::DepartmentRoles(3),
            Route::GroupEvents { group: 2, edit: None },
            Route::GroupEvents { group: 2, edit: Some(9) },
            Route::BudgetAdd,
            Route::Reports,
            Route::PrayerDetail(5),
            Route::Teachers,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()).unwrap(), route, "{}", route.path());
        }
    }

    #[test]
    fn known_paths() {
        assert_eq!(
            Route::DepartmentMembers(7).path(),
            "/dashboard/departments/7/members"
        );
        assert_eq!(
            Route::parse("/dashboard/finance/budgets/add").unwrap(),
            Route::BudgetAdd
        );
        assert_eq!(
            Route::parse("/dashboard/groups/4/events?edit=11").unwrap(),
            Route::GroupEvents { group: 4, edit: Some(11) }
        );
    }

    #[test]
    fn rejects_unknown_paths_and_bad_ids() {
        assert!(Route::parse("/dashboard/nowhere").is_err());
        assert!(Route::parse("/dashboard/members/abc").is_err());
        assert!(Route::parse("/dashboard/groups/1/events?edit=x").is_err());
    }
}
