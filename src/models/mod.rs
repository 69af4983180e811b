/// Declares a closed text-backed enum: stable storage strings, display labels,
/// case-insensitive parsing and SQLite conversions.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $($variant:ident => $text:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let options: Vec<&str> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        anyhow::anyhow!("Unknown {}: '{}' (use: {})", $kind, s, options.join(", "))
                    })
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value.as_str()?.parse().map_err(|e: anyhow::Error| {
                    rusqlite::types::FromSqlError::Other(e.into())
                })
            }
        }
    };
}

pub mod attendance;
pub mod department;
pub mod finance;
pub mod group;
pub mod member;
pub mod newsletter;
pub mod prayer;
pub mod stats;
pub mod status;
pub mod sunday_school;

pub use attendance::{AttendanceRecord, AttendanceStatus, NewAttendance, ServiceType};
pub use department::{
    Department, DepartmentMember, DepartmentRole, NewAssignment, NewDepartment, NewRole, RoleLevel,
};
pub use finance::{
    Budget, BudgetPeriod, BudgetStatus, Donation, DonationStatus, Expense, GivingCategory,
    GivingType, NewBudget, NewDonation, NewExpense, PaymentMethod,
};
pub use group::{EventEdit, Group, GroupCategory, GroupEvent, NewGroup, NewGroupEvent};
pub use member::{Member, MemberStatus, NewMember};
pub use newsletter::{NewNewsletter, Newsletter, NewsletterStatus};
pub use prayer::{NewPrayerRequest, PrayerComment, PrayerRequest, PrayerStatus, PrayerUpdate, Priority};
pub use stats::{AttendanceSummary, DailyAttendance, DashboardSummary, FinanceReport, GivingSummary};
pub use status::{Lifecycle, Transitions};
pub use sunday_school::{
    ClassAttendance, ClassStats, NewClass, NewStudent, NewTeacher, SchoolClass, Student, Teacher,
};
