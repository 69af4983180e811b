//! Text-field forms shared by the CLI and the dashboard's quick-add popup.
//! Each `validate` turns raw input into a draft or the first field error.

use chrono::NaiveDate;
use std::str::FromStr;

use crate::error::FlockError;
use crate::models::{
    BudgetPeriod, DonationStatus, GivingCategory, GivingType, MemberStatus, NewBudget,
    NewDonation, NewExpense, NewGroupEvent, NewMember, NewNewsletter, NewPrayerRequest, NewRole,
    PaymentMethod, Priority, RoleLevel,
};

fn required(field: &'static str, value: &str) -> Result<String, FlockError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FlockError::validation(field, "is required"));
    }
    Ok(value.to_string())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn positive_amount(field: &'static str, value: &str) -> Result<f64, FlockError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FlockError::validation(field, "enter an amount first"));
    }
    match trimmed.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        Ok(_) => Err(FlockError::validation(field, "must be greater than 0")),
        Err(_) => Err(FlockError::validation(
            field,
            format!("'{}' is not a valid number", trimmed),
        )),
    }
}

/// Blank input picks `default`; otherwise the text must name a variant.
fn choice<E: FromStr<Err = anyhow::Error>>(
    field: &'static str,
    value: &str,
    default: E,
) -> Result<E, FlockError> {
    if value.trim().is_empty() {
        return Ok(default);
    }
    value
        .parse()
        .map_err(|e: anyhow::Error| FlockError::validation(field, e.to_string()))
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FlockError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FlockError::validation(field, format!("'{}' is not a YYYY-MM-DD date", value.trim())))
}

fn date_or(field: &'static str, value: &str, default: NaiveDate) -> Result<NaiveDate, FlockError> {
    if value.trim().is_empty() {
        Ok(default)
    } else {
        parse_date(field, value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub status: String,
}

impl MemberForm {
    pub fn validate(&self, today: NaiveDate) -> Result<NewMember, FlockError> {
        let name = required("name", &self.name)?;
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(FlockError::validation("email", "must contain '@'"));
        }
        Ok(NewMember {
            name,
            email,
            phone: optional(&self.phone),
            department: optional(&self.department),
            status: choice("status", &self.status, MemberStatus::Active)?,
            joined_on: today,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct DonationForm {
    pub donor: String,
    pub amount: String,
    pub giving_type: String,
    pub category: String,
    pub method: String,
    pub member_id: Option<i64>,
    pub note: String,
}

impl DonationForm {
    pub fn validate(&self, today: NaiveDate, receipt_prefix: &str) -> Result<NewDonation, FlockError> {
        let donor_name = required("donor", &self.donor)?;
        let amount = positive_amount("amount", &self.amount)?;
        Ok(NewDonation {
            donor_name,
            member_id: self.member_id,
            amount,
            giving_type: choice("type", &self.giving_type, GivingType::Offering)?,
            category: choice("category", &self.category, GivingCategory::General)?,
            method: choice("method", &self.method, PaymentMethod::Cash)?,
            status: DonationStatus::Completed,
            given_on: today,
            note: optional(&self.note),
            receipt_prefix: receipt_prefix.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BudgetForm {
    pub name: String,
    pub department: String,
    pub period: String,
    pub amount: String,
}

impl BudgetForm {
    pub fn validate(&self) -> Result<NewBudget, FlockError> {
        let name = required("name", &self.name)?;
        let amount = positive_amount("amount", &self.amount)?;
        Ok(NewBudget {
            name,
            department: optional(&self.department).unwrap_or_else(|| "General".to_string()),
            period: choice("period", &self.period, BudgetPeriod::Annual)?,
            amount,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub budget_id: i64,
    pub amount: String,
    pub description: String,
    pub date: String,
}

impl ExpenseForm {
    pub fn validate(&self, today: NaiveDate) -> Result<NewExpense, FlockError> {
        let amount = positive_amount("amount", &self.amount)?;
        Ok(NewExpense {
            budget_id: self.budget_id,
            amount,
            description: required("description", &self.description)?,
            spent_on: date_or("date", &self.date, today)?,
        })
    }
}

/// Responsibilities are entered one per line.
#[derive(Debug, Clone, Default)]
pub struct RoleForm {
    pub department_id: i64,
    pub title: String,
    pub level: String,
    pub description: String,
    pub responsibilities: String,
}

impl RoleForm {
    pub fn validate(&self) -> Result<NewRole, FlockError> {
        let title = required("title", &self.title)?;
        if self.level.trim().is_empty() {
            return Err(FlockError::validation("level", "is required"));
        }
        let level = choice("level", &self.level, RoleLevel::Member)?;
        Ok(NewRole {
            department_id: self.department_id,
            title,
            level,
            description: self.description.trim().to_string(),
            responsibilities: split_lines(&self.responsibilities),
        })
    }
}

/// Splits on newlines (a literal `\n` typed on a command line counts too),
/// trims each line and drops blanks.
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\\n", "\n")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct PrayerForm {
    pub title: String,
    pub description: String,
    pub requester: String,
    pub priority: String,
    pub is_private: bool,
}

impl PrayerForm {
    pub fn validate(&self) -> Result<NewPrayerRequest, FlockError> {
        Ok(NewPrayerRequest {
            title: required("title", &self.title)?,
            description: self.description.trim().to_string(),
            requester: optional(&self.requester).unwrap_or_else(|| "Anonymous".to_string()),
            priority: choice("priority", &self.priority, Priority::Normal)?,
            is_private: self.is_private,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewsletterForm {
    pub title: String,
    pub body: String,
}

impl NewsletterForm {
    pub fn validate(&self) -> Result<NewNewsletter, FlockError> {
        Ok(NewNewsletter {
            title: required("title", &self.title)?,
            body: self.body.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventForm {
    pub group_id: i64,
    pub title: String,
    pub date: String,
    pub location: String,
}

impl EventForm {
    pub fn validate(&self) -> Result<NewGroupEvent, FlockError> {
        let title = required("title", &self.title)?;
        if self.date.trim().is_empty() {
            return Err(FlockError::validation("date", "is required"));
        }
        Ok(NewGroupEvent {
            group_id: self.group_id,
            title,
            event_date: parse_date("date", &self.date)?,
            location: optional(&self.location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 10).unwrap()
    }

    #[test]
    fn role_responsibilities_are_split_and_trimmed() {
        let form = RoleForm {
            department_id: 3,
            title: "Worship Leader".into(),
            level: "leader".into(),
            description: "Leads worship".into(),
            responsibilities: "Plan setlist\n\n  Rehearse band  \n".into(),
        };
        let role = form.validate().unwrap();
        assert_eq!(role.title, "Worship Leader");
        assert_eq!(role.level, RoleLevel::Leader);
        assert_eq!(role.responsibilities, vec!["Plan setlist", "Rehearse band"]);
    }

    #[test]
    fn escaped_newlines_from_the_shell_split_too() {
        assert_eq!(split_lines("a\\nb"), vec!["a", "b"]);
    }

    #[test]
    fn donation_amount_must_be_positive() {
        let mut form = DonationForm {
            donor: "Ruth Park".into(),
            amount: "0".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(today(), "DON").unwrap_err(),
            FlockError::validation("amount", "must be greater than 0")
        );
        form.amount = "-5".into();
        assert!(form.validate(today(), "DON").is_err());
        form.amount = "abc".into();
        assert!(matches!(
            form.validate(today(), "DON"),
            Err(FlockError::Validation { field: "amount", .. })
        ));
        form.amount = "25.50".into();
        let gift = form.validate(today(), "DON").unwrap();
        assert_eq!(gift.amount, 25.5);
        assert_eq!(gift.category, GivingCategory::General);
        assert_eq!(gift.status, DonationStatus::Completed);
    }

    #[test]
    fn member_email_needs_at_sign() {
        let form = MemberForm {
            name: "Sam Cole".into(),
            email: "sam.example.org".into(),
            ..Default::default()
        };
        assert!(matches!(
            form.validate(today()),
            Err(FlockError::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn unknown_choice_names_the_field() {
        let form = BudgetForm {
            name: "Retreat".into(),
            amount: "100".into(),
            period: "fortnightly".into(),
            ..Default::default()
        };
        let err = form.validate().unwrap_err();
        assert!(matches!(err, FlockError::Validation { field: "period", .. }));
    }
}
