use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, AttendanceStatus, Donation, DonationStatus, Expense, GivingCategory};

// ─── Giving ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: GivingCategory,
    pub total: f64,
    pub count: u32,
}

/// Summary of the donations currently shown. Failed and refunded gifts are
/// listed but not counted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GivingSummary {
    pub total: f64,
    pub count: u32,
    pub by_category: Vec<CategoryTotal>,
}

impl GivingSummary {
    pub fn from_donations(donations: &[&Donation]) -> Self {
        let counted: Vec<&Donation> = donations
            .iter()
            .copied()
            .filter(|d| matches!(d.status, DonationStatus::Pending | DonationStatus::Completed))
            .collect();

        let by_category = GivingCategory::ALL
            .iter()
            .filter_map(|category| {
                let mine: Vec<&&Donation> =
                    counted.iter().filter(|d| d.category == *category).collect();
                if mine.is_empty() {
                    None
                } else {
                    Some(CategoryTotal {
                        category: *category,
                        total: mine.iter().map(|d| d.amount).sum(),
                        count: mine.len() as u32,
                    })
                }
            })
            .collect();

        Self {
            total: counted.iter().map(|d| d.amount).sum(),
            count: counted.len() as u32,
            by_category,
        }
    }

    /// The category given to most often; ties go to the larger total.
    pub fn most_used(&self) -> Option<GivingCategory> {
        self.by_category
            .iter()
            .max_by(|a, b| {
                a.count
                    .cmp(&b.count)
                    .then(a.total.partial_cmp(&b.total).unwrap_or(std::cmp::Ordering::Equal))
            })
            .map(|c| c.category)
    }

    /// Mean total across the categories that received anything.
    pub fn average_per_category(&self) -> f64 {
        if self.by_category.is_empty() {
            0.0
        } else {
            self.total / self.by_category.len() as f64
        }
    }
}

// ─── Income vs expense ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub income: f64,
    pub expenses: f64,
    pub income_by_category: Vec<(GivingCategory, f64)>,
    pub expenses_by_budget: Vec<(String, f64)>,
}

impl FinanceReport {
    /// Income is completed gifts in range; expenses are recorded spending in
    /// range, labelled by budget name.
    pub fn build(
        from: NaiveDate,
        to: NaiveDate,
        donations: &[Donation],
        expenses: &[(Expense, String)],
    ) -> Self {
        let in_range = |d: NaiveDate| d >= from && d <= to;

        let income_rows: Vec<&Donation> = donations
            .iter()
            .filter(|d| d.status == DonationStatus::Completed && in_range(d.given_on))
            .collect();
        let income_by_category = GivingCategory::ALL
            .iter()
            .filter_map(|c| {
                let sum: f64 = income_rows
                    .iter()
                    .filter(|d| d.category == *c)
                    .map(|d| d.amount)
                    .sum();
                (sum > 0.0).then_some((*c, sum))
            })
            .collect();

        let mut expenses_by_budget: Vec<(String, f64)> = Vec::new();
        for (expense, budget) in expenses.iter().filter(|(e, _)| in_range(e.spent_on)) {
            match expenses_by_budget.iter_mut().find(|(name, _)| name == budget) {
                Some((_, sum)) => *sum += expense.amount,
                None => expenses_by_budget.push((budget.clone(), expense.amount)),
            }
        }

        Self {
            from,
            to,
            income: income_rows.iter().map(|d| d.amount).sum(),
            expenses: expenses_by_budget.iter().map(|(_, sum)| sum).sum(),
            income_by_category,
            expenses_by_budget,
        }
    }

    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total: u32,
    pub counts: Vec<(AttendanceStatus, u32)>,
}

impl AttendanceSummary {
    pub fn from_records(records: &[&AttendanceRecord]) -> Self {
        let counts = AttendanceStatus::ALL
            .iter()
            .map(|s| (*s, records.iter().filter(|r| r.status == *s).count() as u32))
            .collect();
        Self {
            total: records.len() as u32,
            counts,
        }
    }

    pub fn count(&self, status: AttendanceStatus) -> u32 {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn attended(&self) -> u32 {
        self.counts
            .iter()
            .filter(|(s, _)| s.attended())
            .map(|(_, n)| n)
            .sum()
    }

    /// `round(attended / total * 100)`.
    pub fn rate(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            (self.attended() as f64 / self.total as f64 * 100.0).round() as u32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAttendance {
    pub date: NaiveDate,
    pub attended: u32,
    pub total: u32,
}

impl DailyAttendance {
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.attended as f64 / self.total as f64
        }
    }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub members_total: u32,
    pub members_active: u32,
    pub visitors: u32,
    pub attendance_this_week: u32,
    pub giving_this_month: f64,
    pub budgets_exceeded: u32,
    pub budgets_warning: u32,
    pub open_prayers: u32,
    pub newsletters_scheduled: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GivingType, PaymentMethod};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    fn gift(id: i64, amount: f64, category: GivingCategory, status: DonationStatus) -> Donation {
        Donation {
            id,
            donor_name: format!("Donor {}", id),
            member_id: None,
            amount,
            giving_type: GivingType::Offering,
            category,
            method: PaymentMethod::Cash,
            status,
            given_on: date(id as u32),
            receipt_number: format!("DON-{:06}", id),
            note: None,
        }
    }

    #[test]
    fn giving_summary_uses_shown_records() {
        let gifts = [
            gift(1, 100.0, GivingCategory::General, DonationStatus::Completed),
            gift(2, 50.0, GivingCategory::General, DonationStatus::Pending),
            gift(3, 500.0, GivingCategory::Building, DonationStatus::Completed),
            gift(4, 900.0, GivingCategory::Missions, DonationStatus::Refunded),
        ];
        let shown: Vec<&Donation> = gifts.iter().collect();
        let summary = GivingSummary::from_donations(&shown);
        assert_eq!(summary.total, 650.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.most_used(), Some(GivingCategory::General));
        assert_eq!(summary.average_per_category(), 325.0);

        let only_building: Vec<&Donation> = gifts.iter().filter(|g| g.id == 3).collect();
        let summary = GivingSummary::from_donations(&only_building);
        assert_eq!(summary.most_used(), Some(GivingCategory::Building));
        assert_eq!(summary.average_per_category(), 500.0);
    }

    #[test]
    fn finance_report_nets_income_against_expenses() {
        let gifts = vec![
            gift(2, 300.0, GivingCategory::General, DonationStatus::Completed),
            gift(3, 200.0, GivingCategory::Missions, DonationStatus::Completed),
            gift(4, 999.0, GivingCategory::General, DonationStatus::Pending),
            gift(20, 50.0, GivingCategory::General, DonationStatus::Completed),
        ];
        let expense = |id: i64, amount: f64, day: u32| Expense {
            id,
            budget_id: 1,
            amount,
            description: "supplies".into(),
            spent_on: date(day),
        };
        let expenses = vec![
            (expense(1, 120.0, 5), "Worship".to_string()),
            (expense(2, 30.0, 6), "Worship".to_string()),
            (expense(3, 75.0, 7), "Youth".to_string()),
        ];
        let report = FinanceReport::build(date(1), date(10), &gifts, &expenses);
        assert_eq!(report.income, 500.0);
        assert_eq!(report.expenses, 225.0);
        assert_eq!(report.net(), 275.0);
        assert_eq!(
            report.expenses_by_budget,
            vec![("Worship".to_string(), 150.0), ("Youth".to_string(), 75.0)]
        );
        assert_eq!(report.income_by_category.len(), 2);
    }
}
