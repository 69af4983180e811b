use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::board::{Filterable, Record, SortValue, Sortable};
use crate::models::status::{Lifecycle, Transitions};

/// Utilization at or above this percentage flags a budget as a warning.
pub const WARNING_PERCENT: u32 = 80;

// ─── Budgets ─────────────────────────────────────────────────────────────────

text_enum! {
    pub enum BudgetPeriod ("budget period") {
        Monthly => "monthly", "Monthly";
        Quarterly => "quarterly", "Quarterly";
        Annual => "annual", "Annual";
    }
}

text_enum! {
    pub enum BudgetStatus ("budget status") {
        OnTrack => "on_track", "On Track";
        Warning => "warning", "Warning";
        Exceeded => "exceeded", "Exceeded";
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub period: BudgetPeriod,
    pub amount: f64,
    pub spent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub name: String,
    pub department: String,
    pub period: BudgetPeriod,
    pub amount: f64,
}

impl Budget {
    pub fn provisional(draft: &NewBudget) -> Self {
        Self {
            id: 0,
            name: draft.name.clone(),
            department: draft.department.clone(),
            period: draft.period,
            amount: draft.amount,
            spent: 0.0,
        }
    }

    /// `round(spent / amount * 100)`; a zero budget reports 0.
    pub fn utilization(&self) -> u32 {
        if self.amount <= 0.0 {
            return 0;
        }
        (self.spent / self.amount * 100.0).round().max(0.0) as u32
    }

    pub fn remaining(&self) -> f64 {
        self.amount - self.spent
    }

    /// Derived from the figures every time, never stored.
    pub fn status(&self) -> BudgetStatus {
        if self.spent > self.amount {
            BudgetStatus::Exceeded
        } else if self.amount > 0.0 && self.utilization() >= WARNING_PERCENT {
            BudgetStatus::Warning
        } else {
            BudgetStatus::OnTrack
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub budget_id: i64,
    pub amount: f64,
    pub description: String,
    pub spent_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub budget_id: i64,
    pub amount: f64,
    pub description: String,
    pub spent_on: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BudgetFacet {
    Status(BudgetStatus),
    Period(BudgetPeriod),
    Department(String),
}

impl Record for Budget {
    const ENTITY: &'static str = "budget";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Budget {
    type Facet = BudgetFacet;

    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.department.as_str()]
    }

    fn facets(&self) -> Vec<BudgetFacet> {
        vec![
            BudgetFacet::Status(self.status()),
            BudgetFacet::Period(self.period),
            BudgetFacet::Department(self.department.clone()),
        ]
    }
}

impl Sortable for Budget {
    fn sort_keys() -> &'static [&'static str] {
        &["name", "amount", "used"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Text(self.name.clone()),
            1 => SortValue::Number(self.amount),
            _ => SortValue::Number(self.utilization() as f64),
        }
    }
}

// ─── Giving ──────────────────────────────────────────────────────────────────

text_enum! {
    pub enum GivingType ("giving type") {
        Tithe => "tithe", "Tithe";
        Offering => "offering", "Offering";
        Pledge => "pledge", "Pledge";
        Special => "special", "Special Gift";
    }
}

text_enum! {
    pub enum GivingCategory ("giving category") {
        General => "general", "General Fund";
        Missions => "missions", "Missions";
        Building => "building", "Building Fund";
        Benevolence => "benevolence", "Benevolence";
        Youth => "youth", "Youth Ministry";
    }
}

text_enum! {
    pub enum PaymentMethod ("payment method") {
        Cash => "cash", "Cash";
        Check => "check", "Check";
        Card => "card", "Card";
        BankTransfer => "bank_transfer", "Bank Transfer";
        Mobile => "mobile", "Mobile";
    }
}

text_enum! {
    pub enum DonationStatus ("donation status") {
        Pending => "pending", "Pending";
        Completed => "completed", "Completed";
        Failed => "failed", "Failed";
        Refunded => "refunded", "Refunded";
    }
}

impl Transitions for DonationStatus {
    const ENTITY: &'static str = "donation";

    fn next_states(&self) -> &'static [Self] {
        match self {
            DonationStatus::Pending => &[DonationStatus::Completed, DonationStatus::Failed],
            DonationStatus::Failed => &[DonationStatus::Pending],
            DonationStatus::Completed => &[DonationStatus::Refunded],
            DonationStatus::Refunded => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: i64,
    pub donor_name: String,
    pub member_id: Option<i64>,
    pub amount: f64,
    pub giving_type: GivingType,
    pub category: GivingCategory,
    pub method: PaymentMethod,
    pub status: DonationStatus,
    pub given_on: NaiveDate,
    pub receipt_number: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_name: String,
    pub member_id: Option<i64>,
    pub amount: f64,
    pub giving_type: GivingType,
    pub category: GivingCategory,
    pub method: PaymentMethod,
    pub status: DonationStatus,
    pub given_on: NaiveDate,
    pub note: Option<String>,
    /// Prefix for the receipt number the store assigns.
    pub receipt_prefix: String,
}

impl Donation {
    /// Receipt numbers are assigned by the store, so the optimistic copy has none.
    pub fn provisional(draft: &NewDonation) -> Self {
        Self {
            id: 0,
            donor_name: draft.donor_name.clone(),
            member_id: draft.member_id,
            amount: draft.amount,
            giving_type: draft.giving_type,
            category: draft.category,
            method: draft.method,
            status: draft.status,
            given_on: draft.given_on,
            receipt_number: String::new(),
            note: draft.note.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DonationFacet {
    Status(DonationStatus),
    Category(GivingCategory),
    Method(PaymentMethod),
    Type(GivingType),
}

impl Record for Donation {
    const ENTITY: &'static str = "donation";

    fn id(&self) -> i64 {
        self.id
    }
}

impl Filterable for Donation {
    type Facet = DonationFacet;

    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.donor_name.as_str(), self.receipt_number.as_str()];
        if let Some(note) = &self.note {
            fields.push(note);
        }
        fields
    }

    fn facets(&self) -> Vec<DonationFacet> {
        vec![
            DonationFacet::Status(self.status),
            DonationFacet::Category(self.category),
            DonationFacet::Method(self.method),
            DonationFacet::Type(self.giving_type),
        ]
    }
}

impl Sortable for Donation {
    fn sort_keys() -> &'static [&'static str] {
        &["date", "amount", "donor"]
    }

    fn sort_value(&self, key: usize) -> SortValue {
        match key {
            0 => SortValue::Date(self.given_on),
            1 => SortValue::Number(self.amount),
            _ => SortValue::Text(self.donor_name.clone()),
        }
    }
}

impl Lifecycle for Donation {
    type Status = DonationStatus;

    fn status(&self) -> DonationStatus {
        self.status
    }

    fn set_status(&mut self, status: DonationStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Filter;

    fn budget(name: &str, department: &str, amount: f64, spent: f64) -> Budget {
        Budget {
            id: 1,
            name: name.into(),
            department: department.into(),
            period: BudgetPeriod::Annual,
            amount,
            spent,
        }
    }

    #[test]
    fn utilization_rounds_to_whole_percent() {
        assert_eq!(budget("Worship", "Music", 15000.0, 12500.0).utilization(), 83);
        assert_eq!(budget("Youth", "Youth", 2000.0, 1995.0).utilization(), 100);
        assert_eq!(budget("Empty", "Admin", 0.0, 0.0).utilization(), 0);
    }

    #[test]
    fn status_is_derived_from_figures() {
        assert_eq!(budget("a", "x", 1000.0, 100.0).status(), BudgetStatus::OnTrack);
        assert_eq!(budget("a", "x", 1000.0, 800.0).status(), BudgetStatus::Warning);
        assert_eq!(budget("a", "x", 1000.0, 1000.0).status(), BudgetStatus::Warning);
        assert_eq!(budget("a", "x", 1000.0, 1000.5).status(), BudgetStatus::Exceeded);
    }

    #[test]
    fn filtered_budgets_satisfy_predicate() {
        let budgets = vec![
            budget("Worship Team", "Music", 15000.0, 12500.0),
            budget("Sound Gear", "Music", 3000.0, 3500.0),
            budget("Missions Trip", "Outreach", 8000.0, 1000.0),
            budget("Youth Retreat", "Youth", 5000.0, 4900.0),
        ];
        let filter = Filter::new()
            .search("MUS")
            .with(BudgetFacet::Status(BudgetStatus::Warning));
        let hits = filter.apply(&budgets);
        assert_eq!(hits.len(), 1);
        for b in hits {
            let term = "mus";
            assert!(
                b.name.to_lowercase().contains(term) || b.department.to_lowercase().contains(term)
            );
            assert_eq!(b.status(), BudgetStatus::Warning);
        }
    }

    #[test]
    fn refunded_is_final() {
        assert!(DonationStatus::Refunded.is_final());
        assert!(DonationStatus::Completed.can_transition_to(DonationStatus::Refunded));
        assert!(!DonationStatus::Completed.can_transition_to(DonationStatus::Pending));
    }
}
