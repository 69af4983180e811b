use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_changed, require};
use crate::db::store::RecordStore;
use crate::error::FlockError;
use crate::models::{Budget, Donation, Expense, NewBudget, NewDonation, NewExpense, Transitions};
use crate::utils::receipt::next_free_receipt;

// ─── Budgets ─────────────────────────────────────────────────────────────────

const BUDGET_COLUMNS: &str = "id, name, department, period, amount, spent";

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        name: row.get(1)?,
        department: row.get(2)?,
        period: row.get(3)?,
        amount: row.get(4)?,
        spent: row.get(5)?,
    })
}

fn expense_from_row(row: &Row) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        spent_on: row.get(4)?,
    })
}

fn insert_expense(conn: &Connection, draft: &NewExpense) -> Result<i64> {
    require(conn, "budgets", "budget", draft.budget_id)?;
    conn.execute(
        "INSERT INTO expenses (budget_id, amount, description, spent_on) VALUES (?1, ?2, ?3, ?4)",
        params![draft.budget_id, draft.amount, draft.description, draft.spent_on],
    )?;
    let expense_id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE budgets SET spent = spent + ?1 WHERE id = ?2",
        params![draft.amount, draft.budget_id],
    )?;
    Ok(expense_id)
}

pub struct BudgetRepo;

impl BudgetRepo {
    /// Records spending against a budget. The expense row and the budget's
    /// running total change together or not at all.
    pub fn record_expense(conn: &Connection, draft: &NewExpense) -> Result<(Expense, Budget)> {
        if draft.amount <= 0.0 {
            return Err(FlockError::validation("amount", "must be greater than 0").into());
        }
        // Callers already inside a transaction (seeding) own the commit.
        let expense_id = if conn.is_autocommit() {
            let tx = conn.unchecked_transaction()?;
            let id = insert_expense(&tx, draft)?;
            tx.commit()?;
            id
        } else {
            insert_expense(conn, draft)?
        };

        let expense = conn.query_row(
            "SELECT id, budget_id, amount, description, spent_on FROM expenses WHERE id = ?1",
            params![expense_id],
            expense_from_row,
        )?;
        let budget = Self::get(conn, draft.budget_id)?;
        log::info!(
            "expense of {:.2} on budget '{}' ({}% used)",
            draft.amount,
            budget.name,
            budget.utilization()
        );
        Ok((expense, budget))
    }

    pub fn expenses(conn: &Connection, budget_id: i64) -> Result<Vec<Expense>> {
        let mut stmt = conn.prepare(
            "SELECT id, budget_id, amount, description, spent_on
             FROM expenses WHERE budget_id = ?1 ORDER BY spent_on DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![budget_id], expense_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Every expense paired with its budget's name, for reports.
    pub fn expenses_with_budget(conn: &Connection) -> Result<Vec<(Expense, String)>> {
        let mut stmt = conn.prepare(
            "SELECT e.id, e.budget_id, e.amount, e.description, e.spent_on, b.name
             FROM expenses e JOIN budgets b ON b.id = e.budget_id
             ORDER BY e.spent_on, e.id",
        )?;
        let rows = stmt.query_map([], |row| Ok((expense_from_row(row)?, row.get(5)?)))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }
}

impl RecordStore for BudgetRepo {
    type Record = Budget;
    type Draft = NewBudget;

    fn all(conn: &Connection) -> Result<Vec<Budget>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM budgets ORDER BY name COLLATE NOCASE, id",
            BUDGET_COLUMNS
        ))?;
        let rows = stmt.query_map([], budget_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Budget> {
        conn.query_row(
            &format!("SELECT {} FROM budgets WHERE id = ?1", BUDGET_COLUMNS),
            params![id],
            budget_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("budget", id).into())
    }

    fn create(conn: &Connection, draft: &NewBudget) -> Result<Budget> {
        conn.execute(
            "INSERT INTO budgets (name, department, period, amount, spent) VALUES (?1, ?2, ?3, ?4, 0)",
            params![draft.name, draft.department, draft.period, draft.amount],
        )?;
        Self::get(conn, conn.last_insert_rowid())
    }

    /// `spent` only moves through [`BudgetRepo::record_expense`].
    fn update(conn: &Connection, budget: &Budget) -> Result<Budget> {
        let changed = conn.execute(
            "UPDATE budgets SET name = ?1, department = ?2, period = ?3, amount = ?4 WHERE id = ?5",
            params![budget.name, budget.department, budget.period, budget.amount, budget.id],
        )?;
        ensure_changed(changed, "budget", budget.id)?;
        Self::get(conn, budget.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM budgets WHERE id = ?1", params![id])?;
        ensure_changed(changed, "budget", id)
    }
}

// ─── Donations ───────────────────────────────────────────────────────────────

const DONATION_COLUMNS: &str = "id, donor_name, member_id, amount, giving_type, category, method,
                                status, given_on, receipt_number, note";

fn donation_from_row(row: &Row) -> rusqlite::Result<Donation> {
    Ok(Donation {
        id: row.get(0)?,
        donor_name: row.get(1)?,
        member_id: row.get(2)?,
        amount: row.get(3)?,
        giving_type: row.get(4)?,
        category: row.get(5)?,
        method: row.get(6)?,
        status: row.get(7)?,
        given_on: row.get(8)?,
        receipt_number: row.get(9)?,
        note: row.get(10)?,
    })
}

pub struct DonationRepo;

impl DonationRepo {
    pub fn receipt_taken(conn: &Connection, receipt: &str) -> Result<bool> {
        conn.query_row(
            "SELECT COUNT(*) > 0 FROM donations WHERE receipt_number = ?1",
            params![receipt],
            |row| row.get(0),
        )
        .map_err(anyhow::Error::from)
    }

    /// Inserts with a receipt number derived from `millis`, bumped past any
    /// number already issued.
    pub fn create_at(conn: &Connection, draft: &NewDonation, millis: i64) -> Result<Donation> {
        if draft.amount <= 0.0 {
            return Err(FlockError::validation("amount", "must be greater than 0").into());
        }
        if let Some(member_id) = draft.member_id {
            require(conn, "members", "member", member_id)?;
        }
        let receipt = next_free_receipt(&draft.receipt_prefix, millis, |candidate| {
            Self::receipt_taken(conn, candidate)
        })?;
        conn.execute(
            "INSERT INTO donations (donor_name, member_id, amount, giving_type, category, method,
                                    status, given_on, receipt_number, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                draft.donor_name,
                draft.member_id,
                draft.amount,
                draft.giving_type,
                draft.category,
                draft.method,
                draft.status,
                draft.given_on,
                receipt,
                draft.note,
            ],
        )?;
        log::info!("recorded donation {} from {}", receipt, draft.donor_name);
        Self::get(conn, conn.last_insert_rowid())
    }
}

impl RecordStore for DonationRepo {
    type Record = Donation;
    type Draft = NewDonation;

    fn all(conn: &Connection) -> Result<Vec<Donation>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM donations ORDER BY given_on DESC, id DESC",
            DONATION_COLUMNS
        ))?;
        let rows = stmt.query_map([], donation_from_row)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    fn get(conn: &Connection, id: i64) -> Result<Donation> {
        conn.query_row(
            &format!("SELECT {} FROM donations WHERE id = ?1", DONATION_COLUMNS),
            params![id],
            donation_from_row,
        )
        .optional()?
        .ok_or_else(|| FlockError::not_found("donation", id).into())
    }

    fn create(conn: &Connection, draft: &NewDonation) -> Result<Donation> {
        Self::create_at(conn, draft, Utc::now().timestamp_millis())
    }

    fn update(conn: &Connection, donation: &Donation) -> Result<Donation> {
        if donation.amount <= 0.0 {
            return Err(FlockError::validation("amount", "must be greater than 0").into());
        }
        let current = Self::get(conn, donation.id)?;
        if current.status != donation.status {
            current.status.check_transition(donation.status)?;
            log::info!(
                "donation {} {} -> {}",
                current.receipt_number,
                current.status.as_str(),
                donation.status.as_str()
            );
        }
        conn.execute(
            "UPDATE donations
             SET donor_name = ?1, member_id = ?2, amount = ?3, giving_type = ?4, category = ?5,
                 method = ?6, status = ?7, note = ?8
             WHERE id = ?9",
            params![
                donation.donor_name,
                donation.member_id,
                donation.amount,
                donation.giving_type,
                donation.category,
                donation.method,
                donation.status,
                donation.note,
                donation.id,
            ],
        )?;
        Self::get(conn, donation.id)
    }

    fn remove(conn: &Connection, id: i64) -> Result<()> {
        let changed = conn.execute("DELETE FROM donations WHERE id = ?1", params![id])?;
        ensure_changed(changed, "donation", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::models::{
        BudgetPeriod, BudgetStatus, DonationStatus, GivingCategory, GivingType, PaymentMethod,
    };
    use chrono::NaiveDate;

    fn gift(amount: f64) -> NewDonation {
        NewDonation {
            donor_name: "Esther Quinn".into(),
            member_id: None,
            amount,
            giving_type: GivingType::Tithe,
            category: GivingCategory::General,
            method: PaymentMethod::Card,
            status: DonationStatus::Completed,
            given_on: NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
            note: None,
            receipt_prefix: "DON".into(),
        }
    }

    fn looks_like_receipt(s: &str) -> bool {
        s.strip_prefix("DON-")
            .is_some_and(|d| d.len() == 6 && d.chars().all(|c| c.is_ascii_digit()))
    }

    #[test]
    fn receipts_are_unique_even_in_the_same_millisecond() {
        let conn = open_in_memory();
        let first = DonationRepo::create_at(&conn, &gift(50.0), 1_767_225_600_123).unwrap();
        let second = DonationRepo::create_at(&conn, &gift(75.0), 1_767_225_600_123).unwrap();
        assert_eq!(first.receipt_number, "DON-600123");
        assert_eq!(second.receipt_number, "DON-600124");

        let now = DonationRepo::create(&conn, &gift(10.0)).unwrap();
        assert!(looks_like_receipt(&now.receipt_number));
    }

    #[test]
    fn non_positive_amount_is_rejected_before_insert() {
        let conn = open_in_memory();
        assert!(DonationRepo::create(&conn, &gift(0.0)).is_err());
        assert!(DonationRepo::all(&conn).unwrap().is_empty());
    }

    #[test]
    fn refund_follows_transition_table() {
        let conn = open_in_memory();
        let gift = DonationRepo::create(&conn, &gift(120.0)).unwrap();

        let mut pending = gift.clone();
        pending.status = DonationStatus::Pending;
        assert!(DonationRepo::update(&conn, &pending).is_err());

        let mut refunded = gift;
        refunded.status = DonationStatus::Refunded;
        assert_eq!(
            DonationRepo::update(&conn, &refunded).unwrap().status,
            DonationStatus::Refunded
        );
    }

    #[test]
    fn expense_moves_budget_status() {
        let conn = open_in_memory();
        let budget = BudgetRepo::create(
            &conn,
            &NewBudget {
                name: "Worship Team".into(),
                department: "Music".into(),
                period: BudgetPeriod::Annual,
                amount: 15000.0,
            },
        )
        .unwrap();
        assert_eq!(budget.status(), BudgetStatus::OnTrack);

        let (expense, budget) = BudgetRepo::record_expense(
            &conn,
            &NewExpense {
                budget_id: budget.id,
                amount: 12500.0,
                description: "Sound system".into(),
                spent_on: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            },
        )
        .unwrap();
        assert_eq!(expense.amount, 12500.0);
        assert_eq!(budget.utilization(), 83);
        assert_eq!(budget.status(), BudgetStatus::Warning);
        assert_eq!(BudgetRepo::expenses(&conn, budget.id).unwrap(), vec![expense]);
    }

    #[test]
    fn expense_on_missing_budget_changes_nothing() {
        let conn = open_in_memory();
        let err = BudgetRepo::record_expense(
            &conn,
            &NewExpense {
                budget_id: 7,
                amount: 10.0,
                description: "Candles".into(),
                spent_on: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
            },
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<FlockError>(),
            Some(&FlockError::not_found("budget", 7))
        );
        assert!(BudgetRepo::expenses_with_budget(&conn).unwrap().is_empty());
    }

    #[test]
    fn expense_inside_an_open_transaction_defers_to_it() {
        let conn = open_in_memory();
        let budget = BudgetRepo::create(
            &conn,
            &NewBudget {
                name: "Outreach".into(),
                department: "Missions".into(),
                period: BudgetPeriod::Quarterly,
                amount: 1000.0,
            },
        )
        .unwrap();

        let tx = conn.unchecked_transaction().unwrap();
        let (_, updated) = BudgetRepo::record_expense(
            &tx,
            &NewExpense {
                budget_id: budget.id,
                amount: 250.0,
                description: "Flyers".into(),
                spent_on: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            },
        )
        .unwrap();
        assert_eq!(updated.spent, 250.0);
        drop(tx);

        assert_eq!(BudgetRepo::get(&conn, budget.id).unwrap().spent, 0.0);
        assert!(BudgetRepo::expenses(&conn, budget.id).unwrap().is_empty());
    }
}
