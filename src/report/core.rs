//! Aggregate queries over transactions and budgets for a date range.
//!
//! All date ranges are inclusive at both ends. Money values in the results are
//! rounded to cents.

use std::ops::RangeInclusive;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, budget::Period};

/// Round `amount` to two decimal places.
///
/// Amounts too large to scale by 100 are returned unchanged.
pub fn round_to_cents(amount: f64) -> f64 {
    let cents = amount * 100.0;

    if cents.is_finite() {
        cents.round() / 100.0
    } else {
        amount
    }
}

// ============================================================================
// MODELS
// ============================================================================

/// The total spent on a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    /// The category the expenses were recorded under.
    pub category: String,
    /// The sum of the expenses in the category.
    pub total_spent: f64,
}

/// Money earned versus money spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeVsExpense {
    /// The sum of all income.
    pub total_income: f64,
    /// The sum of all expenses.
    pub total_expenses: f64,
    /// Income minus expenses.
    pub net_balance: f64,
}

/// How much of a budget has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetStatus {
    /// Less than 90% of the budget has been spent.
    #[serde(rename = "On Track")]
    OnTrack,
    /// At least 90% of the budget has been spent, but not more than the budget.
    #[serde(rename = "Nearing Limit")]
    NearingLimit,
    /// More than the budget has been spent.
    #[serde(rename = "Over Budget")]
    OverBudget,
}

impl BudgetStatus {
    /// Classify spending `spent` against the budgeted amount `budgeted`.
    pub fn classify(budgeted: f64, spent: f64) -> Self {
        if spent > budgeted {
            BudgetStatus::OverBudget
        } else if budgeted > 0.0 && spent >= budgeted * 0.9 {
            BudgetStatus::NearingLimit
        } else {
            BudgetStatus::OnTrack
        }
    }
}

/// Spending against a single budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    /// The budget's category.
    pub category: String,
    /// The budget's amount.
    pub budgeted_amount: f64,
    /// The expenses in the category.
    pub total_spent: f64,
    /// The budgeted amount minus the total spent, negative when over budget.
    pub remaining_amount: f64,
    /// Whether spending is on track, nearing the limit, or over budget.
    pub status: BudgetStatus,
}

impl BudgetSummary {
    /// Build a summary from the unrounded budget amount and spending.
    pub fn new(category: String, budgeted_amount: f64, total_spent: f64) -> Self {
        let budgeted_amount = round_to_cents(budgeted_amount);
        let total_spent = round_to_cents(total_spent);

        Self {
            category,
            budgeted_amount,
            total_spent,
            remaining_amount: round_to_cents(budgeted_amount - total_spent),
            status: BudgetStatus::classify(budgeted_amount, total_spent),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Get the total of the expenses in each category within `date_range`.
///
/// The result is sorted by the amount spent, largest first. Categories without
/// expenses in the date range are left out.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_spending_by_category(
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<Vec<CategorySpending>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) AS total_spent
             FROM transactions
             WHERE type = 'expense' AND date BETWEEN ?1 AND ?2
             GROUP BY category
             ORDER BY total_spent DESC, category ASC",
        )?
        .query_map((date_range.start(), date_range.end()), |row| {
            Ok(CategorySpending {
                category: row.get(0)?,
                total_spent: round_to_cents(row.get(1)?),
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()
        .map_err(Error::from)
}

/// Get the total income and expenses within `date_range`.
///
/// The totals are zero when there are no transactions in the date range.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_income_vs_expense(
    date_range: RangeInclusive<Date>,
    connection: &Connection,
) -> Result<IncomeVsExpense, Error> {
    let (total_income, total_expenses): (f64, f64) = connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0.0),
                COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0.0)
             FROM transactions
             WHERE date BETWEEN ?1 AND ?2",
        )?
        .query_row((date_range.start(), date_range.end()), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;

    let total_income = round_to_cents(total_income);
    let total_expenses = round_to_cents(total_expenses);

    Ok(IncomeVsExpense {
        total_income,
        total_expenses,
        net_balance: round_to_cents(total_income - total_expenses),
    })
}

/// Compare the expenses within `date_range` to each budget with `period`.
///
/// Expenses count towards a budget when their category matches the budget's
/// category. The result is ordered by category and is empty if there are no
/// budgets for the period.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_budget_summary(
    date_range: RangeInclusive<Date>,
    period: Period,
    connection: &Connection,
) -> Result<Vec<BudgetSummary>, Error> {
    connection
        .prepare(
            "SELECT b.category, b.amount, COALESCE(SUM(t.amount), 0.0) AS total_spent
             FROM budgets b
             LEFT JOIN transactions t
                ON t.category = b.category
                AND t.type = 'expense'
                AND t.date BETWEEN ?1 AND ?2
             WHERE b.period = ?3
             GROUP BY b.id
             ORDER BY b.category ASC",
        )?
        .query_map((date_range.start(), date_range.end(), period), |row| {
            Ok(BudgetSummary::new(row.get(0)?, row.get(1)?, row.get(2)?))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()
        .map_err(Error::from)
}

// ============================================================================
// TESTS
// ============================================================================
