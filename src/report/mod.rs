//! Reports that summarise transactions over a date range.

mod core;
mod endpoints;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use core::{
    BudgetStatus, BudgetSummary, CategorySpending, IncomeVsExpense, get_budget_summary,
    get_income_vs_expense, get_spending_by_category, round_to_cents,
};
pub use endpoints::{
    BudgetSummaryQuery, ReportQuery, get_budget_summary_endpoint, get_income_vs_expense_endpoint,
    get_spending_by_category_endpoint,
};

/// The state needed by the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for reading transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
