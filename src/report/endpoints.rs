//! Route handlers for the report endpoints.
//!
//! Every report takes the inclusive date range from the `startDate` and
//! `endDate` query parameters.

use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    budget::Period,
    db::lock_connection,
    report::{
        BudgetSummary, CategorySpending, IncomeVsExpense, ReportState, get_budget_summary,
        get_income_vs_expense, get_spending_by_category,
    },
};

/// The query parameters for the spending and income reports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    /// The first day of the report, inclusive.
    pub start_date: Date,
    /// The last day of the report, inclusive.
    pub end_date: Date,
}

/// The query parameters for the budget summary report.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummaryQuery {
    /// The first day of the report, inclusive.
    pub start_date: Date,
    /// The last day of the report, inclusive.
    pub end_date: Date,
    /// Only budgets with this period are summarised. Defaults to monthly.
    #[serde(default)]
    pub period: Period,
}

/// A route handler for the expenses per category.
pub async fn get_spending_by_category_endpoint(
    State(state): State<ReportState>,
    WithRejection(Query(query), _): WithRejection<Query<ReportQuery>, Error>,
) -> Result<Json<Vec<CategorySpending>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_spending_by_category(query.start_date..=query.end_date, &connection).map(Json)
}

/// A route handler for total income against total expenses.
pub async fn get_income_vs_expense_endpoint(
    State(state): State<ReportState>,
    WithRejection(Query(query), _): WithRejection<Query<ReportQuery>, Error>,
) -> Result<Json<IncomeVsExpense>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_income_vs_expense(query.start_date..=query.end_date, &connection).map(Json)
}

/// A route handler for spending against each budget with the requested period.
pub async fn get_budget_summary_endpoint(
    State(state): State<ReportState>,
    WithRejection(Query(query), _): WithRejection<Query<BudgetSummaryQuery>, Error>,
) -> Result<Json<Vec<BudgetSummary>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budget_summary(query.start_date..=query.end_date, query.period, &connection).map(Json)
}
