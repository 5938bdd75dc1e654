//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/v1/budgets/{budget_id}', use [format_endpoint].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/v1/budgets";
/// The route to access a single budget.
pub const BUDGET: &str = "/api/v1/budgets/{budget_id}";

/// The route for the total expenses per category.
pub const SPENDING_BY_CATEGORY: &str = "/api/v1/reports/spending-by-category";
/// The route for total income against total expenses.
pub const INCOME_VS_EXPENSE: &str = "/api/v1/reports/income-vs-expense";
/// The route for spending against each budget.
pub const BUDGET_SUMMARY: &str = "/api/v1/reports/budget-summary";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/budgets/{budget_id}', '{budget_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
