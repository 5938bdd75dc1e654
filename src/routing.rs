//! Application router configuration for the JSON API.

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::{
    AppState, Error,
    budget::{
        create_budget_endpoint, delete_budget_endpoint, get_budget_endpoint, list_budgets_endpoint,
        update_budget_endpoint,
    },
    endpoints,
    report::{
        get_budget_summary_endpoint, get_income_vs_expense_endpoint,
        get_spending_by_category_endpoint,
    },
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        );

    let budget_routes = Router::new()
        .route(
            endpoints::BUDGETS,
            get(list_budgets_endpoint).post(create_budget_endpoint),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget_endpoint)
                .put(update_budget_endpoint)
                .delete(delete_budget_endpoint),
        );

    let report_routes = Router::new()
        .route(
            endpoints::SPENDING_BY_CATEGORY,
            get(get_spending_by_category_endpoint),
        )
        .route(
            endpoints::INCOME_VS_EXPENSE,
            get(get_income_vs_expense_endpoint),
        )
        .route(endpoints::BUDGET_SUMMARY, get(get_budget_summary_endpoint));

    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .merge(transaction_routes)
        .merge(budget_routes)
        .merge(report_routes)
        .fallback(get_404_not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn get_health() -> Json<Value> {
    Json(json!({ "status": "UP", "message": "API is healthy" }))
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
