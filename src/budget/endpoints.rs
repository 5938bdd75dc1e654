//! Route handlers for the budget CRUD endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};

use crate::{
    Error,
    budget::{
        Budget, BudgetBuilder, BudgetPatch, BudgetState, create_budget, delete_budget,
        get_all_budgets, get_budget, update_budget,
    },
    database_id::BudgetId,
    db::lock_connection,
    endpoints::{self, format_endpoint},
};

/// A route handler for creating a new budget.
///
/// Responds with `201 Created` and the new budget, or `409 Conflict` if a
/// budget already exists for the category and period.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    WithRejection(Json(builder), _): WithRejection<Json<BudgetBuilder>, Error>,
) -> Result<Response, Error> {
    let builder = builder.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let budget = create_budget(builder, &connection)?;
    let location = format_endpoint(endpoints::BUDGET, budget.id);
    let headers = [(LOCATION, location)];

    Ok((StatusCode::CREATED, headers, Json(budget)).into_response())
}

/// A route handler for listing all budgets ordered by category.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_budgets(&connection).map(Json)
}

/// A route handler for getting a budget by its database ID.
pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    WithRejection(Path(budget_id), _): WithRejection<Path<BudgetId>, Error>,
) -> Result<Json<Budget>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budget(budget_id, &connection).map(Json)
}

/// A route handler for updating some or all of the fields of a budget.
pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    WithRejection(Path(budget_id), _): WithRejection<Path<BudgetId>, Error>,
    WithRejection(Json(patch), _): WithRejection<Json<BudgetPatch>, Error>,
) -> Result<Json<Budget>, Error> {
    let patch = patch.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    update_budget(budget_id, patch, &connection).map(Json)
}

/// A route handler for deleting a budget, responds with a JSON message.
pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    WithRejection(Path(budget_id), _): WithRejection<Path<BudgetId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match delete_budget(budget_id, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(json!({ "message": "Budget deleted successfully" }))),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        budget::{Budget, Period},
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
    };

    async fn create_test_budget(server: &TestServer, category: &str, period: &str) -> Budget {
        let response = server
            .post(endpoints::BUDGETS)
            .json(&json!({ "category": category, "amount": 200.0, "period": period }))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<Budget>()
    }

    #[tokio::test]
    async fn create_budget() {
        let server = get_test_server();

        let response = server
            .post(endpoints::BUDGETS)
            .json(&json!({
                "category": "Food",
                "amount": 200.0,
                "period": "monthly",
                "startDate": "2024-07-01",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let budget = response.json::<Budget>();
        assert_eq!(budget.category, "Food");
        assert_eq!(budget.amount, 200.0);
        assert_eq!(budget.period, Period::Monthly);
        assert_eq!(budget.end_date, None);
        assert_eq!(
            response.header("location"),
            format_endpoint(endpoints::BUDGET, budget.id)
        );
    }

    #[tokio::test]
    async fn create_duplicate_budget_returns_conflict() {
        let server = get_test_server();
        create_test_budget(&server, "Food", "monthly").await;

        let response = server
            .post(endpoints::BUDGETS)
            .json(&json!({ "category": "Food", "amount": 300.0, "period": "monthly" }))
            .await;

        response.assert_status(StatusCode::CONFLICT);
        assert!(response.json::<Value>()["message"].is_string());
    }

    #[tokio::test]
    async fn create_fails_on_invalid_period() {
        let server = get_test_server();

        server
            .post(endpoints::BUDGETS)
            .json(&json!({ "category": "Food", "amount": 300.0, "period": "daily" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_fails_on_negative_amount() {
        let server = get_test_server();

        server
            .post(endpoints::BUDGETS)
            .json(&json!({ "category": "Food", "amount": -1, "period": "monthly" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_fails_on_amount_above_maximum() {
        let server = get_test_server();

        server
            .post(endpoints::BUDGETS)
            .json(&json!({ "category": "Food", "amount": 1e13, "period": "monthly" }))
            .await
            .assert_status_bad_request();

        let response = server.get(endpoints::BUDGETS).await;
        assert_eq!(response.json::<Value>(), json!([]));
    }

    #[tokio::test]
    async fn list_budgets() {
        let server = get_test_server();
        let transport = create_test_budget(&server, "Transport", "monthly").await;
        let food = create_test_budget(&server, "Food", "weekly").await;

        let response = server.get(endpoints::BUDGETS).await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Budget>>(), vec![food, transport]);
    }

    #[tokio::test]
    async fn get_budget() {
        let server = get_test_server();
        let budget = create_test_budget(&server, "Food", "monthly").await;

        let response = server
            .get(&format_endpoint(endpoints::BUDGET, budget.id))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Budget>(), budget);
    }

    #[tokio::test]
    async fn get_missing_budget_returns_not_found() {
        let server = get_test_server();

        server
            .get(&format_endpoint(endpoints::BUDGET, 1337))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn update_budget() {
        let server = get_test_server();
        let budget = create_test_budget(&server, "Food", "monthly").await;

        let response = server
            .put(&format_endpoint(endpoints::BUDGET, budget.id))
            .json(&json!({ "amount": 250.0, "period": "quarterly" }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Budget>();
        assert_eq!(updated.amount, 250.0);
        assert_eq!(updated.period, Period::Quarterly);
        assert_eq!(updated.category, budget.category);
    }

    #[tokio::test]
    async fn update_into_duplicate_returns_conflict() {
        let server = get_test_server();
        create_test_budget(&server, "Food", "monthly").await;
        let other = create_test_budget(&server, "Dining", "monthly").await;

        server
            .put(&format_endpoint(endpoints::BUDGET, other.id))
            .json(&json!({ "category": "Food" }))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn update_missing_budget_returns_not_found() {
        let server = get_test_server();

        server
            .put(&format_endpoint(endpoints::BUDGET, 1337))
            .json(&json!({ "amount": 250.0 }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_budget() {
        let server = get_test_server();
        let budget = create_test_budget(&server, "Food", "monthly").await;
        let path = format_endpoint(endpoints::BUDGET, budget.id);

        let response = server.delete(&path).await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>(),
            json!({ "message": "Budget deleted successfully" })
        );
        server.get(&path).await.assert_status_not_found();
        server.delete(&path).await.assert_status_not_found();
    }
}
