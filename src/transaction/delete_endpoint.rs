//! Defines the endpoint for deleting a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{TransactionState, delete_transaction},
};

/// A route handler for deleting a transaction, responds with a JSON message.
///
/// Responds with `404 Not Found` if there is no transaction with the ID.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    match delete_transaction(transaction_id, &connection)? {
        0 => Err(Error::NotFound),
        _ => Ok(Json(json!({ "message": "Transaction deleted successfully" }))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        test_utils::get_test_server,
        transaction::Transaction,
    };

    #[tokio::test]
    async fn delete_transaction() {
        let server = get_test_server();
        let transaction = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "type": "expense",
                "amount": 10.0,
                "category": "Food",
                "date": "2024-07-01",
            }))
            .await
            .json::<Transaction>();
        let path = format_endpoint(endpoints::TRANSACTION, transaction.id);

        server.delete(&path).await.assert_status_ok();

        server.get(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_missing_transaction_returns_not_found() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, 1337))
            .await
            .assert_status_not_found();
    }
}
