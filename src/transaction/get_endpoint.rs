//! Defines the endpoints for reading transactions.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{Transaction, TransactionState, get_all_transactions, get_transaction},
};

/// A route handler for listing all transactions, most recent first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_all_transactions(&connection).map(Json)
}

/// A route handler for getting a transaction by its database ID.
///
/// Responds with `404 Not Found` if there is no transaction with the ID.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, &connection).map(Json)
}
