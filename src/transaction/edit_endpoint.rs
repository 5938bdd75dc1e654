//! Defines the endpoint for updating a transaction.

use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    database_id::TransactionId,
    db::lock_connection,
    transaction::{Transaction, TransactionPatch, TransactionState, update_transaction},
};

/// A route handler for updating some or all of the fields of a transaction.
///
/// Fields missing from the body are left unchanged. Responds with the updated
/// transaction, or `404 Not Found` if there is no transaction with the ID.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    WithRejection(Path(transaction_id), _): WithRejection<Path<TransactionId>, Error>,
    WithRejection(Json(patch), _): WithRejection<Json<TransactionPatch>, Error>,
) -> Result<Json<Transaction>, Error> {
    let patch = patch.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, patch, &connection)
        .inspect_err(|error| {
            if *error != Error::NotFound {
                tracing::error!("Could not update transaction {transaction_id}: {error}");
            }
        })
        .map(Json)
}
