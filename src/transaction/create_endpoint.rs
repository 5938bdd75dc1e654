//! Defines the endpoint for creating a transaction.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;

use crate::{
    Error,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    transaction::{TransactionBuilder, TransactionState, create_transaction},
};

/// A route handler for creating a new transaction.
///
/// Responds with `201 Created`, the new transaction as JSON and its URI in the
/// `Location` header.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    WithRejection(Json(builder), _): WithRejection<Json<TransactionBuilder>, Error>,
) -> Result<Response, Error> {
    let builder = builder.validate()?;

    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(builder, &connection)?;
    let location = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let headers = [(LOCATION, location)];

    Ok((StatusCode::CREATED, headers, Json(transaction)).into_response())
}
