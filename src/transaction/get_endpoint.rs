//! Defines the endpoint for getting a single transaction.

use axum::{Json, extract::State};

use crate::{
    Error,
    app_state::DbState,
    database_id::TransactionId,
    db::with_session,
    extract::AppPath,
    transaction::{Transaction, get_transaction},
};

/// A route handler for getting a transaction by its database ID.
///
/// # Errors
/// Responds with 404 if the requested transaction does not exist.
pub async fn get_transaction_endpoint(
    State(state): State<DbState>,
    AppPath(transaction_id): AppPath<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let transaction = with_session(&state.db_connection, |connection| {
        get_transaction(transaction_id, connection)
    })?;

    Ok(Json(transaction))
}
