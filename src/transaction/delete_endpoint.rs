//! Defines the endpoint for deleting a transaction.

use axum::{Json, extract::State};

use crate::{
    Error,
    app_state::DbState,
    database_id::TransactionId,
    db::with_session,
    extract::AppPath,
    response::Message,
    transaction::delete_transaction,
};

/// A route handler for deleting a transaction.
///
/// # Errors
/// Responds with 404 if the transaction does not exist, e.g. because it was
/// already deleted.
pub async fn delete_transaction_endpoint(
    State(state): State<DbState>,
    AppPath(transaction_id): AppPath<TransactionId>,
) -> Result<Json<Message>, Error> {
    with_session(&state.db_connection, |connection| {
        delete_transaction(transaction_id, connection)
    })?;

    tracing::info!("Deleted transaction {transaction_id}");

    Ok(Json(Message::new(format!(
        "Transaction {transaction_id} deleted successfully"
    ))))
}
