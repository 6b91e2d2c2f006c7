//! Defines the endpoint for creating a transaction.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::DbState,
    db::with_session,
    extract::AppJson,
    transaction::{CreateTransactionRequest, NewTransaction, create_transaction},
};

/// The response body for a newly created transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionAdded {
    /// A human readable confirmation.
    pub message: String,
    /// The fields submitted by the client.
    pub data: CreateTransactionRequest,
}

/// A route handler for creating a new transaction, responds with the submitted fields.
///
/// # Errors
/// Responds with 422 if the request body is malformed. Any failure to store
/// the transaction, including a `user_id` that does not refer to a user,
/// responds with 500.
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    AppJson(request): AppJson<CreateTransactionRequest>,
) -> Result<Json<TransactionAdded>, Error> {
    let new_transaction = NewTransaction::try_from(&request)?;

    let transaction = with_session(&state.db_connection, |connection| {
        create_transaction(new_transaction, connection)
    })?;

    tracing::info!(
        "Created transaction {} for user {}",
        transaction.id,
        transaction.user_id
    );

    Ok(Json(TransactionAdded {
        message: "Transaction added successfully".to_owned(),
        data: request,
    }))
}
