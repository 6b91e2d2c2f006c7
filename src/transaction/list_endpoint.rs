//! Defines the endpoint for listing transactions.

use axum::{Json, extract::State};

use crate::{
    Error,
    app_state::DbState,
    db::with_session,
    transaction::{Transaction, get_transactions},
};

/// A route handler for listing every transaction as a JSON array.
pub async fn list_transactions_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let transactions = with_session(&state.db_connection, get_transactions)?;

    Ok(Json(transactions))
}
