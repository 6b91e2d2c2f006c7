//! Defines the endpoint for listing users.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::DbState,
    db::with_session,
    user::{User, get_users},
};

/// The response body for the list of users.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserList {
    /// Every user in the database.
    pub users: Vec<User>,
}

/// A route handler for listing every user.
pub async fn list_users_endpoint(State(state): State<DbState>) -> Result<Json<UserList>, Error> {
    let users = with_session(&state.db_connection, get_users)?;

    Ok(Json(UserList { users }))
}
