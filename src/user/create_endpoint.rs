//! Defines the endpoint for creating a user.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::DbState,
    db::with_session,
    extract::AppJson,
    user::{CreateUserRequest, NewUser, User, create_user},
};

/// The response body for a newly created user.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserCreated {
    /// A human readable confirmation.
    pub message: String,
    /// The user as stored in the database, including its generated ID.
    pub data: User,
}

/// A route handler for creating a new user, responds with the created user.
///
/// The request is validated before the database is touched.
///
/// # Errors
/// Responds with 422 if the name is empty or the email is malformed, and 400
/// if the email is already registered.
pub async fn create_user_endpoint(
    State(state): State<DbState>,
    AppJson(request): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreated>), Error> {
    let new_user = NewUser::try_from(request)?;

    let user = with_session(&state.db_connection, |connection| {
        create_user(new_user, connection)
    })?;

    tracing::info!("Created user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully".to_owned(),
            data: user,
        }),
    ))
}
