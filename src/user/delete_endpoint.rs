//! Defines the endpoint for deleting a user.

use axum::{Json, extract::State};

use crate::{
    Error,
    app_state::DbState,
    db::with_session,
    extract::AppPath,
    response::Message,
    user::{UserID, delete_user},
};

/// A route handler for deleting a user.
///
/// Users that still have transactions are not deleted.
///
/// # Errors
/// Responds with 404 if the user does not exist and 409 if transactions still
/// refer to the user.
pub async fn delete_user_endpoint(
    State(state): State<DbState>,
    AppPath(user_id): AppPath<UserID>,
) -> Result<Json<Message>, Error> {
    with_session(&state.db_connection, |connection| {
        delete_user(user_id, connection)
    })?;

    tracing::info!("Deleted user {user_id}");

    Ok(Json(Message::new(format!(
        "User {user_id} deleted successfully"
    ))))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::delete};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        AppState, NewUser, UserName,
        endpoints::{self, format_endpoint},
        response::Message,
        user::{User, create_user, get_users},
    };

    use super::delete_user_endpoint;

    fn get_test_state_with_user() -> (AppState, User) {
        let state = AppState::new(Connection::open_in_memory().unwrap())
            .expect("Could not initialize database");
        let user = create_user(
            NewUser {
                name: UserName::new_unchecked("Alice".to_owned()),
                email: "alice@example.com".parse().unwrap(),
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        (state, user)
    }

    fn get_test_server(state: AppState) -> TestServer {
        let app = Router::new()
            .route(endpoints::USER, delete(delete_user_endpoint))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn delete_user_succeeds() {
        let (state, user) = get_test_state_with_user();
        let server = get_test_server(state.clone());

        let response = server
            .delete(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<Message>().message,
            format!("User {} deleted successfully", user.id)
        );
        assert!(
            get_users(&state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_user_fails_on_missing_user() {
        let (state, _) = get_test_state_with_user();
        let server = get_test_server(state);

        let response = server.delete(&format_endpoint(endpoints::USER, 999)).await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<Value>(),
            json!({ "error": "User with ID 999 not found" })
        );
    }

    #[tokio::test]
    async fn delete_user_fails_when_user_has_transactions() {
        let (state, user) = get_test_state_with_user();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO transactions (user_id, amount, category, date) \
                 VALUES (?1, 100, 'rent', '2024-01-01')",
                (user.id.as_i64(),),
            )
            .unwrap();
        let server = get_test_server(state.clone());

        server
            .delete(&format_endpoint(endpoints::USER, user.id.as_i64()))
            .await
            .assert_status(StatusCode::CONFLICT);

        assert_eq!(
            get_users(&state.db_connection.lock().unwrap()).unwrap(),
            vec![user]
        );
    }

    #[tokio::test]
    async fn delete_user_fails_on_non_integer_id() {
        let (state, _) = get_test_state_with_user();
        let server = get_test_server(state);

        let response = server.delete("/users/abc").await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.json::<Value>()["error"].is_string());
    }
}
