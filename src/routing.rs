//! Application router configuration.

use std::any::Any;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get},
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{
    AppState, endpoints,
    error::error_response,
    logging::logging_middleware,
    response::Message,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_transactions_endpoint,
    },
    user::{create_user_endpoint, delete_user_endpoint, list_users_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_root))
        .route(
            endpoints::USERS,
            get(list_users_endpoint).post(create_user_endpoint),
        )
        .route(endpoints::USER, delete(delete_user_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(list_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .layer(middleware::from_fn(logging_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// The root path '/' greets the client.
async fn get_root() -> Json<Message> {
    Json(Message::new("Welcome to the Personal Finance Manager"))
}

/// Turn a panic in a route handler into the same error body as every other failure.
fn handle_panic(error: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = error.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = error.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic"
    };

    tracing::error!("Route handler panicked: {detail}");

    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Internal server error: {detail}"),
    )
}


#[cfg(test)]
mod panic_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use super::handle_panic;

    #[tokio::test]
    async fn panic_becomes_internal_server_error() {
        let response = handle_panic(Box::new("something broke"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({ "error": "Internal server error: something broke" })
        );
    }
}
