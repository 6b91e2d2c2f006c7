//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde_json::json;

use crate::{TransactionId, UserID};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A field in the request body failed validation.
    ///
    /// The client should fix the named field and try again.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The name of the offending field in the request body.
        field: &'static str,
        /// A description of what is wrong with the field.
        reason: String,
    },

    /// The request could not be parsed, e.g. the body is not JSON, a field
    /// has the wrong type or a path parameter is not an integer.
    #[error("{0}")]
    InvalidRequest(String),

    /// A user with the same email address already exists.
    #[error("the email {0} is already registered")]
    DuplicateEmail(String),

    /// There is no user with the given ID.
    #[error("User with ID {0} not found")]
    UserNotFound(UserID),

    /// There is no transaction with the given ID.
    #[error("Transaction with ID {0} not found")]
    TransactionNotFound(TransactionId),

    /// The user cannot be deleted while transactions still refer to them.
    #[error("User with ID {0} still has transactions and cannot be deleted")]
    UserHasTransactions(UserID),

    /// The amount does not fit into a decimal with ten digits, two of which
    /// are after the decimal point.
    #[error("amount {0} is out of range for DECIMAL(10, 2)")]
    AmountOutOfRange(Decimal),

    /// An unhandled/unexpected SQL error.
    #[error("{0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::Validation { .. } | Error::InvalidRequest(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            Error::DuplicateEmail(_) => (
                StatusCode::BAD_REQUEST,
                "Email already registered".to_owned(),
            ),
            Error::UserNotFound(_) | Error::TransactionNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Error::UserHasTransactions(_) => (StatusCode::CONFLICT, self.to_string()),
            Error::SqlError(_) | Error::AmountOutOfRange(_) => {
                tracing::error!("A database error occurred: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {self}"),
                )
            }
            Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {self}"),
                )
            }
        };

        error_response(status, &message)
    }
}

/// Build a response with `status` and the JSON body `{"error": message}`.
///
/// Every error the API returns uses this body shape.
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use rust_decimal::Decimal;
    use serde_json::{Value, json};

    use crate::{Error, UserID};

    async fn into_status_and_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");
        let body = serde_json::from_slice(&bytes).expect("Response body is not JSON");

        (status, body)
    }

    #[tokio::test]
    async fn duplicate_email_is_bad_request() {
        let (status, body) =
            into_status_and_body(Error::DuplicateEmail("foo@bar.baz".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Email already registered" }));
    }

    #[tokio::test]
    async fn not_found_names_the_id() {
        let (status, body) = into_status_and_body(Error::TransactionNotFound(42)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Transaction with ID 42 not found" }));

        let (status, body) = into_status_and_body(Error::UserNotFound(UserID::new(7))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "User with ID 7 not found" }));
    }

    #[tokio::test]
    async fn validation_error_is_unprocessable() {
        let (status, body) = into_status_and_body(Error::Validation {
            field: "name",
            reason: "must contain at least one character".to_owned(),
        })
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body,
            json!({ "error": "invalid name: must contain at least one character" })
        );
    }

    #[tokio::test]
    async fn sql_error_is_server_error_with_message() {
        let (status, body) =
            into_status_and_body(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"].as_str().expect("error should be a string");
        assert!(
            message.starts_with("Database error: "),
            "'{message}' does not start with 'Database error: '"
        );
    }

    #[tokio::test]
    async fn amount_out_of_range_is_database_error() {
        let (status, body) =
            into_status_and_body(Error::AmountOutOfRange(Decimal::new(100_000_000_000, 2)))
                .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "Database error: amount 1000000000.00 is out of range for DECIMAL(10, 2)" })
        );
    }

    #[tokio::test]
    async fn lock_error_is_internal_server_error() {
        let (status, body) = into_status_and_body(Error::DatabaseLockError).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({ "error": "Internal server error: could not acquire the database lock" })
        );
    }
}
