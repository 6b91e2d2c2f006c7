//! Finance Manager is a backend for tracking personal finances.
//!
//! This library provides a JSON REST API for managing users and the
//! transactions recorded against them, backed by a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod database_id;
mod db;
pub mod endpoints;
mod error;
mod extract;
mod logging;
mod response;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::{initialize as initialize_db, with_session};
pub use error::Error;
pub use logging::{LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{NewTransaction, Transaction, create_transaction};
pub use user::{CreateUserRequest, NewUser, User, UserID, UserName, create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
