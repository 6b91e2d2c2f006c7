//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{StatusCode, request, response},
    middleware::Next,
    response::Response,
};

use crate::error::error_response;

/// The number of bytes of a request or response body that are logged at the
/// `info` level. Longer bodies are truncated, the full body is logged at the
/// `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body, in bytes, the middleware will read.
///
/// Matches axum's default body limit for extractors such as `Json`.
pub const REQUEST_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
///
/// Requests with a body larger than [REQUEST_BODY_LIMIT] bytes are rejected
/// with 413 Payload Too Large before reaching the route handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, REQUEST_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &format!(
                    "Request body could not be read within the limit of {REQUEST_BODY_LIMIT} bytes: {error}"
                ),
            );
        }
    };
    log_request(&parts, &body_bytes);

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Internal server error: {error}"),
            );
        }
    };
    log_response(&parts, &body_bytes);

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Shorten `body` to at most [LOG_BODY_LENGTH_LIMIT] bytes without splitting a character.
fn truncate_body(body: &str) -> &str {
    if body.len() <= LOG_BODY_LENGTH_LIMIT {
        return body;
    }

    let mut end = LOG_BODY_LENGTH_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &request::Parts, body: &Bytes) {
    let body = String::from_utf8_lossy(body);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nheaders: {:?}\nbody: {}...",
            parts.method,
            parts.uri,
            parts.headers,
            truncate_body(&body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nheaders: {:?}\nbody: {body:?}",
            parts.method,
            parts.uri,
            parts.headers
        );
    }
}

fn log_response(parts: &response::Parts, body: &Bytes) {
    let body = String::from_utf8_lossy(body);

    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {}\nheaders: {:?}\nbody: {}...",
            parts.status,
            parts.headers,
            truncate_body(&body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!(
            "Sending response: {}\nheaders: {:?}\nbody: {body:?}",
            parts.status,
            parts.headers
        );
    }
}
