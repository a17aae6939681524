//! HTTP surface of the gateway.
//!
//! Routes:
//! - `GET  /health` — liveness, no authentication
//! - `POST /test`   — credential verification
//! - `POST /sync`   — incremental inbox sync
//! - `POST /send`   — outbound delivery with failover
//!
//! All POST routes require the shared-secret `x-api-key` header, compared
//! in constant time. Bodies are JSON and size-limited.

mod auth;
mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::providers::email::{MailTransport, MailboxConnector};

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared, read-only state injected into every handler.
///
/// Holds the startup-scoped API key and the protocol providers. All
/// per-request state (credentials, sessions, cursors) lives in the request
/// itself.
pub struct ServerState {
    /// Shared secret required on mutating routes.
    pub api_key: String,
    /// Inbound session factory.
    pub connector: Arc<dyn MailboxConnector>,
    /// Outbound delivery transport.
    pub transport: Arc<dyn MailTransport>,
}

/// Builds the gateway router.
pub fn router(state: Arc<ServerState>) -> Router {
    let authenticated = Router::new()
        .route("/test", post(handlers::test))
        .route("/sync", post(handlers::sync))
        .route("/send", post(handlers::send))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(authenticated)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON error payload shared by every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    ok: bool,
    error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// Failures surfaced by the request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Required request fields are missing or malformed; the core is
    /// never invoked.
    Validation(String),
    /// The mailbox provider failed mid-operation.
    Protocol(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Protocol(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}
