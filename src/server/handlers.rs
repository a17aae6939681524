//! Request handlers and wire types.
//!
//! Each handler validates the body, resolves the per-request connection
//! config, runs exactly one engine, and maps the outcome to the JSON
//! shapes the backend expects. Field names are camelCase on the wire.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{ApiError, ServerState};
use crate::config::{AdvancedOverrides, ConnectionConfig};
use crate::domain::{Credentials, NormalizedMessage, OutboundMessage};
use crate::services::{
    ParseFailurePolicy, SendEngine, SyncEngine, SyncRequest, VerifyEngine, VerifyOutcome,
};

/// Default time window for a first sync, in days.
const DEFAULT_BACKFILL_DAYS: u32 = 14;
/// Default batch bound.
const DEFAULT_LIMIT: usize = 50;

// ── Wire types ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    ok: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    advanced: Option<AdvancedOverrides>,
}

#[derive(Debug, Serialize)]
pub struct CheckBody {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpCheckBody {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    smtp_host: String,
}

#[derive(Debug, Serialize)]
pub struct TestResponse {
    ok: bool,
    imap: CheckBody,
    smtp: SmtpCheckBody,
}

impl From<VerifyOutcome> for TestResponse {
    fn from(outcome: VerifyOutcome) -> Self {
        Self {
            ok: outcome.ok(),
            imap: CheckBody {
                ok: outcome.imap.ok,
                error: outcome.imap.error,
            },
            smtp: SmtpCheckBody {
                ok: outcome.smtp.ok,
                error: outcome.smtp.error,
                smtp_host: outcome.smtp_host,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    cursor: Option<u32>,
    #[serde(default)]
    backfill_days: Option<u32>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    on_parse_error: Option<ParseFailurePolicy>,
    #[serde(default)]
    advanced: Option<AdvancedOverrides>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    ok: bool,
    cursor: u32,
    messages: Vec<NormalizedMessage>,
}

/// Recipient lists arrive either as a single comma-separated string or as
/// an array of addresses; both map to the same shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::One(value) => value
                .split(',')
                .map(|address| address.trim().to_string())
                .filter(|address| !address.is_empty())
                .collect(),
            Recipients::Many(list) => list,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBody {
    #[serde(default)]
    from_email: Option<String>,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    to: Option<Recipients>,
    #[serde(default)]
    cc: Option<Recipients>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    body_text: Option<String>,
    #[serde(default)]
    body_html: Option<String>,
    #[serde(default)]
    headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    advanced: Option<AdvancedOverrides>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    ok: bool,
    message_id: String,
    used_host: String,
}

// ── Handlers ────────────────────────────────────────────────────────────

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

pub async fn test(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<TestBody>,
) -> Result<Json<TestResponse>, ApiError> {
    let credentials = require_credentials(body.email, body.password)?;
    let config = ConnectionConfig::resolve(body.advanced.as_ref());

    let engine = VerifyEngine::new(
        Arc::clone(&state.connector),
        Arc::clone(&state.transport),
    );
    let outcome = engine.verify(&config, &credentials).await;

    // Protocol failures are part of the payload here: the caller always
    // gets both sub-results.
    Ok(Json(TestResponse::from(outcome)))
}

pub async fn sync(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<SyncBody>,
) -> Result<Json<SyncResponse>, ApiError> {
    let credentials = require_credentials(body.email, body.password)?;
    let config = ConnectionConfig::resolve(body.advanced.as_ref());

    let request = SyncRequest {
        credentials,
        cursor: body.cursor,
        backfill_days: body.backfill_days.unwrap_or(DEFAULT_BACKFILL_DAYS),
        limit: body.limit.unwrap_or(DEFAULT_LIMIT),
        on_parse_error: body.on_parse_error.unwrap_or_default(),
    };

    let engine = SyncEngine::new(Arc::clone(&state.connector));
    let outcome = engine
        .sync(&config, &request)
        .await
        .map_err(|e| ApiError::Protocol(e.to_string()))?;

    Ok(Json(SyncResponse {
        ok: true,
        cursor: outcome.cursor,
        messages: outcome.messages,
    }))
}

pub async fn send(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<SendBody>,
) -> Result<Json<SendResponse>, ApiError> {
    let (Some(from_email), Some(password), Some(to), Some(subject)) =
        (body.from_email, body.password, body.to, body.subject)
    else {
        return Err(ApiError::Validation(
            "fromEmail, password, to and subject are required".to_string(),
        ));
    };

    let to = to.into_vec();
    if to.is_empty() {
        return Err(ApiError::Validation("to must not be empty".to_string()));
    }

    let credentials = Credentials::new(from_email.clone(), password);
    let config = ConnectionConfig::resolve(body.advanced.as_ref());

    let message = OutboundMessage {
        from_email,
        to,
        cc: body.cc.map(Recipients::into_vec).unwrap_or_default(),
        subject,
        body_text: body.body_text,
        body_html: body.body_html,
        headers: body.headers.unwrap_or_default(),
    };

    let engine = SendEngine::new(Arc::clone(&state.transport));
    let outcome = engine
        .send(&config, &credentials, &message)
        .await
        .map_err(|e| ApiError::Protocol(e.to_string()))?;

    Ok(Json(SendResponse {
        ok: true,
        message_id: outcome.message_id,
        used_host: outcome.used_host,
    }))
}

fn require_credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<Credentials, ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok(Credentials::new(email, password))
        }
        _ => Err(ApiError::Validation(
            "email and password are required".to_string(),
        )),
    }
}
