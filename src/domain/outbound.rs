//! Outbound message types.

use std::collections::BTreeMap;

use serde::Serialize;

/// One message to deliver.
///
/// The content is identical across failover attempts; only the destination
/// host changes between them.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    /// Sender address (also the SMTP login identity).
    pub from_email: String,
    /// Primary recipients.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body_text: Option<String>,
    /// HTML body.
    pub body_html: Option<String>,
    /// Caller-supplied headers, passed through to the delivery transport.
    pub headers: BTreeMap<String, String>,
}

/// Result of an accepted delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    /// Message-ID assigned to the outbound message.
    pub message_id: String,
    /// The host that accepted the message.
    pub used_host: String,
}
