//! Capability traits consumed by the gateway services.
//!
//! These traits are the seam between the decision logic (cursor handling,
//! batching, normalization, failover ordering) and the protocol libraries.
//! Implementations return fixed-shape values with explicit optional fields
//! so the services operate on a known shape.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::SmtpHost;
use crate::domain::{Credentials, OutboundMessage};

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while talking to the mail provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Login or credential failure.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Network or connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// The server rejected or mangled a protocol exchange.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A fetched message could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// The request itself is malformed (bad address, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Criteria for selecting candidate message UIDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// All messages with a UID strictly greater than the given cursor.
    UidGreaterThan(u32),
    /// All messages received at or after the given instant.
    Since(DateTime<Utc>),
}

/// Envelope metadata reported by the server alongside a fetch.
///
/// Used as the fallback source for subject and sender when the parsed
/// message lacks them.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeMeta {
    /// Envelope subject, when the server reported one.
    pub subject: Option<String>,
    /// First envelope sender address, when the server reported one.
    pub from_email: Option<String>,
}

/// One message as fetched from the server: metadata plus raw source,
/// retrieved as a single unit.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Server-assigned UID.
    pub uid: u32,
    /// Server-side flags (e.g. `\Seen`).
    pub flags: Vec<String>,
    /// Envelope metadata.
    pub envelope: EnvelopeMeta,
    /// Raw RFC 5322 message bytes.
    pub source: Vec<u8>,
}

/// An authenticated inbound session with the mailbox.
///
/// Sessions are request-scoped: the service that opens one is responsible
/// for calling [`logout`](MailboxSession::logout) on every exit path.
/// `unlock` and `logout` are best-effort; their own failures are
/// suppressed, never surfaced.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxSession: Send {
    /// Acquires the exclusive inbox handle. Must be called before
    /// `search` or `fetch`.
    async fn lock_inbox(&mut self) -> Result<()>;

    /// Releases the inbox handle. Best-effort.
    async fn unlock(&mut self);

    /// Returns matching UIDs in ascending order.
    async fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<u32>>;

    /// Fetches one message (flags, envelope, and raw source as a single
    /// unit). Returns `None` when the UID no longer exists.
    ///
    /// One message per call keeps peak memory bounded by a single
    /// in-flight message rather than the whole batch.
    async fn fetch(&mut self, uid: u32) -> Result<Option<RawMessage>>;

    /// Ends the session. Best-effort.
    async fn logout(&mut self);
}

/// Opens authenticated inbound sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxConnector: Send + Sync {
    /// Connects and authenticates against the configured inbound host.
    async fn connect(
        &self,
        config: &crate::config::ConnectionConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn MailboxSession>>;
}

/// Outbound delivery transport.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Connects and authenticates against one delivery host without
    /// sending a message.
    async fn verify(&self, host: &SmtpHost, credentials: &Credentials) -> Result<()>;

    /// Delivers one message via one host. Returns the Message-ID assigned
    /// to the outbound message.
    async fn send(
        &self,
        host: &SmtpHost,
        credentials: &Credentials,
        message: &OutboundMessage,
    ) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let auth = ProviderError::Authentication("LOGIN rejected".to_string());
        assert_eq!(auth.to_string(), "authentication failed: LOGIN rejected");

        let parse = ProviderError::Parse("empty source".to_string());
        assert!(parse.to_string().contains("parse error"));
    }

    #[test]
    fn search_criteria_equality() {
        assert_eq!(
            SearchCriteria::UidGreaterThan(40),
            SearchCriteria::UidGreaterThan(40)
        );
        assert_ne!(
            SearchCriteria::UidGreaterThan(40),
            SearchCriteria::UidGreaterThan(41)
        );
    }
}
