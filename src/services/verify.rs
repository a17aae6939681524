//! Credential verification.
//!
//! Confirms that the caller's credentials authenticate over both
//! protocols. The two checks are independent: one failing never
//! suppresses the other's result, and both always run to completion.

use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::domain::Credentials;
use crate::providers::email::{MailTransport, MailboxConnector, ProviderError};

/// Outcome of one protocol check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Whether authentication succeeded.
    pub ok: bool,
    /// The failure message, when it did not.
    pub error: Option<String>,
}

impl CheckResult {
    fn passed() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    fn failed(error: ProviderError) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
        }
    }
}

/// Combined outcome of a verification call.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    /// Inbound (IMAP) check result.
    pub imap: CheckResult,
    /// Outbound (SMTP) check result.
    pub smtp: CheckResult,
    /// The delivery host the outbound check ended on: the one that
    /// succeeded, or the secondary when both attempts failed.
    pub smtp_host: String,
}

impl VerifyOutcome {
    /// True only when both protocols authenticated.
    pub fn ok(&self) -> bool {
        self.imap.ok && self.smtp.ok
    }
}

/// Verifies mailbox credentials over both protocols.
pub struct VerifyEngine {
    connector: Arc<dyn MailboxConnector>,
    transport: Arc<dyn MailTransport>,
}

impl VerifyEngine {
    /// Creates a verify engine over the given providers.
    pub fn new(connector: Arc<dyn MailboxConnector>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            connector,
            transport,
        }
    }

    /// Runs both checks and reports both results.
    pub async fn verify(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> VerifyOutcome {
        let imap = self.check_mailbox(config, credentials).await;
        let (smtp, smtp_host) = self.check_transport(config, credentials).await;

        tracing::info!(
            imap_ok = imap.ok,
            smtp_ok = smtp.ok,
            smtp_host = %smtp_host,
            "credential verification complete"
        );

        VerifyOutcome {
            imap,
            smtp,
            smtp_host,
        }
    }

    /// Opens an inbound session and acquires/releases the inbox lock.
    /// That alone confirms protocol-level authentication; no data is
    /// read. The session is logged out on every exit path.
    async fn check_mailbox(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> CheckResult {
        match self.connector.connect(config, credentials).await {
            Ok(mut session) => {
                let locked = session.lock_inbox().await;
                if locked.is_ok() {
                    session.unlock().await;
                }
                session.logout().await;
                match locked {
                    Ok(()) => CheckResult::passed(),
                    Err(e) => CheckResult::failed(e),
                }
            }
            Err(e) => CheckResult::failed(e),
        }
    }

    /// Attempts the outbound handshake against the primary host, then
    /// once more against the fixed secondary on failure.
    async fn check_transport(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> (CheckResult, String) {
        let primary = config.primary_smtp();
        match self.transport.verify(&primary, credentials).await {
            Ok(()) => (CheckResult::passed(), primary.host),
            Err(primary_error) => {
                let fallback = config.fallback_smtp();
                tracing::warn!(
                    host = %primary.host,
                    error = %primary_error,
                    "primary SMTP verification failed, trying secondary"
                );
                match self.transport.verify(&fallback, credentials).await {
                    Ok(()) => (CheckResult::passed(), fallback.host),
                    Err(e) => (CheckResult::failed(e), fallback.host),
                }
            }
        }
    }
}
