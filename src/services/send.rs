//! Outbound delivery with host failover.
//!
//! One message, at most two attempts: the primary host first, then the
//! fixed secondary on any failure. The whole send is retried — never
//! resumed — and the content is identical between attempts; only the
//! destination host differs. A failure on the secondary is final.

use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::domain::{Credentials, OutboundMessage, SendOutcome};
use crate::providers::email::{MailTransport, Result};

/// Delivers one outbound message per call.
pub struct SendEngine {
    transport: Arc<dyn MailTransport>,
}

impl SendEngine {
    /// Creates a send engine over the given transport.
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Delivers the message, failing over to the secondary host once.
    pub async fn send(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
        message: &OutboundMessage,
    ) -> Result<SendOutcome> {
        let primary = config.primary_smtp();
        match self.transport.send(&primary, credentials, message).await {
            Ok(message_id) => Ok(SendOutcome {
                message_id,
                used_host: primary.host,
            }),
            Err(primary_error) => {
                let fallback = config.fallback_smtp();
                tracing::warn!(
                    host = %primary.host,
                    error = %primary_error,
                    "primary SMTP send failed, retrying via secondary"
                );
                let message_id = self.transport.send(&fallback, credentials, message).await?;
                Ok(SendOutcome {
                    message_id,
                    used_host: fallback.host,
                })
            }
        }
    }
}
