//! Outbound delivery over SMTP.
//!
//! A fresh transport is built for every call (no pooling; each request
//! pays the full connect/auth cost). Verification performs the connection
//! and handshake without submitting a message.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

use super::traits::{MailTransport, ProviderError, Result};
use crate::config::SmtpHost;
use crate::domain::{Credentials, OutboundMessage};

/// Sends and verifies over SMTP using `lettre`.
#[derive(Debug, Clone, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    fn build_transport(
        host: &SmtpHost,
        credentials: &Credentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let smtp_credentials =
            SmtpCredentials::new(credentials.email.clone(), credentials.password.clone());

        let builder = if host.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host.host)
        }
        .map_err(|e| ProviderError::Connection(format!("SMTP relay error: {e}")))?;

        Ok(builder
            .credentials(smtp_credentials)
            .port(host.port)
            .build())
    }

    /// Builds the RFC 5322 message. The threading headers from the
    /// caller's pass-through map are applied via the builder; other
    /// custom header names are not representable with this transport and
    /// are skipped.
    fn build_message(outbound: &OutboundMessage, message_id: &str) -> Result<Message> {
        let from_mailbox: Mailbox = outbound.from_email.parse().map_err(|e| {
            ProviderError::InvalidRequest(format!("invalid from address: {e}"))
        })?;

        let mut builder = Message::builder()
            .from(from_mailbox)
            .subject(&outbound.subject)
            .message_id(Some(message_id.to_string()));

        for address in &outbound.to {
            let mailbox: Mailbox = address.parse().map_err(|e| {
                ProviderError::InvalidRequest(format!("invalid to address: {e}"))
            })?;
            builder = builder.to(mailbox);
        }

        for address in &outbound.cc {
            let mailbox: Mailbox = address.parse().map_err(|e| {
                ProviderError::InvalidRequest(format!("invalid cc address: {e}"))
            })?;
            builder = builder.cc(mailbox);
        }

        for (name, value) in &outbound.headers {
            if name.eq_ignore_ascii_case("in-reply-to") {
                builder = builder.in_reply_to(value.clone());
            } else if name.eq_ignore_ascii_case("references") {
                builder = builder.references(value.clone());
            } else {
                tracing::debug!(header = %name, "skipping unsupported custom header");
            }
        }

        let message = match (&outbound.body_text, &outbound.body_html) {
            (Some(text), Some(html)) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(text.clone()))
                    .singlepart(SinglePart::html(html.clone())),
            ),
            (Some(text), None) => builder.body(text.clone()),
            (None, Some(html)) => builder.singlepart(SinglePart::html(html.clone())),
            (None, None) => builder.body(String::new()),
        };

        message.map_err(|e| ProviderError::InvalidRequest(format!("failed to build message: {e}")))
    }

    /// Generates the Message-ID reported back to the caller, scoped to the
    /// sender's domain.
    fn generate_message_id(from_email: &str) -> String {
        let domain = from_email
            .split_once('@')
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
            .unwrap_or("localhost");
        format!("<{}@{}>", Uuid::new_v4(), domain)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn verify(&self, host: &SmtpHost, credentials: &Credentials) -> Result<()> {
        let mailer = Self::build_transport(host, credentials)?;
        match mailer.test_connection().await {
            Ok(true) => Ok(()),
            Ok(false) => Err(ProviderError::Connection(format!(
                "SMTP server {} rejected the connection",
                host.host
            ))),
            Err(e) => Err(ProviderError::Connection(format!(
                "SMTP verification failed: {e}"
            ))),
        }
    }

    async fn send(
        &self,
        host: &SmtpHost,
        credentials: &Credentials,
        message: &OutboundMessage,
    ) -> Result<String> {
        let message_id = Self::generate_message_id(&message.from_email);
        let rfc5322 = Self::build_message(message, &message_id)?;
        let mailer = Self::build_transport(host, credentials)?;

        mailer
            .send(rfc5322)
            .await
            .map_err(|e| ProviderError::Connection(format!("SMTP send failed: {e}")))?;

        tracing::info!(host = %host.host, message_id = %message_id, "message accepted for delivery");
        Ok(message_id)
    }
}
