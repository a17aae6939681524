//! Inbound mailbox access over IMAP.
//!
//! Opens one authenticated session per request (no pooling, no reuse) and
//! exposes it through the [`MailboxSession`] capability trait. Fetches
//! retrieve flags, envelope, and raw source as a single unit, one message
//! per call.

use std::sync::Arc;

use async_imap::types::{Fetch, Flag};
use async_trait::async_trait;
use futures::{AsyncRead, AsyncWrite, StreamExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use super::traits::{
    EnvelopeMeta, MailboxConnector, MailboxSession, ProviderError, RawMessage, Result,
    SearchCriteria,
};
use crate::config::ConnectionConfig;
use crate::domain::Credentials;

/// Fetch attributes retrieved for every message: identity, flags,
/// envelope, and the raw source, in one exchange. `BODY.PEEK` leaves the
/// `\Seen` flag untouched.
const FETCH_ITEMS: &str = "(UID FLAGS ENVELOPE BODY.PEEK[])";

/// Opens IMAP sessions against the resolved inbound host.
#[derive(Debug, Clone, Default)]
pub struct ImapConnector;

impl ImapConnector {
    /// Establishes a TLS connection with the futures compat wrapper
    /// required by `async-imap`.
    async fn connect_tls(host: &str, port: u16) -> Result<Compat<TlsStream<TcpStream>>> {
        let tcp_stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ProviderError::Connection(format!("TCP connect failed: {e}")))?;

        let config = ClientConfig::builder()
            .with_root_certificates(RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|e| ProviderError::Connection(format!("invalid server name: {e}")))?;

        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| ProviderError::Connection(format!("TLS handshake failed: {e}")))?;

        Ok(tls_stream.compat())
    }

    async fn login<S>(stream: S, credentials: &Credentials) -> Result<async_imap::Session<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + std::fmt::Debug + 'static,
    {
        let client = async_imap::Client::new(stream);
        client
            .login(&credentials.email, &credentials.password)
            .await
            .map_err(|e| ProviderError::Authentication(format!("IMAP login failed: {:?}", e.0)))
    }
}

#[async_trait]
impl MailboxConnector for ImapConnector {
    async fn connect(
        &self,
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> Result<Box<dyn MailboxSession>> {
        if config.imap_secure {
            let stream = Self::connect_tls(&config.imap_host, config.imap_port).await?;
            let session = Self::login(stream, credentials).await?;
            tracing::debug!(host = %config.imap_host, "IMAP session established");
            Ok(Box::new(ImapMailbox { session }))
        } else {
            // Plain TCP, for local test servers only.
            let tcp_stream =
                TcpStream::connect(format!("{}:{}", config.imap_host, config.imap_port))
                    .await
                    .map_err(|e| {
                        ProviderError::Connection(format!("TCP connect failed: {e}"))
                    })?;
            let session = Self::login(tcp_stream.compat(), credentials).await?;
            tracing::debug!(host = %config.imap_host, "IMAP session established (plaintext)");
            Ok(Box::new(ImapMailbox { session }))
        }
    }
}

/// One authenticated IMAP session.
struct ImapMailbox<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + std::fmt::Debug + 'static,
{
    session: async_imap::Session<S>,
}

#[async_trait]
impl<S> MailboxSession for ImapMailbox<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + std::fmt::Debug + 'static,
{
    async fn lock_inbox(&mut self) -> Result<()> {
        self.session
            .select("INBOX")
            .await
            .map_err(|e| ProviderError::Connection(format!("SELECT INBOX failed: {e}")))?;
        Ok(())
    }

    async fn unlock(&mut self) {
        // CLOSE releases the selected mailbox; its failure is irrelevant
        // because logout follows on every path.
        if let Err(e) = self.session.close().await {
            tracing::debug!(error = %e, "IMAP CLOSE failed");
        }
    }

    async fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<u32>> {
        let query = match criteria {
            SearchCriteria::UidGreaterThan(cursor) => {
                format!("UID {}:*", cursor.saturating_add(1))
            }
            SearchCriteria::Since(instant) => format!("SINCE {}", instant.format("%d-%b-%Y")),
        };

        let uids = self
            .session
            .uid_search(&query)
            .await
            .map_err(|e| ProviderError::Protocol(format!("UID SEARCH failed: {e}")))?;

        let mut uids: Vec<u32> = uids.into_iter().collect();
        if let SearchCriteria::UidGreaterThan(cursor) = criteria {
            // "n:*" always matches the newest message, even when its UID
            // is at or below n.
            uids.retain(|uid| *uid > *cursor);
        }
        uids.sort_unstable();
        Ok(uids)
    }

    async fn fetch(&mut self, uid: u32) -> Result<Option<RawMessage>> {
        let mut raw = None;
        {
            let mut fetches = self
                .session
                .uid_fetch(uid.to_string(), FETCH_ITEMS)
                .await
                .map_err(|e| ProviderError::Protocol(format!("UID FETCH failed: {e}")))?;

            while let Some(item) = fetches.next().await {
                let fetch =
                    item.map_err(|e| ProviderError::Protocol(format!("UID FETCH failed: {e}")))?;
                if raw.is_none() {
                    raw = to_raw_message(&fetch);
                }
            }
        }
        Ok(raw)
    }

    async fn logout(&mut self) {
        if let Err(e) = self.session.logout().await {
            tracing::debug!(error = %e, "IMAP LOGOUT failed");
        }
    }
}

fn to_raw_message(fetch: &Fetch) -> Option<RawMessage> {
    let uid = fetch.uid?;
    let source = fetch.body()?.to_vec();
    let flags = fetch.flags().map(|flag| flag_name(&flag)).collect();

    let envelope = fetch
        .envelope()
        .map(|envelope| EnvelopeMeta {
            subject: envelope
                .subject
                .as_ref()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string()),
            from_email: envelope
                .from
                .as_ref()
                .and_then(|addresses| addresses.first())
                .and_then(|address| match (address.mailbox.as_ref(), address.host.as_ref()) {
                    (Some(mailbox), Some(host)) => Some(format!(
                        "{}@{}",
                        String::from_utf8_lossy(mailbox),
                        String::from_utf8_lossy(host)
                    )),
                    (Some(mailbox), None) => {
                        Some(String::from_utf8_lossy(mailbox).to_string())
                    }
                    _ => None,
                }),
        })
        .unwrap_or_default();

    Some(RawMessage {
        uid,
        flags,
        envelope,
        source,
    })
}

fn flag_name(flag: &Flag<'_>) -> String {
    match flag {
        Flag::Seen => "\\Seen".to_string(),
        Flag::Answered => "\\Answered".to_string(),
        Flag::Flagged => "\\Flagged".to_string(),
        Flag::Deleted => "\\Deleted".to_string(),
        Flag::Draft => "\\Draft".to_string(),
        Flag::Recent => "\\Recent".to_string(),
        Flag::Custom(name) => name.to_string(),
        other => format!("{other:?}"),
    }
}
