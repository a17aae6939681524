//! Incremental inbox synchronization.
//!
//! The caller owns the cursor: it supplies the last UID high-water mark it
//! has seen (or nothing, on a first sync) and receives the advanced value
//! back with the batch. The gateway keeps no sync state of its own.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Deserialize;

use super::normalize::normalize;
use crate::config::ConnectionConfig;
use crate::domain::{Credentials, NormalizedMessage};
use crate::providers::email::{
    MailboxConnector, MailboxSession, Result, SearchCriteria,
};

/// What to do when one fetched message fails to parse.
///
/// `Abort` fails the whole sync; `Skip` drops the message, returns the
/// rest of the batch, and still advances the cursor past the fetched UID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseFailurePolicy {
    /// Surface the parse error and abort the sync.
    #[default]
    Abort,
    /// Skip the unparseable message and continue.
    Skip,
}

/// Parameters for one sync call.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// Mailbox credentials for this request.
    pub credentials: Credentials,
    /// UID high-water mark from the caller's previous sync, if any.
    pub cursor: Option<u32>,
    /// Time-based backfill window used when no cursor is supplied.
    pub backfill_days: u32,
    /// Maximum number of messages returned.
    pub limit: usize,
    /// Parse-failure handling for individual messages.
    pub on_parse_error: ParseFailurePolicy,
}

/// Result of one sync call.
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    /// New UID high-water mark: the maximum fetched UID, or the input
    /// cursor unchanged when nothing matched.
    pub cursor: u32,
    /// The batch, ordered ascending by UID.
    pub messages: Vec<NormalizedMessage>,
}

/// Synchronizes the inbox of one mailbox per call.
pub struct SyncEngine {
    connector: Arc<dyn MailboxConnector>,
}

impl SyncEngine {
    /// Creates a sync engine over the given connector.
    pub fn new(connector: Arc<dyn MailboxConnector>) -> Self {
        Self { connector }
    }

    /// Runs one incremental sync.
    ///
    /// A failure to connect or to acquire the inbox lock aborts the whole
    /// sync with no partial results. The inbox lock is held for the
    /// search/fetch phase and released on every exit path, as is the
    /// session itself.
    pub async fn sync(
        &self,
        config: &ConnectionConfig,
        request: &SyncRequest,
    ) -> Result<SyncOutcome> {
        let mut session = self.connector.connect(config, &request.credentials).await?;

        if let Err(e) = session.lock_inbox().await {
            session.logout().await;
            return Err(e);
        }

        let result = Self::sync_locked(session.as_mut(), request).await;

        session.unlock().await;
        session.logout().await;
        result
    }

    async fn sync_locked(
        session: &mut dyn MailboxSession,
        request: &SyncRequest,
    ) -> Result<SyncOutcome> {
        let criteria = match request.cursor {
            Some(cursor) => SearchCriteria::UidGreaterThan(cursor),
            None => {
                SearchCriteria::Since(Utc::now() - Duration::days(request.backfill_days as i64))
            }
        };

        let mut candidates = session.search(&criteria).await?;

        // Keep the `limit` most recent UIDs, then deliver the batch
        // oldest-first. Truncating the ascending list instead would keep
        // the oldest messages, which is wrong.
        candidates.sort_unstable_by(|a, b| b.cmp(a));
        candidates.truncate(request.limit);
        candidates.reverse();

        let mut cursor = request.cursor.unwrap_or(0);
        let mut messages = Vec::with_capacity(candidates.len());

        // One message in flight at a time: each UID is fetched, parsed,
        // and normalized before the next fetch is issued.
        for uid in candidates {
            let Some(raw) = session.fetch(uid).await? else {
                // Expunged between search and fetch.
                tracing::debug!(uid, "message vanished before fetch");
                continue;
            };
            cursor = cursor.max(raw.uid);

            match normalize(&raw) {
                Ok(message) => messages.push(message),
                Err(e) => match request.on_parse_error {
                    ParseFailurePolicy::Abort => return Err(e),
                    ParseFailurePolicy::Skip => {
                        tracing::warn!(uid, error = %e, "skipping unparseable message");
                    }
                },
            }
        }

        tracing::info!(
            count = messages.len(),
            cursor,
            "inbox sync complete"
        );

        Ok(SyncOutcome { cursor, messages })
    }
}
