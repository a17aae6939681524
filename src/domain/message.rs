//! The normalized inbox message returned by a sync.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inbox message after fetch, parse, and normalization.
///
/// Constructed once per fetched message and immutable afterwards. The
/// gateway never stores these; they are returned to the caller, who owns
/// any further grouping or persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    /// Server-assigned UID within the inbox.
    pub uid: u32,
    /// Deterministic conversation key derived from the threading headers
    /// and sender. Identical inputs always produce the identical key, so
    /// callers can group messages across calls without shared state.
    pub external_thread_key: String,
    /// RFC 5322 Message-ID, when present.
    pub message_id: Option<String>,
    /// Message-ID this message replies to, when present.
    pub in_reply_to: Option<String>,
    /// Ordered References chain. Always a sequence: empty, single-element,
    /// and multi-element source forms all map to this shape.
    pub references: Vec<String>,
    /// Subject line, falling back to `"(no subject)"` when absent.
    pub subject: String,
    /// Sender address, possibly empty when neither the parsed content nor
    /// the envelope carries one.
    pub from_email: String,
    /// Message date; the fetch time when the source date is unparseable.
    pub date: DateTime<Utc>,
    /// Server-side flags (e.g. `\Seen`).
    pub flags: Vec<String>,
    /// Whitespace-collapsed preview, at most 240 characters.
    pub snippet: String,
    /// Plain-text body, truncated to 20000 characters.
    pub body_text: Option<String>,
    /// HTML body, truncated to 20000 characters.
    pub body_html: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_camel_case() {
        let message = NormalizedMessage {
            uid: 7,
            external_thread_key: "key".to_string(),
            message_id: Some("<a@example.com>".to_string()),
            in_reply_to: None,
            references: vec![],
            subject: "Hello".to_string(),
            from_email: "alice@example.com".to_string(),
            date: Utc::now(),
            flags: vec!["\\Seen".to_string()],
            snippet: "Hello".to_string(),
            body_text: Some("Hello".to_string()),
            body_html: None,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["externalThreadKey"], "key");
        assert_eq!(json["messageId"], "<a@example.com>");
        assert_eq!(json["fromEmail"], "alice@example.com");
        assert!(json["bodyHtml"].is_null());
    }

    #[test]
    fn date_serializes_as_iso8601() {
        let message = NormalizedMessage {
            uid: 1,
            external_thread_key: String::new(),
            message_id: None,
            in_reply_to: None,
            references: vec![],
            subject: String::new(),
            from_email: String::new(),
            date: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            flags: vec![],
            snippet: String::new(),
            body_text: None,
            body_html: None,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["date"], "2024-05-01T12:00:00Z");
    }
}
