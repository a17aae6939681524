//! Message normalization.
//!
//! Turns one fetched message (raw source plus envelope metadata) into a
//! [`NormalizedMessage`]. The MIME parser's loosely-shaped output is
//! captured into a fixed-shape [`ParsedContent`] first, so normalization
//! itself is a total function over known fields.

use chrono::{DateTime, Utc};
use mail_parser::MessageParser;

use crate::domain::{derive_thread_key, NormalizedMessage};
use crate::providers::email::{ProviderError, RawMessage, Result};

/// Maximum snippet length, in characters.
pub const SNIPPET_MAX_CHARS: usize = 240;
/// Maximum body length, in characters.
pub const BODY_MAX_CHARS: usize = 20_000;
/// Placeholder when neither the parsed content nor the envelope carries a
/// subject.
pub const MISSING_SUBJECT: &str = "(no subject)";

/// The MIME fields the normalizer consumes, with explicit optionality.
#[derive(Debug, Default)]
struct ParsedContent {
    subject: Option<String>,
    from_email: Option<String>,
    text: Option<String>,
    html: Option<String>,
    date: Option<DateTime<Utc>>,
    message_id: Option<String>,
    in_reply_to: Option<String>,
    references: Vec<String>,
}

impl ParsedContent {
    fn from_source(source: &[u8]) -> Option<Self> {
        let message = MessageParser::default().parse(source)?;

        Some(Self {
            subject: message.subject().map(|s| s.to_string()),
            from_email: message
                .from()
                .and_then(|address| address.as_list())
                .and_then(|list| list.first())
                .and_then(|addr| addr.address())
                .map(|s| s.to_string()),
            text: message.body_text(0).map(|s| s.to_string()),
            html: message.body_html(0).map(|s| s.to_string()),
            date: message
                .date()
                .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0)),
            message_id: message.message_id().map(|s| s.to_string()),
            in_reply_to: message.in_reply_to().as_text().map(|s| s.to_string()),
            references: message
                .references()
                .as_text_list()
                .map(|refs| refs.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        })
    }
}

/// Normalizes one fetched message.
///
/// Subject and sender fall back from parsed content to envelope metadata;
/// the subject bottoms out at [`MISSING_SUBJECT`]. Fails with
/// [`ProviderError::Parse`] when the source is not parseable as a message.
pub fn normalize(raw: &RawMessage) -> Result<NormalizedMessage> {
    let parsed = ParsedContent::from_source(&raw.source).ok_or_else(|| {
        ProviderError::Parse(format!("unparseable message source for UID {}", raw.uid))
    })?;

    let subject = parsed
        .subject
        .filter(|s| !s.is_empty())
        .or_else(|| raw.envelope.subject.clone())
        .unwrap_or_else(|| MISSING_SUBJECT.to_string());

    let from_email = parsed
        .from_email
        .or_else(|| raw.envelope.from_email.clone())
        .unwrap_or_default();

    let snippet_source = parsed.text.as_deref().unwrap_or(&subject);
    let snippet = truncate_chars(&collapse_whitespace(snippet_source), SNIPPET_MAX_CHARS);

    let date = parsed.date.unwrap_or_else(Utc::now);
    let message_id = parsed.message_id.filter(|s| !s.is_empty());
    let in_reply_to = parsed.in_reply_to.filter(|s| !s.is_empty());

    let external_thread_key = derive_thread_key(
        &parsed.references,
        in_reply_to.as_deref(),
        message_id.as_deref(),
        &subject,
        &from_email,
    );

    Ok(NormalizedMessage {
        uid: raw.uid,
        external_thread_key,
        message_id,
        in_reply_to,
        references: parsed.references,
        subject,
        from_email,
        date,
        flags: raw.flags.clone(),
        snippet,
        body_text: parsed.text.map(|text| truncate_chars(&text, BODY_MAX_CHARS)),
        body_html: parsed.html.map(|html| truncate_chars(&html, BODY_MAX_CHARS)),
    })
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}
