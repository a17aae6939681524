//! Deterministic conversation-key derivation.
//!
//! The gateway keeps no state between calls, so messages are grouped into
//! conversations by a key that any call can recompute from the message
//! itself: the strongest available threading header, qualified by the
//! sender address.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::digest;

/// Derives the conversation key for a message.
///
/// The threading root is the References chain joined with spaces, else the
/// In-Reply-To value, else the Message-ID, else the subject. The root is
/// concatenated with the sender address and hashed, so two senders with
/// identical threading headers still land in distinct conversations.
///
/// Pure and deterministic: identical inputs always yield the identical key.
pub fn derive_thread_key(
    references: &[String],
    in_reply_to: Option<&str>,
    message_id: Option<&str>,
    subject: &str,
    from_email: &str,
) -> String {
    let root = if !references.is_empty() {
        references.join(" ")
    } else if let Some(in_reply_to) = in_reply_to.filter(|value| !value.is_empty()) {
        in_reply_to.to_string()
    } else if let Some(message_id) = message_id.filter(|value| !value.is_empty()) {
        message_id.to_string()
    } else {
        subject.to_string()
    };

    let digest = digest::digest(&digest::SHA256, format!("{root}|{from_email}").as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_yield_identical_keys() {
        let references = vec!["<root@example.com>".to_string()];
        let a = derive_thread_key(&references, None, None, "Subject", "alice@example.com");
        let b = derive_thread_key(&references, None, None, "Subject", "alice@example.com");
        assert_eq!(a, b);
    }

    #[test]
    fn sender_qualifies_the_key() {
        let references = vec!["<root@example.com>".to_string()];
        let alice = derive_thread_key(&references, None, None, "Subject", "alice@example.com");
        let bob = derive_thread_key(&references, None, None, "Subject", "bob@example.com");
        assert_ne!(alice, bob);
    }

    #[test]
    fn references_win_over_weaker_headers() {
        let references = vec!["<root@example.com>".to_string()];
        let with_refs = derive_thread_key(
            &references,
            Some("<other@example.com>"),
            Some("<self@example.com>"),
            "Subject",
            "alice@example.com",
        );
        let refs_only =
            derive_thread_key(&references, None, None, "ignored", "alice@example.com");
        assert_eq!(with_refs, refs_only);
    }

    #[test]
    fn fallback_order_is_in_reply_to_then_message_id_then_subject() {
        let from = "alice@example.com";
        let by_reply = derive_thread_key(&[], Some("<r@example.com>"), Some("<m@example.com>"), "S", from);
        let reply_only = derive_thread_key(&[], Some("<r@example.com>"), None, "other", from);
        assert_eq!(by_reply, reply_only);

        let by_id = derive_thread_key(&[], None, Some("<m@example.com>"), "S", from);
        let id_only = derive_thread_key(&[], None, Some("<m@example.com>"), "other", from);
        assert_eq!(by_id, id_only);

        let by_subject = derive_thread_key(&[], None, None, "S", from);
        let other_subject = derive_thread_key(&[], None, None, "T", from);
        assert_ne!(by_subject, other_subject);
    }

    #[test]
    fn empty_headers_fall_through() {
        let from = "alice@example.com";
        let blank = derive_thread_key(&[], Some(""), Some(""), "Subject", from);
        let subject_only = derive_thread_key(&[], None, None, "Subject", from);
        assert_eq!(blank, subject_only);
    }

    #[test]
    fn multi_reference_chains_are_order_sensitive() {
        let from = "alice@example.com";
        let forward = vec!["<a@x>".to_string(), "<b@x>".to_string()];
        let backward = vec!["<b@x>".to_string(), "<a@x>".to_string()];
        assert_ne!(
            derive_thread_key(&forward, None, None, "S", from),
            derive_thread_key(&backward, None, None, "S", from)
        );
    }
}
