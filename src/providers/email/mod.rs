//! Mail protocol providers.
//!
//! This module contains the capability traits the gateway's services are
//! written against, plus the concrete implementations:
//!
//! - [`ImapConnector`] - inbound sessions over IMAP with implicit TLS
//! - [`SmtpMailer`] - outbound verification and delivery over SMTP
//!
//! # Architecture
//!
//! Services never speak IMAP or SMTP directly. They drive
//! [`MailboxConnector`]/[`MailboxSession`] and [`MailTransport`], which
//! return fixed-shape values ([`RawMessage`], message IDs) rather than
//! protocol-library types. Tests substitute in-memory implementations of
//! the same traits.

mod imap;
mod smtp;
mod traits;

pub use imap::ImapConnector;
pub use smtp::SmtpMailer;
pub use traits::{
    EnvelopeMeta, MailTransport, MailboxConnector, MailboxSession, ProviderError, RawMessage,
    Result, SearchCriteria,
};

#[cfg(test)]
pub use traits::{MockMailTransport, MockMailboxConnector, MockMailboxSession};
