//! Domain layer types for the mailbox gateway.
//!
//! Value types that cross the HTTP boundary or flow between the services
//! and the protocol providers: credentials, the normalized inbox message,
//! the outbound message, and the thread-key derivation.

mod credentials;
mod message;
mod outbound;
mod thread;

pub use credentials::Credentials;
pub use message::NormalizedMessage;
pub use outbound::{OutboundMessage, SendOutcome};
pub use thread::derive_thread_key;
