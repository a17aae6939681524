//! Gateway service layer.
//!
//! The decision logic of the gateway lives here, written against the
//! provider capability traits:
//!
//! - [`VerifyEngine`]: checks inbound and outbound authentication
//!   independently, with outbound host failover
//! - [`SyncEngine`]: incremental inbox synchronization with caller-owned
//!   cursors and bounded, oldest-first batches
//! - [`SendEngine`]: single delivery with a whole-send retry on the
//!   secondary host

mod normalize;
mod send;
mod sync;
mod verify;

pub use normalize::{normalize, BODY_MAX_CHARS, MISSING_SUBJECT, SNIPPET_MAX_CHARS};
pub use send::SendEngine;
pub use sync::{ParseFailurePolicy, SyncEngine, SyncOutcome, SyncRequest};
pub use verify::{CheckResult, VerifyEngine, VerifyOutcome};
