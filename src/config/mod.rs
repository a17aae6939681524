//! Process and connection configuration.
//!
//! This module provides the gateway's startup settings (loaded once from the
//! environment) and the per-request host config resolver that merges fixed
//! provider defaults with caller-supplied overrides.

mod hosts;
mod settings;

pub use hosts::{
    AdvancedOverrides, ConnectionConfig, SmtpHost, DEFAULT_IMAP_HOST, DEFAULT_IMAP_PORT,
    DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, FALLBACK_SMTP_HOST,
};
pub use settings::{ConfigError, GatewaySettings};
