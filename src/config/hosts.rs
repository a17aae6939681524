//! Provider host defaults and the per-request config resolver.
//!
//! The gateway targets a single mail provider with fixed host conventions.
//! Callers may override individual connection fields per request via the
//! `advanced` block; absent fields keep the provider default. Override
//! values are applied field-by-field and are not validated here.

use serde::{Deserialize, Serialize};

/// Default inbound (IMAP) host.
pub const DEFAULT_IMAP_HOST: &str = "mail.privateemail.com";
/// Default inbound port (implicit TLS).
pub const DEFAULT_IMAP_PORT: u16 = 993;
/// Default outbound (SMTP) host.
pub const DEFAULT_SMTP_HOST: &str = "mail.privateemail.com";
/// Default outbound port (implicit TLS).
pub const DEFAULT_SMTP_PORT: u16 = 465;
/// Secondary outbound host used when the primary refuses a send or
/// handshake. Shares the effective port and TLS policy.
pub const FALLBACK_SMTP_HOST: &str = "smtp.privateemail.com";

/// Caller-supplied per-request connection overrides.
///
/// All fields are optional; anything omitted falls back to the provider
/// default. The inbound host itself is fixed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedOverrides {
    /// Inbound port override.
    pub imap_port: Option<u16>,
    /// Inbound TLS flag override.
    pub imap_secure: Option<bool>,
    /// Outbound host override.
    pub smtp_host: Option<String>,
    /// Outbound port override.
    pub smtp_port: Option<u16>,
    /// Outbound TLS flag override.
    pub smtp_secure: Option<bool>,
}

/// Effective connection configuration for one request.
///
/// Immutable once resolved; never outlives the request that built it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Inbound server hostname.
    pub imap_host: String,
    /// Inbound server port.
    pub imap_port: u16,
    /// Whether the inbound connection uses implicit TLS.
    pub imap_secure: bool,
    /// Primary outbound server hostname.
    pub smtp_host: String,
    /// Outbound server port.
    pub smtp_port: u16,
    /// Whether the outbound connection uses implicit TLS.
    pub smtp_secure: bool,
}

/// One outbound delivery target: host plus the shared port/TLS policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpHost {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Whether to use implicit TLS (STARTTLS otherwise).
    pub secure: bool,
}

impl ConnectionConfig {
    /// Merges the provider defaults with an optional override set.
    pub fn resolve(overrides: Option<&AdvancedOverrides>) -> Self {
        let defaults = Self::default();
        let Some(overrides) = overrides else {
            return defaults;
        };
        Self {
            imap_host: defaults.imap_host,
            imap_port: overrides.imap_port.unwrap_or(defaults.imap_port),
            imap_secure: overrides.imap_secure.unwrap_or(defaults.imap_secure),
            smtp_host: overrides
                .smtp_host
                .clone()
                .unwrap_or(defaults.smtp_host),
            smtp_port: overrides.smtp_port.unwrap_or(defaults.smtp_port),
            smtp_secure: overrides.smtp_secure.unwrap_or(defaults.smtp_secure),
        }
    }

    /// The primary outbound delivery target.
    pub fn primary_smtp(&self) -> SmtpHost {
        SmtpHost {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            secure: self.smtp_secure,
        }
    }

    /// The fixed secondary outbound target. Inherits the effective
    /// (possibly overridden) port and TLS policy.
    pub fn fallback_smtp(&self) -> SmtpHost {
        SmtpHost {
            host: FALLBACK_SMTP_HOST.to_string(),
            port: self.smtp_port,
            secure: self.smtp_secure,
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            imap_host: DEFAULT_IMAP_HOST.to_string(),
            imap_port: DEFAULT_IMAP_PORT,
            imap_secure: true,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_secure: true,
        }
    }
}
