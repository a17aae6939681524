//! Gateway startup settings.
//!
//! Loaded once from the environment at process start and read-only after
//! that. A missing API key is fatal: the process refuses to start rather
//! than serve unauthenticated mutating routes.

/// Errors raised while loading startup settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The shared-secret API key is not configured.
    #[error("MAILGATE_API_KEY must be set")]
    MissingApiKey,

    /// The listen port is present but not a valid port number.
    #[error("invalid MAILGATE_PORT: {0}")]
    InvalidPort(String),
}

/// Process-level configuration for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Shared secret required on all mutating routes.
    pub api_key: String,
    /// Listen address.
    pub bind: String,
    /// Listen port.
    pub port: u16,
}

impl GatewaySettings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = get("MAILGATE_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let bind = get("MAILGATE_BIND").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match get("MAILGATE_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8300,
        };

        Ok(Self {
            api_key,
            bind,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = GatewaySettings::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn empty_api_key_is_fatal() {
        let result = GatewaySettings::from_lookup(lookup(&[("MAILGATE_API_KEY", "")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn defaults_for_bind_and_port() {
        let settings =
            GatewaySettings::from_lookup(lookup(&[("MAILGATE_API_KEY", "secret")])).unwrap();
        assert_eq!(settings.bind, "0.0.0.0");
        assert_eq!(settings.port, 8300);
    }

    #[test]
    fn explicit_bind_and_port() {
        let settings = GatewaySettings::from_lookup(lookup(&[
            ("MAILGATE_API_KEY", "secret"),
            ("MAILGATE_BIND", "127.0.0.1"),
            ("MAILGATE_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = GatewaySettings::from_lookup(lookup(&[
            ("MAILGATE_API_KEY", "secret"),
            ("MAILGATE_PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }
}
