//! Per-request mailbox credentials.

/// Mailbox credentials supplied with a single request.
///
/// Lifetime is one request: never persisted, never shared across tasks.
#[derive(Clone)]
pub struct Credentials {
    /// The mailbox address, used as the login identity for both protocols.
    pub email: String,
    /// The mailbox password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials for one request.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

// The password must never reach logs, so Debug is implemented by hand.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let credentials = Credentials::new("user@example.com", "hunter2");
        let output = format!("{credentials:?}");
        assert!(output.contains("user@example.com"));
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("hunter2"));
    }
}
