//! Authentication configuration.

/// Configuration for the auth gateway.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session lifetime in days, fixed at issuance (default: 7).
    pub session_lifetime_days: i64,
    /// Minimum accepted password length (default: 8).
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_lifetime_days: 7,
            min_password_length: 8,
        }
    }
}
