use std::time::Duration;

use crate::{env_flag, env_parse, env_string, outbound_timeout};

/// Outbound mail settings. With `SMTP_ENABLED` unset, messages are logged
/// rather than delivered.
#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Empty means an unauthenticated, plaintext connection (local relays
    /// such as MailHog).
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub timeout: Duration,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("SMTP_ENABLED", false),
            smtp_host: env_string("SMTP_HOST", "localhost"),
            smtp_port: env_parse("SMTP_PORT", 1025),
            smtp_username: env_string("SMTP_USERNAME", ""),
            smtp_password: env_string("SMTP_PASSWORD", ""),
            from_email: env_string("FROM_EMAIL", "noreply@schoolhub.dev"),
            from_name: env_string("FROM_NAME", "SchoolHub"),
            timeout: outbound_timeout(),
        }
    }

    /// `Name <address>` as used in the `From` header.
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}
