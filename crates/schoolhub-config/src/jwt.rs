use crate::{env_parse, env_string};

/// Fallback signing secret for local runs without `JWT_SECRET`.
pub const DEVELOPMENT_SECRET: &str = "your-secret-key-change-in-production";

const DEFAULT_ACCESS_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HS256 signing secret.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env_string("JWT_SECRET", DEVELOPMENT_SECRET),
            access_token_expiry: env_parse("JWT_ACCESS_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY_SECS),
        }
    }

    pub fn uses_development_secret(&self) -> bool {
        self.secret == DEVELOPMENT_SECRET
    }
}
