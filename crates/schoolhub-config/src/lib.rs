//! # SchoolHub Config
//!
//! Configuration types for the SchoolHub API, each loaded from environment
//! variables with development defaults:
//!
//! - [`jwt`]: Token signing secret and lifetime
//! - [`otp`]: One-time password expiry window
//! - [`email`]: SMTP delivery settings
//! - [`storage`]: Image storage location and limits
//! - [`cors`]: Allowed browser origins
//!
//! A variable that is set but fails to parse falls back to the default.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_config::{JwtConfig, OtpConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let otp_config = OtpConfig::from_env();
//! ```

use std::env;
use std::str::FromStr;
use std::time::Duration;

pub mod cors;
pub mod email;
pub mod jwt;
pub mod otp;
pub mod storage;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use otp::OtpConfig;
pub use storage::StorageConfig;

/// Seconds allowed for one outbound call (SMTP send, storage write).
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn outbound_timeout() -> Duration {
    Duration::from_secs(env_parse(
        "OUTBOUND_TIMEOUT_SECONDS",
        DEFAULT_OUTBOUND_TIMEOUT_SECS,
    ))
}
