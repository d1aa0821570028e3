use crate::env_parse;

const DEFAULT_EXPIRY_SECS: i64 = 10 * 60;

/// One-time password settings for email verification.
///
/// The expiry window is used both when the code is issued and in the email
/// copy sent to the user, so the two can never disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OtpConfig {
    /// Seconds a freshly issued code stays valid.
    pub expiry_seconds: i64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            expiry_seconds: DEFAULT_EXPIRY_SECS,
        }
    }
}

impl OtpConfig {
    pub fn from_env() -> Self {
        let expiry_seconds = env_parse("OTP_EXPIRY_SECONDS", DEFAULT_EXPIRY_SECS);

        Self {
            expiry_seconds: if expiry_seconds > 0 {
                expiry_seconds
            } else {
                DEFAULT_EXPIRY_SECS
            },
        }
    }

    /// Expiry window rounded up to whole minutes, for user-facing copy.
    pub fn expiry_minutes(&self) -> i64 {
        (self.expiry_seconds + 59) / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_ten_minutes() {
        let config = OtpConfig::default();
        assert_eq!(config.expiry_seconds, 600);
        assert_eq!(config.expiry_minutes(), 10);
    }

    #[test]
    fn test_expiry_minutes_rounds_up() {
        let config = OtpConfig {
            expiry_seconds: 90,
        };
        assert_eq!(config.expiry_minutes(), 2);
    }
}
