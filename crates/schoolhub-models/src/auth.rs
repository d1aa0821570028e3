//! Authentication request and response DTOs.
//!
//! Covers the three public auth operations: registration (which issues an
//! OTP by email), OTP verification and password login.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::UserSummary;

/// Strips surrounding whitespace so `validator` sees the address as stored.
fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().to_string())
}

/// Registration request. Issues a fresh OTP for the email address.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ann")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "A valid email is required"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secr3t!")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "A valid email is required"))]
    #[schema(example = "ann@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "OTP is required"))]
    #[schema(example = "482913")]
    pub otp: String,
}

/// Login request with email and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "deserialize_trimmed")]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "Secr3t!")]
    pub password: String,
}

/// Successful login response carrying the bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// `{success, message}` body used by registration and OTP verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthMessageResponse {
    pub success: bool,
    #[schema(example = "OTP sent to email")]
    pub message: String,
}

impl AuthMessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
