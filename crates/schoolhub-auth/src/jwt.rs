//! JWT (JSON Web Token) creation and verification.
//!
//! Tokens are HS256-signed with the server secret from [`JwtConfig`] and carry
//! [`Claims`] `{sub, email, iat, exp}`. Verification trusts the signature and
//! expiry alone; there is no revocation list and no store lookup.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_auth::{create_access_token, verify_token};
//! use schoolhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "ann@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, user_id);
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use schoolhub_config::JwtConfig;
use schoolhub_core::AppError;

use crate::claims::Claims;

/// Creates a signed access token for a logged-in user.
///
/// The token expires `jwt_config.access_token_expiry` seconds after issuance.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// A bad signature, a malformed token and an expired token all produce the
/// same invalid-token error. Expiry is enforced without leeway.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::invalid_token())
}
