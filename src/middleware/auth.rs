use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use schoolhub_auth::{Claims, verify_token};
use schoolhub_config::JwtConfig;
use schoolhub_core::AppError;
use schoolhub_models::UserId;

use crate::state::AppState;

/// Extractor that validates the bearer token and provides the caller's claims.
///
/// Trusts the signature alone: there is no store lookup, so a token stays
/// valid until it expires even if its user is removed.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.sub)
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Authenticates a request from its headers.
    pub fn from_headers(headers: &HeaderMap, jwt_config: &JwtConfig) -> Result<Self, AppError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or_else(AppError::missing_token)?;

        let claims = verify_token(token, jwt_config)?;

        Ok(AuthUser(claims))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers, &state.jwt_config)
    }
}
