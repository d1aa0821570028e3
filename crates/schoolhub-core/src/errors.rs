//! Application error type with HTTP response conversion.
//!
//! Every failure surfaced by a handler is an [`AppError`]: an [`ErrorKind`]
//! that fixes the HTTP status, plus an [`anyhow::Error`] carrying the detail.
//!
//! Client errors (4xx) echo their message to the caller. Server errors (5xx)
//! are logged with full detail and answered with a generic message so that
//! driver, SMTP or filesystem errors never reach the response body.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input.
    Validation,
    /// The addressed entity does not exist.
    NotFound,
    /// Submitted one-time code does not match the stored one.
    InvalidCode,
    /// Stored one-time code is past its expiry.
    Expired,
    /// Unknown email or wrong password; deliberately indistinguishable.
    InvalidCredentials,
    /// Correct password but the email address was never verified.
    UnverifiedAccount,
    /// No `Authorization: Bearer <token>` header.
    MissingToken,
    /// Bad signature, malformed or expired token.
    InvalidToken,
    /// Resource is absent or owned by someone else.
    NotFoundOrForbidden,
    /// Outbound email could not be delivered.
    Delivery,
    /// Backing store failure.
    Persistence,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation | Self::InvalidCode | Self::Expired => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::NotFoundOrForbidden => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::MissingToken | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::UnverifiedAccount => StatusCode::FORBIDDEN,
            Self::Delivery | Self::Persistence | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn public_message(self) -> Option<&'static str> {
        match self {
            Self::Delivery => Some("Failed to deliver verification code"),
            Self::Persistence | Self::Internal => Some("Internal server error"),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn invalid_code() -> Self {
        Self::new(ErrorKind::InvalidCode, anyhow::anyhow!("Invalid OTP"))
    }

    pub fn expired() -> Self {
        Self::new(ErrorKind::Expired, anyhow::anyhow!("OTP expired"))
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            ErrorKind::InvalidCredentials,
            anyhow::anyhow!("Invalid email or password"),
        )
    }

    pub fn unverified_account() -> Self {
        Self::new(
            ErrorKind::UnverifiedAccount,
            anyhow::anyhow!("Please verify your email before login"),
        )
    }

    pub fn missing_token() -> Self {
        Self::new(ErrorKind::MissingToken, anyhow::anyhow!("No token provided"))
    }

    pub fn invalid_token() -> Self {
        Self::new(
            ErrorKind::InvalidToken,
            anyhow::anyhow!("Invalid or expired token"),
        )
    }

    pub fn not_found_or_forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFoundOrForbidden, err)
    }

    pub fn delivery<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Delivery, err)
    }

    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Persistence, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn internal_error(message: String) -> Self {
        Self::internal(anyhow::anyhow!(message))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self.kind.public_message() {
            Some(public) => {
                tracing::error!(kind = ?self.kind, error = ?self.error, "Request failed");
                public.to_string()
            }
            None => self.error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::InvalidCode.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Expired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::NotFoundOrForbidden.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorKind::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorKind::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::UnverifiedAccount.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorKind::Delivery.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorKind::Persistence.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_error_keeps_message() {
        let err = AppError::validation(anyhow::anyhow!("name is required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "name is required");
    }

    #[test]
    fn test_server_error_message_is_generic() {
        assert_eq!(
            ErrorKind::Persistence.public_message(),
            Some("Internal server error")
        );
        assert_eq!(
            ErrorKind::Delivery.public_message(),
            Some("Failed to deliver verification code")
        );
        assert_eq!(ErrorKind::NotFound.public_message(), None);
    }

    #[test]
    fn test_from_anyhow_is_internal() {
        let err: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_invalid_credentials_message_is_shared() {
        let unknown = AppError::invalid_credentials();
        let wrong = AppError::invalid_credentials();
        assert_eq!(unknown.error.to_string(), wrong.error.to_string());
    }
}
