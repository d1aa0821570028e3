use axum::Json;
use axum::extract::State;
use tracing::instrument;
use utoipa::ToSchema;

use schoolhub_core::AppError;
use schoolhub_models::{
    AuthMessageResponse, LoginRequest, LoginResponse, RegisterRequest, VerifyOtpRequest,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::AuthService;

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Register an account and email it a verification code
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "OTP sent to email", body = AuthMessageResponse),
        (status = 400, description = "Validation error or email already registered", body = ErrorResponse),
        (status = 500, description = "Persistence or delivery failure", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthMessageResponse>, AppError> {
    let response = AuthService::register(&state, dto).await?;
    Ok(Json(response))
}

/// Verify an email address with the emailed code
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "Email verified (or already verified)", body = AuthMessageResponse),
        (status = 400, description = "Missing fields, wrong code or expired code", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<VerifyOtpRequest>,
) -> Result<Json<AuthMessageResponse>, AppError> {
    let response = AuthService::verify_otp(&state, dto).await?;
    Ok(Json(response))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 403, description = "Email not verified", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state, dto).await?;
    Ok(Json(response))
}
