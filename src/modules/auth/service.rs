use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::Rng;
use tracing::{info, instrument, warn};

use schoolhub_auth::create_access_token;
use schoolhub_core::{AppError, ErrorKind, hash_password_blocking, verify_password_blocking};
use schoolhub_models::{
    AuthMessageResponse, LoginRequest, LoginResponse, PendingUser, RegisterRequest,
    VerifyOtpRequest,
};

use crate::metrics::{self, LoginFailure, OtpOutcome};
use crate::state::AppState;
use crate::utils::email::otp_email;

/// Six-digit code, uniform over `100000..=999999`.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct AuthService;

impl AuthService {
    /// Stores (or refreshes) a pending account and emails it a fresh OTP.
    ///
    /// The OTP stays persisted when delivery fails; the caller may simply
    /// register again to get a new code.
    #[instrument(skip(state, dto), fields(user.email = %dto.email))]
    pub async fn register(
        state: &AppState,
        dto: RegisterRequest,
    ) -> Result<AuthMessageResponse, AppError> {
        let email = normalize_email(&dto.email);
        let otp = generate_otp();

        let password_hash = hash_password_blocking(dto.password.clone()).await?;

        let pending = PendingUser {
            name: dto.name.clone(),
            email: email.clone(),
            password_hash,
            otp: otp.clone(),
            otp_expiry: Utc::now() + Duration::seconds(state.otp_config.expiry_seconds),
        };

        let user_id = state.users.upsert_pending(&pending).await?.ok_or_else(|| {
            warn!(user.email = %email, "Registration attempted for verified email");
            AppError::validation(anyhow!("Email is already registered"))
        })?;

        let message = otp_email(&email, &dto.name, &otp, state.otp_config.expiry_minutes());
        let timeout = state.email_config.timeout;

        match tokio::time::timeout(timeout, state.email_sender.send(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind == ErrorKind::Delivery => return Err(e),
            Ok(Err(e)) => return Err(AppError::delivery(e.error)),
            Err(_) => {
                return Err(AppError::delivery(anyhow!(
                    "Email delivery timed out after {}s",
                    timeout.as_secs()
                )));
            }
        }

        metrics::track_user_registered();
        info!(user.id = %user_id, "Verification code sent");

        Ok(AuthMessageResponse::ok("OTP sent to email"))
    }

    /// Checks a submitted OTP and marks the account verified.
    ///
    /// Expiry is checked before the code, so an expired OTP is reported as
    /// expired whether or not the submitted code matches.
    #[instrument(skip(state, dto), fields(user.email = %dto.email))]
    pub async fn verify_otp(
        state: &AppState,
        dto: VerifyOtpRequest,
    ) -> Result<AuthMessageResponse, AppError> {
        let email = normalize_email(&dto.email);

        let user = state
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

        if user.verified {
            metrics::track_otp_verification(OtpOutcome::AlreadyVerified);
            return Ok(AuthMessageResponse::ok("Already verified"));
        }

        let expired = user.otp_expiry.is_none_or(|expiry| Utc::now() > expiry);
        if expired {
            metrics::track_otp_verification(OtpOutcome::Expired);
            return Err(AppError::expired());
        }

        let otp = dto.otp.trim();
        if user.otp.as_deref() != Some(otp) {
            metrics::track_otp_verification(OtpOutcome::Invalid);
            return Err(AppError::invalid_code());
        }

        // The store re-checks the code, so a registration that replaced the
        // OTP after the read above cannot be verified with the old one.
        if !state.users.mark_verified(user.id, otp).await? {
            return Self::classify_lost_verification(state, &email).await;
        }

        metrics::track_otp_verification(OtpOutcome::Verified);
        info!(user.id = %user.id, "Email verified");

        Ok(AuthMessageResponse::ok("Email verified successfully!"))
    }

    /// Outcome for a matching code whose conditional update changed nothing.
    async fn classify_lost_verification(
        state: &AppState,
        email: &str,
    ) -> Result<AuthMessageResponse, AppError> {
        let current = state.users.find_by_email(email).await?;

        match current {
            Some(user) if user.verified => {
                metrics::track_otp_verification(OtpOutcome::AlreadyVerified);
                Ok(AuthMessageResponse::ok("Already verified"))
            }
            Some(user) if user.otp_expiry.is_none_or(|expiry| Utc::now() > expiry) => {
                metrics::track_otp_verification(OtpOutcome::Expired);
                Err(AppError::expired())
            }
            _ => {
                warn!(user.email = %email, "OTP was replaced during verification");
                metrics::track_otp_verification(OtpOutcome::Invalid);
                Err(AppError::invalid_code())
            }
        }
    }

    /// Password login for verified accounts.
    ///
    /// Unknown email and wrong password produce the same error. The password
    /// is checked first so that the unverified-account error is only revealed
    /// to a caller who knows it.
    #[instrument(skip(state, dto), fields(user.email = %dto.email))]
    pub async fn login(state: &AppState, dto: LoginRequest) -> Result<LoginResponse, AppError> {
        let email = normalize_email(&dto.email);

        let Some(user) = state.users.find_by_email(&email).await? else {
            metrics::track_login_failure(LoginFailure::UnknownEmail);
            return Err(AppError::invalid_credentials());
        };

        let matches =
            verify_password_blocking(dto.password.clone(), user.password_hash.clone()).await?;
        if !matches {
            metrics::track_login_failure(LoginFailure::WrongPassword);
            return Err(AppError::invalid_credentials());
        }

        if !user.verified {
            metrics::track_login_failure(LoginFailure::Unverified);
            return Err(AppError::unverified_account());
        }

        let token = create_access_token(user.id.into_inner(), &user.email, &state.jwt_config)?;

        metrics::track_login_success();
        info!(user.id = %user.id, "User logged in");

        Ok(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            token,
            user: user.summary(),
        })
    }
}
