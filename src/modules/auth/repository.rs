//! Credential store.

use sqlx::PgPool;

use schoolhub_core::{AppError, BoxFuture};
use schoolhub_models::{PendingUser, UserId, UserRecord};

/// Persistence operations the auth flows need.
pub trait UserRepository: Send + Sync {
    /// Inserts a pending user, or overwrites name, password hash and OTP of an
    /// existing *unverified* user with the same email.
    ///
    /// Returns `None` and leaves the row untouched when the email already
    /// belongs to a verified account.
    fn upsert_pending<'a>(
        &'a self,
        user: &'a PendingUser,
    ) -> BoxFuture<'a, Result<Option<UserId>, AppError>>;

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>>;

    /// Flips an unverified user to verified and clears the OTP, provided the
    /// stored OTP still equals `otp` and has not expired.
    ///
    /// Returns `false` when nothing changed: the user is already verified, or
    /// the OTP was replaced or expired since it was read.
    fn mark_verified<'a>(
        &'a self,
        id: UserId,
        otp: &'a str,
    ) -> BoxFuture<'a, Result<bool, AppError>>;
}

const USER_COLUMNS: &str =
    "id, name, email, password_hash, otp, otp_expiry, verified, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl UserRepository for PgUserRepository {
    fn upsert_pending<'a>(
        &'a self,
        user: &'a PendingUser,
    ) -> BoxFuture<'a, Result<Option<UserId>, AppError>> {
        Box::pin(async move {
            sqlx::query_scalar::<_, UserId>(
                "INSERT INTO users (name, email, password_hash, otp, otp_expiry, verified)
                 VALUES ($1, $2, $3, $4, $5, FALSE)
                 ON CONFLICT (email) DO UPDATE
                 SET name = EXCLUDED.name,
                     password_hash = EXCLUDED.password_hash,
                     otp = EXCLUDED.otp,
                     otp_expiry = EXCLUDED.otp_expiry,
                     updated_at = NOW()
                 WHERE users.verified = FALSE
                 RETURNING id",
            )
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.otp)
            .bind(user.otp_expiry)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {} FROM users WHERE email = $1",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn mark_verified<'a>(
        &'a self,
        id: UserId,
        otp: &'a str,
    ) -> BoxFuture<'a, Result<bool, AppError>> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE users
                 SET verified = TRUE, otp = NULL, otp_expiry = NULL, updated_at = NOW()
                 WHERE id = $1 AND verified = FALSE AND otp = $2 AND otp_expiry >= NOW()",
            )
            .bind(id)
            .bind(otp)
            .execute(&self.db)
            .await
            .map_err(AppError::persistence)?;

            Ok(result.rows_affected() > 0)
        })
    }
}
