//! User domain models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::UserId;

/// A stored user row, including the credential and OTP columns.
///
/// Never serialized: handlers answer with [`UserSummary`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub otp: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Values written by a registration upsert.
#[derive(Debug, Clone)]
pub struct PendingUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub otp: String,
    pub otp_expiry: DateTime<Utc>,
}

/// Public identity of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: UserId,
    #[schema(example = "ann@example.com")]
    pub email: String,
}
