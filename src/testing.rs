//! In-memory collaborators for tests.
//!
//! Compiled for unit tests and, through the `test-utils` feature, for the
//! integration tests under `tests/`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::anyhow;
use chrono::{DateTime, Utc};

use schoolhub_config::{CorsConfig, EmailConfig, JwtConfig, OtpConfig, StorageConfig};
use schoolhub_core::{AppError, BoxFuture, LocalFileStorage};
use schoolhub_models::{
    NewSchool, PendingUser, School, SchoolChanges, SchoolId, SchoolSummary, UserId, UserRecord,
};

use crate::modules::auth::repository::UserRepository;
use crate::modules::schools::repository::SchoolRepository;
use crate::state::AppState;
use crate::utils::email::{EmailMessage, EmailSender};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User store keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn get(&self, email: &str) -> Option<UserRecord> {
        lock(&self.users).get(email).cloned()
    }

    pub fn count(&self) -> usize {
        lock(&self.users).len()
    }

    /// Overrides the stored OTP expiry, e.g. to simulate an elapsed window.
    pub fn set_otp_expiry(&self, email: &str, expiry: Option<DateTime<Utc>>) {
        if let Some(user) = lock(&self.users).get_mut(email) {
            user.otp_expiry = expiry;
        }
    }
}

impl UserRepository for InMemoryUserRepository {
    fn upsert_pending<'a>(
        &'a self,
        user: &'a PendingUser,
    ) -> BoxFuture<'a, Result<Option<UserId>, AppError>> {
        Box::pin(async move {
            let mut users = lock(&self.users);
            let now = Utc::now();

            if let Some(existing) = users.get_mut(&user.email) {
                if existing.verified {
                    return Ok(None);
                }
                existing.name = user.name.clone();
                existing.password_hash = user.password_hash.clone();
                existing.otp = Some(user.otp.clone());
                existing.otp_expiry = Some(user.otp_expiry);
                existing.updated_at = now;
                return Ok(Some(existing.id));
            }

            let record = UserRecord {
                id: UserId::new(),
                name: user.name.clone(),
                email: user.email.clone(),
                password_hash: user.password_hash.clone(),
                otp: Some(user.otp.clone()),
                otp_expiry: Some(user.otp_expiry),
                verified: false,
                created_at: now,
                updated_at: now,
            };
            let id = record.id;
            users.insert(user.email.clone(), record);

            Ok(Some(id))
        })
    }

    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<UserRecord>, AppError>> {
        Box::pin(async move { Ok(self.get(email)) })
    }

    fn mark_verified<'a>(
        &'a self,
        id: UserId,
        otp: &'a str,
    ) -> BoxFuture<'a, Result<bool, AppError>> {
        Box::pin(async move {
            let mut users = lock(&self.users);
            let Some(user) = users.values_mut().find(|u| u.id == id) else {
                return Ok(false);
            };
            let current = user.otp.as_deref() == Some(otp)
                && user.otp_expiry.is_some_and(|expiry| expiry >= Utc::now());
            if user.verified || !current {
                return Ok(false);
            }

            user.verified = true;
            user.otp = None;
            user.otp_expiry = None;
            user.updated_at = Utc::now();

            Ok(true)
        })
    }
}

/// School store in insertion order.
#[derive(Debug, Default)]
pub struct InMemorySchoolRepository {
    schools: Mutex<Vec<School>>,
}

impl InMemorySchoolRepository {
    pub fn get(&self, id: SchoolId) -> Option<School> {
        lock(&self.schools).iter().find(|s| s.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        lock(&self.schools).len()
    }
}

impl SchoolRepository for InMemorySchoolRepository {
    fn insert<'a>(&'a self, school: &'a NewSchool) -> BoxFuture<'a, Result<School, AppError>> {
        Box::pin(async move {
            let now = Utc::now();
            let stored = School {
                id: school.id,
                name: school.details.name.clone(),
                address: school.details.address.clone(),
                city: school.details.city.clone(),
                state: school.details.state.clone(),
                contact: school.details.contact.clone(),
                email: school.details.email.clone(),
                image: school.image.clone(),
                image_key: school.image_key.clone(),
                creator_id: school.creator_id,
                created_at: now,
                updated_at: now,
            };
            lock(&self.schools).push(stored.clone());
            Ok(stored)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<SchoolSummary>, AppError>> {
        Box::pin(async move {
            Ok(lock(&self.schools)
                .iter()
                .rev()
                .map(SchoolSummary::from)
                .collect())
        })
    }

    fn find_by_id(&self, id: SchoolId) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move { Ok(self.get(id)) })
    }

    fn find_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move { Ok(self.get(id).filter(|s| s.creator_id == owner)) })
    }

    fn update_owned<'a>(
        &'a self,
        id: SchoolId,
        owner: UserId,
        changes: &'a SchoolChanges,
    ) -> BoxFuture<'a, Result<Option<School>, AppError>> {
        Box::pin(async move {
            let mut schools = lock(&self.schools);
            let Some(school) = schools
                .iter_mut()
                .find(|s| s.id == id && s.creator_id == owner)
            else {
                return Ok(None);
            };

            let details = &changes.details;
            let fields = [
                (&mut school.name, &details.name),
                (&mut school.address, &details.address),
                (&mut school.city, &details.city),
                (&mut school.state, &details.state),
                (&mut school.contact, &details.contact),
                (&mut school.email, &details.email),
            ];
            for (current, change) in fields {
                if let Some(value) = change {
                    *current = value.clone();
                }
            }
            if let Some(image) = &changes.image {
                school.image = image.url.clone();
                school.image_key = image.key.clone();
            }
            school.updated_at = Utc::now();

            Ok(Some(school.clone()))
        })
    }

    fn delete_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move {
            let mut schools = lock(&self.schools);
            let position = schools
                .iter()
                .position(|s| s.id == id && s.creator_id == owner);
            Ok(position.map(|index| schools.remove(index)))
        })
    }
}

/// Email sender that keeps every message, optionally failing instead.
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingEmailSender {
    pub fn failing() -> Self {
        let sender = Self::default();
        sender.set_failing(true);
        sender
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }

    pub fn sent_to(&self, email: &str) -> Vec<EmailMessage> {
        lock(&self.sent)
            .iter()
            .filter(|m| m.to_email == email)
            .cloned()
            .collect()
    }
}

impl EmailSender for RecordingEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> BoxFuture<'a, Result<(), AppError>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(AppError::delivery(anyhow!("SMTP server unavailable")));
            }
            lock(&self.sent).push(message.clone());
            Ok(())
        })
    }
}

/// Handles to the in-memory collaborators behind a test [`AppState`].
pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub schools: Arc<InMemorySchoolRepository>,
    pub email_sender: Arc<RecordingEmailSender>,
    pub storage: Arc<LocalFileStorage>,
}

pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-characters-long";

impl TestContext {
    /// State backed by in-memory stores, a recording email sender and a
    /// fresh storage directory under the system temp dir.
    pub fn new() -> Self {
        let base_dir =
            std::env::temp_dir().join(format!("schoolhub-test-{}", uuid::Uuid::new_v4()));
        let storage_config = StorageConfig {
            base_dir: base_dir.clone(),
            public_url: "http://localhost:3000/files".to_string(),
            max_upload_bytes: 1024 * 1024,
            timeout: std::time::Duration::from_secs(5),
        };

        let users = Arc::new(InMemoryUserRepository::default());
        let schools = Arc::new(InMemorySchoolRepository::default());
        let email_sender = Arc::new(RecordingEmailSender::default());
        let storage = Arc::new(LocalFileStorage::new(
            base_dir,
            storage_config.public_url.clone(),
            storage_config.max_upload_bytes,
        ));

        let state = AppState {
            users: users.clone(),
            schools: schools.clone(),
            file_storage: storage.clone(),
            email_sender: email_sender.clone(),
            jwt_config: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
                access_token_expiry: 3600,
            },
            otp_config: OtpConfig::default(),
            email_config: EmailConfig {
                enabled: false,
                smtp_host: "localhost".to_string(),
                smtp_port: 1025,
                smtp_username: String::new(),
                smtp_password: String::new(),
                from_email: "noreply@schoolhub.dev".to_string(),
                from_name: "SchoolHub".to_string(),
                timeout: std::time::Duration::from_secs(5),
            },
            storage_config,
            cors_config: CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            },
        };

        Self {
            state,
            users,
            schools,
            email_sender,
            storage,
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
