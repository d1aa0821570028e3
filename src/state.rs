use std::sync::Arc;

use schoolhub_config::{CorsConfig, EmailConfig, JwtConfig, OtpConfig, StorageConfig};
use schoolhub_core::{FileStorage, LocalFileStorage};
use schoolhub_db::PgPool;

use crate::modules::auth::repository::{PgUserRepository, UserRepository};
use crate::modules::schools::repository::{PgSchoolRepository, SchoolRepository};
use crate::utils::email::{EmailSender, email_sender_from_config};

/// Shared handles and configuration injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub schools: Arc<dyn SchoolRepository>,
    pub file_storage: Arc<dyn FileStorage>,
    pub email_sender: Arc<dyn EmailSender>,
    pub jwt_config: JwtConfig,
    pub otp_config: OtpConfig,
    pub email_config: EmailConfig,
    pub storage_config: StorageConfig,
    pub cors_config: CorsConfig,
}

/// Builds the production state: Postgres-backed stores, local image storage
/// and the configured email sender.
pub fn init_app_state(db: PgPool) -> AppState {
    let email_config = EmailConfig::from_env();
    let storage_config = StorageConfig::from_env();

    let file_storage = LocalFileStorage::new(
        storage_config.base_dir.clone(),
        storage_config.public_url.clone(),
        storage_config.max_upload_bytes,
    );

    AppState {
        users: Arc::new(PgUserRepository::new(db.clone())),
        schools: Arc::new(PgSchoolRepository::new(db)),
        file_storage: Arc::new(file_storage),
        email_sender: email_sender_from_config(&email_config),
        jwt_config: JwtConfig::from_env(),
        otp_config: OtpConfig::from_env(),
        email_config,
        storage_config,
        cors_config: CorsConfig::from_env(),
    }
}
