use anyhow::anyhow;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use schoolhub_core::AppError;
use schoolhub_core::ImageType;
use schoolhub_models::{
    NewSchool, School, SchoolChanges, SchoolId, SchoolSummary, StoredImage, UserId,
};

use crate::metrics::{self, SchoolOperation};
use crate::state::AppState;

use super::model::{CreateSchoolCommand, ImageUpload, UpdateSchoolCommand};

fn not_owned() -> AppError {
    AppError::not_found_or_forbidden(anyhow!("School not found"))
}

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(state, command), fields(school.name = %command.details.name, user.id = %owner))]
    pub async fn create_school(
        state: &AppState,
        owner: UserId,
        command: CreateSchoolCommand,
    ) -> Result<School, AppError> {
        let id = SchoolId::new();
        let image = Self::store_image(state, id, &command.image).await?;

        let new_school = NewSchool {
            id,
            details: command.details,
            image: image.url,
            image_key: image.key,
            creator_id: owner,
        };

        let school = match state.schools.insert(&new_school).await {
            Ok(school) => school,
            Err(e) => {
                Self::discard_image(state, &new_school.image_key).await;
                return Err(e);
            }
        };

        metrics::track_school_operation(SchoolOperation::Create);
        info!(school.id = %school.id, "School created");

        Ok(school)
    }

    #[instrument(skip(state))]
    pub async fn list_schools(state: &AppState) -> Result<Vec<SchoolSummary>, AppError> {
        let schools = state.schools.list().await?;
        debug!(count = schools.len(), "Fetched schools");
        Ok(schools)
    }

    #[instrument(skip(state), fields(school.id = %id))]
    pub async fn get_school(state: &AppState, id: SchoolId) -> Result<School, AppError> {
        state
            .schools
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("School not found")))
    }

    /// Updates a school owned by `owner`. A missing school and someone
    /// else's school are indistinguishable to the caller.
    #[instrument(skip(state, command), fields(school.id = %id, user.id = %owner))]
    pub async fn update_school(
        state: &AppState,
        id: SchoolId,
        owner: UserId,
        command: UpdateSchoolCommand,
    ) -> Result<School, AppError> {
        let existing = state
            .schools
            .find_owned(id, owner)
            .await?
            .ok_or_else(not_owned)?;

        let image = match &command.image {
            Some(upload) => Some(Self::store_image(state, id, upload).await?),
            None => None,
        };
        let replaced_image = image.is_some();

        let changes = SchoolChanges {
            details: command.details,
            image,
        };

        let updated = match state.schools.update_owned(id, owner, &changes).await {
            Ok(Some(school)) => school,
            result => {
                if let Some(new_image) = &changes.image {
                    Self::discard_image(state, &new_image.key).await;
                }
                return Err(result.err().unwrap_or_else(not_owned));
            }
        };

        if replaced_image && existing.image_key != updated.image_key {
            Self::discard_image(state, &existing.image_key).await;
        }

        metrics::track_school_operation(SchoolOperation::Update);
        info!("School updated");

        Ok(updated)
    }

    #[instrument(skip(state), fields(school.id = %id, user.id = %owner))]
    pub async fn delete_school(
        state: &AppState,
        id: SchoolId,
        owner: UserId,
    ) -> Result<(), AppError> {
        let deleted = state
            .schools
            .delete_owned(id, owner)
            .await?
            .ok_or_else(not_owned)?;

        Self::discard_image(state, &deleted.image_key).await;

        metrics::track_school_operation(SchoolOperation::Delete);
        info!("School deleted");

        Ok(())
    }

    /// Saves an uploaded image under `schools/{id}-{millis}.{ext}`.
    async fn store_image(
        state: &AppState,
        id: SchoolId,
        upload: &ImageUpload,
    ) -> Result<StoredImage, AppError> {
        let image_type = ImageType::from_mime(&upload.content_type).ok_or_else(|| {
            AppError::validation(anyhow!(
                "Image type '{}' not allowed. Allowed types: PNG, JPEG, WebP",
                upload.content_type
            ))
        })?;
        let key = format!(
            "schools/{}-{}.{}",
            id,
            Utc::now().timestamp_millis(),
            image_type.extension()
        );

        let save = state
            .file_storage
            .save(&key, &upload.bytes, &upload.content_type);

        let key = match tokio::time::timeout(state.storage_config.timeout, save).await {
            Ok(Ok(key)) => key,
            Ok(Err(e)) if e.is_client_error() => return Err(AppError::validation(e)),
            Ok(Err(e)) => return Err(AppError::internal(e)),
            Err(_) => return Err(AppError::internal(anyhow!("Image upload timed out"))),
        };

        let url = state.file_storage.get_url(&key).map_err(AppError::internal)?;
        debug!(storage.key = %key, "Stored school image");

        Ok(StoredImage { url, key })
    }

    /// Best-effort removal of an image that is no longer referenced.
    async fn discard_image(state: &AppState, key: &str) {
        let delete = state.file_storage.delete(key);

        match tokio::time::timeout(state.storage_config.timeout, delete).await {
            Ok(Ok(())) => debug!(storage.key = %key, "Removed school image"),
            Ok(Err(e)) => warn!(storage.key = %key, error = %e, "Failed to remove school image"),
            Err(_) => warn!(storage.key = %key, "Timed out removing school image"),
        }
    }
}
