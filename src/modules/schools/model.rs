//! Typed commands decoded from the school multipart forms.
//!
//! Handlers never see raw form fields: a request is either decoded into a
//! [`CreateSchoolCommand`] / [`UpdateSchoolCommand`] or rejected with a
//! validation error naming the offending field.

use std::collections::HashMap;

use anyhow::anyhow;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use utoipa::ToSchema;
use validator::Validate;

use schoolhub_core::AppError;
use schoolhub_models::{SchoolDetails, SchoolDetailsPatch};

use crate::validator::format_errors;

const IMAGE_FIELD: &str = "image";

/// An uploaded image as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone)]
pub struct CreateSchoolCommand {
    pub details: SchoolDetails,
    pub image: ImageUpload,
}

#[derive(Debug, Clone)]
pub struct UpdateSchoolCommand {
    pub details: SchoolDetailsPatch,
    pub image: Option<ImageUpload>,
}

/// Raw multipart form: trimmed text fields plus an optional image.
#[derive(Debug, Default)]
struct SchoolForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::validation(anyhow!("Invalid multipart body: {}", err.body_text()))
}

impl SchoolForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SchoolForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                }
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value.trim().to_string());
            }
        }

        Ok(form)
    }

    /// A non-empty field value.
    fn take(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name).filter(|value| !value.is_empty())
    }

    fn require(&mut self, name: &str) -> Result<String, AppError> {
        self.take(name)
            .ok_or_else(|| AppError::validation(anyhow!("{} is required", name)))
    }
}

impl CreateSchoolCommand {
    pub async fn from_multipart(multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SchoolForm::read(multipart).await?;

        let details = SchoolDetails {
            name: form.require("name")?,
            address: form.require("address")?,
            city: form.require("city")?,
            state: form.require("state")?,
            contact: form.require("contact")?,
            email: form.require("email")?,
        };
        details
            .validate()
            .map_err(|errors| AppError::validation(anyhow!("{}", format_errors(&errors))))?;

        let image = form
            .image
            .take()
            .ok_or_else(|| AppError::validation(anyhow!("Image is required")))?;

        Ok(Self { details, image })
    }
}

impl UpdateSchoolCommand {
    /// Empty fields are treated as absent and keep the stored value.
    pub async fn from_multipart(multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SchoolForm::read(multipart).await?;

        let details = SchoolDetailsPatch {
            name: form.take("name"),
            address: form.take("address"),
            city: form.take("city"),
            state: form.take("state"),
            contact: form.take("contact"),
            email: form.take("email"),
        };
        details
            .validate()
            .map_err(|errors| AppError::validation(anyhow!("{}", format_errors(&errors))))?;

        Ok(Self {
            details,
            image: form.image.take(),
        })
    }
}

/// `multipart/form-data` body for creating a school.
#[derive(ToSchema)]
pub struct CreateSchoolForm {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email: String,
    /// PNG, JPEG or WebP
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// `multipart/form-data` body for updating a school. Every part is optional.
#[derive(ToSchema)]
pub struct UpdateSchoolForm {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}
