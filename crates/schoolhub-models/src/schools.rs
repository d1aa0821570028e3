//! School domain models and DTOs.
//!
//! Schools are publicly readable. Only the creating user may update or
//! delete one, so every row carries its `creator_id`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{SchoolId, UserId};

/// A stored school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email: String,
    /// Public URL of the school image.
    pub image: String,
    /// Storage key backing `image`.
    #[serde(skip)]
    pub image_key: String,
    pub creator_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing projection of a school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct SchoolSummary {
    pub id: SchoolId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub image: String,
}

impl From<&School> for SchoolSummary {
    fn from(school: &School) -> Self {
        Self {
            id: school.id,
            name: school.name.clone(),
            address: school.address.clone(),
            city: school.city.clone(),
            image: school.image.clone(),
        }
    }
}

/// Text fields of a school as submitted on creation.
#[derive(Debug, Clone, Validate)]
pub struct SchoolDetails {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "contact is required"))]
    pub contact: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
}

/// Partial text fields submitted on update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Validate)]
pub struct SchoolDetailsPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "address must not be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: Option<String>,
    #[validate(length(min = 1, message = "state must not be empty"))]
    pub state: Option<String>,
    #[validate(length(min = 1, message = "contact must not be empty"))]
    pub contact: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
}

/// Row to insert for a newly created school.
#[derive(Debug, Clone)]
pub struct NewSchool {
    pub id: SchoolId,
    pub details: SchoolDetails,
    pub image: String,
    pub image_key: String,
    pub creator_id: UserId,
}

/// A stored image reference: public URL plus storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub key: String,
}

/// Changes applied to an owned school.
#[derive(Debug, Clone, Default)]
pub struct SchoolChanges {
    pub details: SchoolDetailsPatch,
    pub image: Option<StoredImage>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateSchoolResponse {
    #[schema(example = "School added successfully")]
    pub message: String,
    pub data: School,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateSchoolResponse {
    #[schema(example = "School updated successfully")]
    pub message: String,
    pub school: School,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolListResponse {
    pub message: String,
    pub result: Vec<SchoolSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolResponse {
    pub message: String,
    pub result: School,
}

/// Generic `{message}` body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_school() -> School {
        let now = Utc::now();
        School {
            id: SchoolId::new(),
            name: "Green Valley High".to_string(),
            address: "12 Hill Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            contact: "9876543210".to_string(),
            email: "office@greenvalley.edu".to_string(),
            image: "http://localhost:3000/files/schools/a.png".to_string(),
            image_key: "schools/a.png".to_string(),
            creator_id: UserId::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_school_serialization_hides_image_key() {
        let json = serde_json::to_value(sample_school()).unwrap();
        assert!(json.get("image_key").is_none());
        assert!(json.get("creator_id").is_some());
        assert_eq!(json["image"], "http://localhost:3000/files/schools/a.png");
    }

    #[test]
    fn test_summary_from_school() {
        let school = sample_school();
        let summary = SchoolSummary::from(&school);
        assert_eq!(summary.id, school.id);
        assert_eq!(summary.city, "Pune");
    }

    #[test]
    fn test_details_validation() {
        let details = SchoolDetails {
            name: String::new(),
            address: "12 Hill Road".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            contact: "9876543210".to_string(),
            email: "nope".to_string(),
        };

        let errors = details.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("city"));
    }

    #[test]
    fn test_patch_validation_ignores_absent_fields() {
        let patch = SchoolDetailsPatch {
            city: Some("Mumbai".to_string()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());

        let patch = SchoolDetailsPatch {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
