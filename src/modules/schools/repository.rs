//! School store. Every write that needs ownership matches on `id` and
//! `creator_id` together.

use sqlx::PgPool;

use schoolhub_core::{AppError, BoxFuture};
use schoolhub_models::{NewSchool, School, SchoolChanges, SchoolId, SchoolSummary, UserId};

pub trait SchoolRepository: Send + Sync {
    fn insert<'a>(&'a self, school: &'a NewSchool) -> BoxFuture<'a, Result<School, AppError>>;

    /// All schools, newest first.
    fn list(&self) -> BoxFuture<'_, Result<Vec<SchoolSummary>, AppError>>;

    fn find_by_id(&self, id: SchoolId) -> BoxFuture<'_, Result<Option<School>, AppError>>;

    /// The school if it exists and was created by `owner`.
    fn find_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>>;

    /// Applies `changes` to a school owned by `owner`. Absent fields keep
    /// their stored value.
    fn update_owned<'a>(
        &'a self,
        id: SchoolId,
        owner: UserId,
        changes: &'a SchoolChanges,
    ) -> BoxFuture<'a, Result<Option<School>, AppError>>;

    /// Deletes a school owned by `owner` and returns the removed row.
    fn delete_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>>;
}

const SCHOOL_COLUMNS: &str = "id, name, address, city, state, contact, email, image, image_key, \
     creator_id, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgSchoolRepository {
    db: PgPool,
}

impl PgSchoolRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl SchoolRepository for PgSchoolRepository {
    fn insert<'a>(&'a self, school: &'a NewSchool) -> BoxFuture<'a, Result<School, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, School>(&format!(
                "INSERT INTO schools
                    (id, name, address, city, state, contact, email, image, image_key, creator_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                 RETURNING {}",
                SCHOOL_COLUMNS
            ))
            .bind(school.id)
            .bind(&school.details.name)
            .bind(&school.details.address)
            .bind(&school.details.city)
            .bind(&school.details.state)
            .bind(&school.details.contact)
            .bind(&school.details.email)
            .bind(&school.image)
            .bind(&school.image_key)
            .bind(school.creator_id)
            .fetch_one(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn list(&self) -> BoxFuture<'_, Result<Vec<SchoolSummary>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, SchoolSummary>(
                "SELECT id, name, address, city, image FROM schools ORDER BY created_at DESC",
            )
            .fetch_all(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn find_by_id(&self, id: SchoolId) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, School>(&format!(
                "SELECT {} FROM schools WHERE id = $1",
                SCHOOL_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn find_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, School>(&format!(
                "SELECT {} FROM schools WHERE id = $1 AND creator_id = $2",
                SCHOOL_COLUMNS
            ))
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn update_owned<'a>(
        &'a self,
        id: SchoolId,
        owner: UserId,
        changes: &'a SchoolChanges,
    ) -> BoxFuture<'a, Result<Option<School>, AppError>> {
        Box::pin(async move {
            let details = &changes.details;
            let image = changes.image.as_ref();

            sqlx::query_as::<_, School>(&format!(
                "UPDATE schools
                 SET name = COALESCE($3, name),
                     address = COALESCE($4, address),
                     city = COALESCE($5, city),
                     state = COALESCE($6, state),
                     contact = COALESCE($7, contact),
                     email = COALESCE($8, email),
                     image = COALESCE($9, image),
                     image_key = COALESCE($10, image_key),
                     updated_at = NOW()
                 WHERE id = $1 AND creator_id = $2
                 RETURNING {}",
                SCHOOL_COLUMNS
            ))
            .bind(id)
            .bind(owner)
            .bind(details.name.as_deref())
            .bind(details.address.as_deref())
            .bind(details.city.as_deref())
            .bind(details.state.as_deref())
            .bind(details.contact.as_deref())
            .bind(details.email.as_deref())
            .bind(image.map(|i| i.url.as_str()))
            .bind(image.map(|i| i.key.as_str()))
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }

    fn delete_owned(
        &self,
        id: SchoolId,
        owner: UserId,
    ) -> BoxFuture<'_, Result<Option<School>, AppError>> {
        Box::pin(async move {
            sqlx::query_as::<_, School>(&format!(
                "DELETE FROM schools WHERE id = $1 AND creator_id = $2 RETURNING {}",
                SCHOOL_COLUMNS
            ))
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.db)
            .await
            .map_err(AppError::persistence)
        })
    }
}
