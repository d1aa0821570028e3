use anyhow::anyhow;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use schoolhub_core::AppError;
use schoolhub_models::{
    CreateSchoolResponse, MessageResponse, SchoolId, SchoolListResponse, SchoolResponse,
    UpdateSchoolResponse,
};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;

use super::model::{CreateSchoolCommand, CreateSchoolForm, UpdateSchoolCommand, UpdateSchoolForm};
use super::service::SchoolService;

fn parse_school_id(id: &str) -> Result<SchoolId, AppError> {
    id.parse()
        .map_err(|_| AppError::validation(anyhow!("Invalid school id")))
}

fn multipart_body(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, AppError> {
    multipart.map_err(|e| AppError::validation(anyhow!("Invalid multipart body: {}", e.body_text())))
}

/// Create a school owned by the caller
#[utoipa::path(
    post,
    path = "/schools",
    request_body(content = CreateSchoolForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "School created", body = CreateSchoolResponse),
        (status = 400, description = "Missing field, missing image or unsupported image", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, multipart), fields(user.id = %auth_user.user_id()))]
pub async fn create_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreateSchoolResponse>), AppError> {
    let command = CreateSchoolCommand::from_multipart(multipart_body(multipart)?).await?;
    let school = SchoolService::create_school(&state, auth_user.user_id(), command).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSchoolResponse {
            message: "School added successfully".to_string(),
            data: school,
        }),
    ))
}

/// List all schools
#[utoipa::path(
    get,
    path = "/schools",
    responses(
        (status = 200, description = "All schools, newest first", body = SchoolListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn list_schools(
    State(state): State<AppState>,
) -> Result<Json<SchoolListResponse>, AppError> {
    let schools = SchoolService::list_schools(&state).await?;

    Ok(Json(SchoolListResponse {
        message: "Schools fetched successfully".to_string(),
        result: schools,
    }))
}

/// Get a school by ID
#[utoipa::path(
    get,
    path = "/schools/{id}",
    params(
        ("id" = String, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School details", body = SchoolResponse),
        (status = 400, description = "Invalid school id", body = ErrorResponse),
        (status = 404, description = "School not found", body = ErrorResponse)
    ),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SchoolResponse>, AppError> {
    let id = parse_school_id(&id)?;
    let school = SchoolService::get_school(&state, id).await?;

    Ok(Json(SchoolResponse {
        message: "School found successfully".to_string(),
        result: school,
    }))
}

/// Update a school owned by the caller
#[utoipa::path(
    put,
    path = "/schools/{id}",
    params(
        ("id" = String, Path, description = "School ID")
    ),
    request_body(content = UpdateSchoolForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "School updated", body = UpdateSchoolResponse),
        (status = 400, description = "Invalid school id or field", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "School not found or not owned by caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, multipart), fields(user.id = %auth_user.user_id()))]
pub async fn update_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UpdateSchoolResponse>, AppError> {
    let id = parse_school_id(&id)?;
    let command = UpdateSchoolCommand::from_multipart(multipart_body(multipart)?).await?;
    let school = SchoolService::update_school(&state, id, auth_user.user_id(), command).await?;

    Ok(Json(UpdateSchoolResponse {
        message: "School updated successfully".to_string(),
        school,
    }))
}

/// Delete a school owned by the caller
#[utoipa::path(
    delete,
    path = "/schools/{id}",
    params(
        ("id" = String, Path, description = "School ID")
    ),
    responses(
        (status = 200, description = "School deleted", body = MessageResponse),
        (status = 400, description = "Invalid school id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "School not found or not owned by caller", body = ErrorResponse)
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.user_id()))]
pub async fn delete_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_school_id(&id)?;
    SchoolService::delete_school(&state, id, auth_user.user_id()).await?;

    Ok(Json(MessageResponse {
        message: "School deleted successfully".to_string(),
    }))
}
