use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_school, delete_school, get_school, list_schools, update_school};

/// Room for the text parts and multipart framing around the image.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn init_schools_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", post(create_school).get(list_schools))
        .route(
            "/{id}",
            get(get_school).put(update_school).delete(delete_school),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes + FORM_OVERHEAD_BYTES))
}
