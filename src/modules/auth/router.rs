use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{login, register, verify_otp};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-otp", post(verify_otp))
        .route("/login", post(login))
}
