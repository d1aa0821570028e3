use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::PropagateRequestIdLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetRequestHeaderLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};

use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware, new_request_id};
use crate::metrics::{metrics_middleware, metrics_router};
use crate::modules::auth::init_auth_router;
use crate::modules::health::health;
use crate::modules::schools::init_schools_router;
use crate::state::AppState;

/// Builds the full application router. `/metrics` is mounted only when a
/// Prometheus handle is supplied.
///
/// Every response echoes the caller's `x-request-id`, or a generated one.
pub fn init_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let cors = {
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    };

    let mut router = Router::new()
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .route("/health", get(health))
        .nest("/auth", init_auth_router())
        .nest(
            "/schools",
            init_schools_router(state.storage_config.max_upload_bytes),
        )
        .nest_service("/files", ServeDir::new(&state.storage_config.base_dir));

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics_router(handle));
    }

    // Outermost first: the request id is assigned before anything logs.
    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                REQUEST_ID_HEADER,
                |_: &_| new_request_id(),
            ))
            .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
            .layer(middleware::from_fn(logging_middleware))
            .layer(middleware::from_fn(metrics_middleware))
            .layer(cors),
    )
}
