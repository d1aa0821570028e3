//! Prometheus metrics.
//!
//! HTTP traffic is recorded by [`metrics_middleware`]; the auth and school
//! services call the `track_*` helpers for business counters. Everything is
//! a no-op when `OBSERVABILITY_ENABLED` is `false` or `0`.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

const REQUEST_DURATION: &str = "http_request_duration_seconds";
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0"))
            .unwrap_or(true)
    })
}

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;

    let upkeep = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    Ok(Some(handle))
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Records request count, latency and in-flight requests per matched route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let started = Instant::now();
    let method = req.method().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_owned(), |p| p.as_str().to_owned());

    let in_flight = gauge!("http_requests_active");
    in_flight.increment(1.0);

    let response = next.run(req).await;

    in_flight.decrement(1.0);

    let status = response.status().as_u16();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => route.clone(),
        "status" => status.to_string(),
        "class" => status_class(status)
    )
    .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "path" => route)
        .record(started.elapsed().as_secs_f64());

    response
}

/// `GET /metrics` in Prometheus text format.
pub fn metrics_router<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// Result of an OTP verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
    Verified,
    AlreadyVerified,
    Invalid,
    Expired,
}

impl OtpOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::AlreadyVerified => "already_verified",
            Self::Invalid => "invalid",
            Self::Expired => "expired",
        }
    }
}

/// Why a login was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    UnknownEmail,
    WrongPassword,
    Unverified,
}

impl LoginFailure {
    fn as_str(self) -> &'static str {
        match self {
            Self::UnknownEmail => "unknown_email",
            Self::WrongPassword => "wrong_password",
            Self::Unverified => "unverified",
        }
    }
}

/// A write to a school.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolOperation {
    Create,
    Update,
    Delete,
}

impl SchoolOperation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

pub fn track_user_registered() {
    if is_observability_enabled() {
        counter!("users_registered_total").increment(1);
    }
}

pub fn track_otp_verification(outcome: OtpOutcome) {
    if is_observability_enabled() {
        counter!("otp_verifications_total", "outcome" => outcome.as_str()).increment(1);
    }
}

/// Counts a successful login and the token issued with it.
pub fn track_login_success() {
    if is_observability_enabled() {
        counter!("user_logins_total", "status" => "success").increment(1);
        counter!("jwt_tokens_issued_total").increment(1);
    }
}

pub fn track_login_failure(reason: LoginFailure) {
    if is_observability_enabled() {
        counter!("user_logins_total", "status" => "failure", "reason" => reason.as_str())
            .increment(1);
    }
}

pub fn track_school_operation(operation: SchoolOperation) {
    if is_observability_enabled() {
        counter!("school_operations_total", "operation" => operation.as_str()).increment(1);
    }
}
