//! Tracing setup and per-request logging.
//!
//! Console output is always on. Two daily-rotated files under
//! `storage/logs/` collect errors (plain text) and everything at `info` and
//! above (JSON). When observability is enabled an OTLP layer exports spans to
//! the collector at `OTEL_EXPORTER_OTLP_ENDPOINT`; if the exporter cannot be
//! built the service keeps running with local logging only.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{self as sdktrace, RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing::{Instrument, Level, debug, error, info, info_span, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::metrics::is_observability_enabled;

const LOG_DIR: &str = "storage/logs";

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// A fresh request id for requests that arrive without one.
pub fn new_request_id() -> Option<HeaderValue> {
    HeaderValue::from_str(&uuid::Uuid::new_v4().to_string()).ok()
}

fn severity(status: u16) -> Level {
    match status {
        500..=599 => Level::ERROR,
        400..=499 => Level::WARN,
        _ => Level::INFO,
    }
}

/// Logs one line per request at a level chosen from the response status,
/// inside a span carrying the request id and matched route.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| req.uri().path().to_owned(), |p| p.as_str().to_owned());
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none")
        .to_owned();

    let span = info_span!(
        "http.request",
        http.method = %method,
        http.route = %route,
        request_id = %request_id
    );

    async move {
        debug!("Incoming request");

        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = started.elapsed().as_millis();

        let level = severity(status);
        if level == Level::ERROR {
            error!(status, latency_ms, "Server error");
        } else if level == Level::WARN {
            warn!(status, latency_ms, "Client error");
        } else {
            info!(status, latency_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

fn otel_resource() -> Resource {
    Resource::new(vec![
        KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "environment",
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        ),
    ])
}

fn init_tracer() -> Result<Tracer, TraceError> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    global::set_text_map_propagator(TraceContextPropagator::new());

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            sdktrace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(otel_resource()),
        )
        .install_batch(runtime::Tokio)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn local_layers() -> Vec<BoxedLayer> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,schoolhub_core=info,tower_http=warn,sqlx=warn",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console: BoxedLayer = fmt::layer()
        .compact()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(console_filter)
        .boxed();

    let errors: BoxedLayer = fmt::layer()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            LOG_DIR,
            "schoolhub.log",
        ))
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(EnvFilter::new("error"))
        .boxed();

    let structured: BoxedLayer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(
            Rotation::DAILY,
            LOG_DIR,
            "schoolhub.json",
        ))
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"))
        .boxed();

    vec![console, errors, structured]
}

/// Installs the global subscriber.
pub fn init_tracing() -> std::io::Result<()> {
    std::fs::create_dir_all(LOG_DIR)?;

    let registry = tracing_subscriber::registry().with(local_layers());

    if !is_observability_enabled() {
        registry.init();
        info!("Tracing initialized (observability disabled)");
        return Ok(());
    }

    match init_tracer() {
        Ok(tracer) => {
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
            info!("Tracing initialized with OpenTelemetry export");
        }
        Err(e) => {
            registry.init();
            warn!(error = %e, "OpenTelemetry unavailable, logging locally only");
        }
    }

    Ok(())
}

/// Flushes pending spans to the collector.
pub fn shutdown_tracer() {
    if is_observability_enabled() {
        global::shutdown_tracer_provider();
        info!("OpenTelemetry tracer shut down");
    }
}
