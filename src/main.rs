use anyhow::Context;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{info, warn};

use schoolhub::logging::{init_tracing, shutdown_tracer};
use schoolhub::metrics::init_metrics;
use schoolhub::router::init_router;
use schoolhub::state::init_app_state;
use schoolhub_db::{DatabaseConfig, init_db_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;
    let metrics_handle = init_metrics().context("Failed to install metrics recorder")?;

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let state = init_app_state(pool.clone());
    if state.jwt_config.uses_development_secret() {
        warn!("JWT_SECRET is not set; using the development secret");
    }
    if !state.email_config.enabled {
        warn!("SMTP_ENABLED is false; verification codes are only logged");
    }

    let app = init_router(state, metrics_handle);

    let addr = std::env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(server.addr = %addr, "Server running");
    info!("Scalar UI available at http://{}/scalar", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    shutdown_tracer();
    info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
