//! # SchoolHub DB
//!
//! PostgreSQL pool lifecycle for the SchoolHub API.
//!
//! The pool is created once at process start, handed to the repositories
//! through the application state and closed after the HTTP server has
//! drained.
//!
//! # Example
//!
//! ```ignore
//! use schoolhub_db::{DatabaseConfig, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! // ... serve ...
//! pool.close().await;
//! ```

use std::env;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Reads `DATABASE_URL` (required) and `DATABASE_MAX_CONNECTIONS` (default 5).
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            url: env::var("DATABASE_URL")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        })
    }
}

/// Initializes a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be shared rather than
/// recreated per request.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(
        db.max_connections = config.max_connections,
        "Database pool initialized"
    );
    Ok(pool)
}

/// Applies the embedded migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
