use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "users" (
        "id"            UUID PRIMARY KEY,
        "username"      TEXT NOT NULL UNIQUE,
        "password_hash" TEXT NOT NULL,
        "created_at"    TIMESTAMPTZ NOT NULL DEFAULT now(),
        "updated_at"    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "products" (
        "seq"        BIGSERIAL NOT NULL UNIQUE,
        "id"         UUID PRIMARY KEY,
        "name"       TEXT NOT NULL CHECK (length(btrim("name")) > 0),
        "price"      DOUBLE PRECISION NOT NULL CHECK ("price" >= 0),
        "quantity"   BIGINT NOT NULL CHECK ("quantity" >= 0),
        "created_at" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "updated_at" TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

/// Owns PostgreSQL pool construction and schema bootstrap
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a pool for `config.url` and make sure the tables exist
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let raw_url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let url = url::Url::parse(raw_url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!("Connected to database at {}", Self::redacted(&url));

        Self::ensure_schema(&pool).await?;
        Ok(pool)
    }

    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Host, port and database name only; credentials stay out of the logs
    fn redacted(url: &url::Url) -> String {
        let host = url.host_str().unwrap_or("localhost");
        match url.port() {
            Some(port) => format!("{}:{}{}", host, port, url.path()),
            None => format!("{}{}", host, url.path()),
        }
    }
}
