use airport_core::StoreError;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;

use crate::app_config::DatabaseConfig;

/// PostgreSQL-backed store. Seat uniqueness and cascades live in the schema
/// (see `migrations/`); this type maps their violations onto [`StoreError`].
#[derive(Clone)]
pub struct PostgresStore {
    pub(crate) pool: Pool<Postgres>,
}

impl PostgresStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&self.pool)
            .await?;
        info!("Migrations completed successfully.");
        Ok(())
    }
}

/// The violated constraint, if `err` is a constraint violation.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<(ErrorKind, String)> {
    match err {
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            Some((db_err.kind(), constraint))
        }
        _ => None,
    }
}

/// Map a write failure: named constraints through `known`, anything else is a backend error.
pub(crate) fn map_write_error(
    err: sqlx::Error,
    known: impl FnOnce(ErrorKind, &str) -> Option<StoreError>,
) -> StoreError {
    if let Some((kind, constraint)) = violated_constraint(&err) {
        if let Some(mapped) = known(kind, &constraint) {
            return mapped;
        }
    }
    StoreError::backend(err)
}
