use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;
use crate::database::store::StoreError;

/// Process-wide connection pool, created lazily from `DATABASE_URL` on first
/// use and shared by every handler.
pub struct DatabaseManager;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

impl DatabaseManager {
    pub async fn pool() -> Result<PgPool, StoreError> {
        POOL.get_or_try_init(|| async {
            let raw = std::env::var("DATABASE_URL")
                .map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))?;
            url::Url::parse(&raw).map_err(|_| StoreError::InvalidDatabaseUrl)?;

            let db = &config::config().database;
            let pool = PgPoolOptions::new()
                .max_connections(db.max_connections)
                .acquire_timeout(Duration::from_secs(db.connection_timeout))
                .connect(&raw)
                .await?;

            info!("created database pool ({} max connections)", db.max_connections);
            Ok(pool)
        })
        .await
        .cloned()
    }

    /// Pings the pool to ensure connectivity.
    pub async fn health_check() -> Result<(), StoreError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (on shutdown).
    pub async fn close() {
        if let Some(pool) = POOL.get() {
            pool.close().await;
            info!("closed database pool");
        }
    }
}
