use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Outcome of the readiness probe against the quota store
#[derive(Debug, Clone, Copy)]
pub struct StorageStatus {
    /// A round-trip query succeeded
    pub reachable: bool,
    /// The schema migrations ledger exists and is non-empty
    pub migrated: bool,
}

impl StorageStatus {
    pub fn is_ready(&self) -> bool {
        self.reachable && self.migrated
    }
}

/// Opens the connection pool against the quota store.
///
/// Every connection is pinned to UTC so the limiter's day-boundary
/// arithmetic lines up with the DATE columns it writes.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(Some(config.idle_timeout))
        .max_lifetime(Some(config.max_lifetime))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("SET timezone = 'UTC'").execute(conn).await?;
                Ok(())
            })
        });

    let pool = options.connect(&config.url).await?;

    log::info!(
        "Quota store pool ready ({}..{} connections)",
        config.min_connections,
        config.max_connections
    );

    Ok(pool)
}

/// Applies pending schema migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;

    log::info!("Quota store schema is up to date");
    Ok(())
}

/// Probes the quota store for the readiness endpoint.
///
/// The limiter cannot run against an unmigrated store even when the server
/// answers queries, so migration state is reported separately.
pub async fn storage_status(pool: &DbPool) -> StorageStatus {
    let reachable = sqlx::query("SELECT 1").execute(pool).await.is_ok();

    let migrated = reachable
        && sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(pool)
            .await
            .map(|applied| applied > 0)
            .unwrap_or(false);

    StorageStatus {
        reachable,
        migrated,
    }
}
