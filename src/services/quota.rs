use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::QuotaConfig;
use crate::error::{AppError, AppResult};
use crate::models::{DailyServiceUsage, ServiceQueryLimit};

pub struct QuotaService;

impl QuotaService {
    /// Checks and consumes one unit of the user's daily budget for a service.
    ///
    /// Returns `Ok(true)` when the call is allowed (the budget has already
    /// been decremented), `Ok(false)` when today's limit is exhausted.
    /// Storage faults are logged and degrade to `Ok(false)`: billing-adjacent
    /// logic denies on uncertainty rather than allowing unlimited queries.
    /// A malformed request (empty service name) is an error, never a deny.
    pub async fn can_make_query(
        pool: &PgPool,
        config: &QuotaConfig,
        user_id: Uuid,
        service: &str,
    ) -> AppResult<bool> {
        if service.is_empty() {
            return Err(AppError::Validation("service is required".to_string()));
        }

        match Self::try_consume(pool, config, user_id, service).await {
            Ok(allowed) => Ok(allowed),
            Err(e) => {
                log::error!(
                    "Quota check failed for user {} on service '{}', denying: {}",
                    user_id,
                    service,
                    e
                );
                Ok(false)
            }
        }
    }

    /// The transactional check-then-increment.
    ///
    /// The first-call insert races through `ON CONFLICT DO NOTHING`; when a
    /// row already exists, `FOR UPDATE` serializes concurrent checks on the
    /// same (user, service, day) key so two callers can never both observe
    /// headroom and both increment past the limit. Different keys never
    /// contend.
    async fn try_consume(
        pool: &PgPool,
        config: &QuotaConfig,
        user_id: Uuid,
        service: &str,
    ) -> AppResult<bool> {
        let mut tx = pool.begin().await?;

        let daily_limit = Self::effective_limit(&mut tx, config, service).await?;

        if !config.zero_limit_grace && daily_limit == 0 {
            tx.commit().await?;
            return Ok(false);
        }

        let today = Utc::now().date_naive();

        // First call of the day inserts unconditionally with queries_used = 1
        // and is allowed before the limit is consulted. With the default
        // zero-limit grace this holds even at daily_limit = 0.
        let inserted = sqlx::query(
            r#"
            INSERT INTO daily_service_queries (user_id, service, day, queries_used)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (user_id, service, day) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(service)
        .bind(today)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 1 {
            tx.commit().await?;
            return Ok(true);
        }

        let queries_used: i32 = sqlx::query_scalar(
            r#"
            SELECT queries_used
            FROM daily_service_queries
            WHERE user_id = $1 AND service = $2 AND day = $3
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(service)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

        if queries_used >= daily_limit {
            // Reject without mutating state; commit keeps the lazily created
            // limit row.
            tx.commit().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE daily_service_queries
            SET queries_used = queries_used + 1
            WHERE user_id = $1 AND service = $2 AND day = $3
            "#,
        )
        .bind(user_id)
        .bind(service)
        .bind(today)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// Loads the service's daily limit, creating the row with the configured
    /// default on first sight of the service.
    async fn effective_limit(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        config: &QuotaConfig,
        service: &str,
    ) -> AppResult<i32> {
        let existing: Option<i32> =
            sqlx::query_scalar("SELECT daily_limit FROM service_query_limits WHERE service = $1")
                .bind(service)
                .fetch_optional(&mut **tx)
                .await?;

        if let Some(limit) = existing {
            return Ok(limit);
        }

        let default = config.default_limit_for(service);

        sqlx::query(
            r#"
            INSERT INTO service_query_limits (service, daily_limit)
            VALUES ($1, $2)
            ON CONFLICT (service) DO NOTHING
            "#,
        )
        .bind(service)
        .bind(default)
        .execute(&mut **tx)
        .await?;

        // Re-read in case a concurrent first-seen insert won the race
        let limit: i32 =
            sqlx::query_scalar("SELECT daily_limit FROM service_query_limits WHERE service = $1")
                .bind(service)
                .fetch_one(&mut **tx)
                .await?;

        Ok(limit)
    }

    /// Upserts the daily limit for a service (admin-only).
    ///
    /// No effect on already-elapsed days' usage.
    pub async fn set_limit(
        pool: &PgPool,
        service: &str,
        daily_limit: i32,
    ) -> AppResult<ServiceQueryLimit> {
        if service.is_empty() {
            return Err(AppError::Validation("service is required".to_string()));
        }
        if daily_limit < 0 {
            return Err(AppError::Validation(
                "daily_limit must be a non-negative integer".to_string(),
            ));
        }

        let limit = sqlx::query_as::<_, ServiceQueryLimit>(
            r#"
            INSERT INTO service_query_limits (service, daily_limit)
            VALUES ($1, $2)
            ON CONFLICT (service) DO UPDATE SET daily_limit = EXCLUDED.daily_limit
            RETURNING service, daily_limit
            "#,
        )
        .bind(service)
        .bind(daily_limit)
        .fetch_one(pool)
        .await?;

        Ok(limit)
    }

    /// Reads today's recorded usage for a user on one service.
    ///
    /// `None` means the user has not touched the service today.
    pub async fn get_daily_usage(
        pool: &PgPool,
        user_id: Uuid,
        service: &str,
    ) -> AppResult<Option<DailyServiceUsage>> {
        let usage = sqlx::query_as::<_, DailyServiceUsage>(
            r#"
            SELECT user_id, service, day, queries_used
            FROM daily_service_queries
            WHERE user_id = $1 AND service = $2 AND day = $3
            "#,
        )
        .bind(user_id)
        .bind(service)
        .bind(Utc::now().date_naive())
        .fetch_optional(pool)
        .await?;

        Ok(usage)
    }

    /// Lists all configured service limits
    pub async fn list_limits(pool: &PgPool) -> AppResult<Vec<ServiceQueryLimit>> {
        let limits = sqlx::query_as::<_, ServiceQueryLimit>(
            "SELECT service, daily_limit FROM service_query_limits ORDER BY service",
        )
        .fetch_all(pool)
        .await?;

        Ok(limits)
    }
}
