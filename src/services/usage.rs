use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{UserQueryTotal, UserSearch};

pub struct UsageService;

impl UsageService {
    /// Records one accepted call: bumps the lifetime aggregate counter and
    /// appends a search event, in one transaction.
    ///
    /// Callers must invoke this only after the quota check allowed the call,
    /// and exactly once per accepted call; there is no automatic linkage to
    /// the limiter. The event insert suppresses duplicate-key conflicts
    /// silently: the log is best-effort telemetry, the counter is the
    /// authoritative write.
    ///
    /// Returns the new lifetime total.
    pub async fn record_query(pool: &PgPool, user_id: Uuid, service: &str) -> AppResult<i64> {
        if service.is_empty() {
            return Err(AppError::Validation("service is required".to_string()));
        }

        let mut tx = pool.begin().await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_query_totals (user_id, queries_used)
            VALUES ($1, 1)
            ON CONFLICT (user_id) DO UPDATE
                SET queries_used = user_query_totals.queries_used + 1,
                    last_updated = NOW()
            RETURNING queries_used
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_searches (user_id, search_type)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(service)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(total)
    }

    /// Reads a user's lifetime aggregate, if any calls were ever recorded
    pub async fn get_total(pool: &PgPool, user_id: Uuid) -> AppResult<Option<UserQueryTotal>> {
        let total = sqlx::query_as::<_, UserQueryTotal>(
            "SELECT user_id, queries_used, last_updated FROM user_query_totals WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(total)
    }

    /// Lists a user's most recent search events, newest first
    pub async fn recent_searches(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<UserSearch>> {
        let searches = sqlx::query_as::<_, UserSearch>(
            r#"
            SELECT user_id, search_type, added_at
            FROM user_searches
            WHERE user_id = $1
            ORDER BY added_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(searches)
    }
}
