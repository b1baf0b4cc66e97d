use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::subscription::status;
use crate::models::{ActiveKeyInfo, KeyRedemption, Subscription, SubscriptionKey};

pub struct SubscriptionService;

impl SubscriptionService {
    /// Gets the user's active subscription, if any.
    ///
    /// Expiry is lazy: there is no background sweep, so a stored-active row
    /// whose expiry has passed is flipped to "expired" here, and the flip is
    /// persisted before returning `None`. Callers never observe a
    /// subscription object that is already past its expiry date.
    pub async fn get_active(pool: &PgPool, user_id: Uuid) -> AppResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, start_date, expiry_date, status
            FROM subscriptions
            WHERE user_id = $1 AND status = $2
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(status::ACTIVE)
        .fetch_optional(pool)
        .await?;

        let Some(subscription) = subscription else {
            return Ok(None);
        };

        if Utc::now() > subscription.expiry_date {
            sqlx::query("UPDATE subscriptions SET status = $2 WHERE id = $1")
                .bind(subscription.id)
                .bind(status::EXPIRED)
                .execute(pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(subscription))
    }

    /// Issues a new single-use subscription key
    pub async fn generate_key(pool: &PgPool, duration_days: i32) -> AppResult<SubscriptionKey> {
        if duration_days <= 0 {
            return Err(AppError::Validation(
                "duration_days must be a positive integer".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let code = format_key_code(id, duration_days, created_at);

        let key = sqlx::query_as::<_, SubscriptionKey>(
            r#"
            INSERT INTO subscription_keys (id, key, duration_days, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, key, duration_days, is_used, created_at, used_by, used_at
            "#,
        )
        .bind(id)
        .bind(&code)
        .bind(duration_days)
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(key)
    }

    /// Redeems a key for a user, activating or extending their subscription.
    ///
    /// The whole redemption runs in one transaction. The `is_used = FALSE`
    /// predicate on the marking UPDATE is the compare-and-set guard: of two
    /// concurrent redeemers of the same key, exactly one matches the row and
    /// the other gets a clean `success: false` result. The rejection message
    /// never distinguishes missing from already-consumed keys.
    pub async fn redeem_key(pool: &PgPool, user_id: Uuid, key: &str) -> AppResult<KeyRedemption> {
        let mut tx = pool.begin().await?;

        let consumed = sqlx::query_as::<_, SubscriptionKey>(
            r#"
            UPDATE subscription_keys
            SET is_used = TRUE, used_by = $1, used_at = NOW()
            WHERE key = $2 AND is_used = FALSE
            RETURNING id, key, duration_days, is_used, created_at, used_by, used_at
            "#,
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(consumed) = consumed else {
            tx.rollback().await?;
            return Ok(KeyRedemption::rejected());
        };

        // Lock the user's active subscription so concurrent redemptions by
        // the same user serialize on the extension arithmetic.
        let active = sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, start_date, expiry_date, status
            FROM subscriptions
            WHERE user_id = $1 AND status = $2
            ORDER BY start_date DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(status::ACTIVE)
        .fetch_optional(&mut *tx)
        .await?;

        let now = Utc::now();
        let duration_days = consumed.duration_days;

        let outcome = match active {
            // Stacking: extend from the existing expiry, not from now. A user
            // with 10 days left who redeems a 30-day key ends up with 40.
            Some(subscription) if subscription.expiry_date > now => {
                sqlx::query(
                    r#"
                    UPDATE subscriptions
                    SET expiry_date = expiry_date + make_interval(days => $2)
                    WHERE id = $1
                    "#,
                )
                .bind(subscription.id)
                .bind(duration_days)
                .execute(&mut *tx)
                .await?;

                KeyRedemption::extended(duration_days)
            }
            // Stale active row that lazy expiry hasn't visited yet: expire it
            // and start a fresh window from now.
            Some(stale) => {
                sqlx::query("UPDATE subscriptions SET status = $2 WHERE id = $1")
                    .bind(stale.id)
                    .bind(status::EXPIRED)
                    .execute(&mut *tx)
                    .await?;

                Self::insert_subscription(&mut tx, user_id, now, duration_days).await?;
                KeyRedemption::activated(duration_days)
            }
            None => {
                Self::insert_subscription(&mut tx, user_id, now, duration_days).await?;
                KeyRedemption::activated(duration_days)
            }
        };

        tx.commit().await?;

        Ok(outcome)
    }

    async fn insert_subscription(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        now: DateTime<Utc>,
        duration_days: i32,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, start_date, expiry_date, status)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(now + Duration::days(duration_days as i64))
        .bind(status::ACTIVE)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("subscriptions_one_active_per_user") {
                    return AppError::Conflict(
                        "User already has an active subscription".to_string(),
                    );
                }
            }
            AppError::Database(e)
        })?;

        Ok(())
    }

    /// Lists all unredeemed keys with derived expiry metadata (admin-only)
    pub async fn list_active_keys(pool: &PgPool) -> AppResult<Vec<ActiveKeyInfo>> {
        let keys = sqlx::query_as::<_, SubscriptionKey>(
            r#"
            SELECT id, key, duration_days, is_used, created_at, used_by, used_at
            FROM subscription_keys
            WHERE is_used = FALSE
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(keys.iter().map(|k| k.to_active_info()).collect())
    }
}

/// Computes the human-presentable display code for a subscription key.
///
/// SHA-256 over (key id, duration, creation instant), truncated to the first
/// 16 hex characters, uppercased, grouped in dash-separated blocks of four.
/// The random key id in the hash input makes collisions practically require
/// a duplicate UUID.
pub fn format_key_code(id: Uuid, duration_days: i32, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(duration_days.to_be_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    let digest = hex::encode(hasher.finalize());

    digest[..16]
        .to_uppercase()
        .as_bytes()
        .chunks(4)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("-")
}
