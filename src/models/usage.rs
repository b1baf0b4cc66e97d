use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifetime aggregate query counter, independent of per-service limiting
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserQueryTotal {
    pub user_id: Uuid,
    pub queries_used: i64,
    pub last_updated: DateTime<Utc>,
}

/// Append-only search event (best-effort telemetry, not billing-grade)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSearch {
    pub user_id: Uuid,
    pub search_type: String,
    pub added_at: DateTime<Utc>,
}
