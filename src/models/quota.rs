use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Daily call budget for a downstream service.
///
/// Exactly one row per service name; created lazily with the configured
/// default the first time the limiter sees a service, or explicitly by the
/// admin set-limit endpoint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceQueryLimit {
    pub service: String,
    pub daily_limit: i32,
}

/// Per-user, per-service usage for one UTC calendar day
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyServiceUsage {
    pub user_id: Uuid,
    pub service: String,
    pub day: NaiveDate,
    pub queries_used: i32,
}

/// DTO for the admin set-limit upsert
#[derive(Debug, Deserialize)]
pub struct SetServiceLimit {
    pub daily_limit: i32,
}
