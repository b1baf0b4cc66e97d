use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Subscription status values stored in the `status` column
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const EXPIRED: &str = "expired";
    #[allow(dead_code)] // Reserved for payment flows that settle asynchronously
    pub const PENDING: &str = "pending";
}

/// A user's subscription validity window
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: String,
}

/// Single-use redemption code that grants or extends a subscription
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubscriptionKey {
    pub id: Uuid,
    pub key: String,
    pub duration_days: i32,
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub used_by: Option<Uuid>,
    pub used_at: Option<DateTime<Utc>>,
}

impl SubscriptionKey {
    /// Informational redeem-by metadata for admin listings (not enforced)
    pub fn to_active_info(&self) -> ActiveKeyInfo {
        ActiveKeyInfo {
            key: self.key.clone(),
            duration_days: self.duration_days,
            created_at: self.created_at,
            expires_at: self.created_at + Duration::days(self.duration_days as i64),
            is_active: !self.is_used,
            used_by: self.used_by,
        }
    }
}

/// Unredeemed key with derived expiry metadata (admin listing)
#[derive(Debug, Serialize)]
pub struct ActiveKeyInfo {
    pub key: String,
    pub duration_days: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    pub used_by: Option<Uuid>,
}

/// DTO for issuing a new subscription key
#[derive(Debug, Deserialize)]
pub struct GenerateKeyRequest {
    pub duration_days: i32,
}

/// DTO for redeeming a key on behalf of a user
#[derive(Debug, Deserialize)]
pub struct RedeemKeyRequest {
    pub user_id: Uuid,
    pub key: String,
}

/// Outcome of a redemption attempt.
///
/// An invalid or already-consumed key is an expected outcome, not a fault,
/// so it is modeled as `success: false` rather than an error.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct KeyRedemption {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i32>,
}

impl KeyRedemption {
    pub fn activated(duration_days: i32) -> Self {
        Self {
            success: true,
            message: format!("Subscription activated for {} days", duration_days),
            duration_days: Some(duration_days),
        }
    }

    pub fn extended(duration_days: i32) -> Self {
        Self {
            success: true,
            message: format!("Subscription extended by {} days", duration_days),
            duration_days: Some(duration_days),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            message: "Invalid or already used subscription key".to_string(),
            duration_days: None,
        }
    }
}
