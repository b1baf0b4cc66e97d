use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::RedeemKeyRequest;
use crate::services::SubscriptionService;

/// POST /api/subscriptions/redeem - Redeem a key for a user.
///
/// An invalid or consumed key is a 200 with `success: false`; it is an
/// expected outcome, not a fault.
pub async fn redeem(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    body: web::Json<RedeemKeyRequest>,
) -> AppResult<HttpResponse> {
    let RedeemKeyRequest { user_id, key } = body.into_inner();
    let outcome = SubscriptionService::redeem_key(pool.get_ref(), user_id, &key).await?;

    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/subscriptions/{user_id} - The user's active subscription
pub async fn get_active(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let subscription = SubscriptionService::get_active(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No active subscription for user {}", user_id)))?;

    Ok(HttpResponse::Ok().json(subscription))
}

/// Configure subscription routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/subscriptions")
            .route("/redeem", web::post().to(redeem))
            .route("/{user_id}", web::get().to(get_active)),
    );
}
