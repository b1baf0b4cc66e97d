use actix_web::{web, HttpResponse};

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::GenerateKeyRequest;
use crate::services::SubscriptionService;

/// POST /api/keys - Issue a new subscription key
pub async fn generate_key(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    body: web::Json<GenerateKeyRequest>,
) -> AppResult<HttpResponse> {
    let key = SubscriptionService::generate_key(pool.get_ref(), body.duration_days).await?;

    Ok(HttpResponse::Created().json(key))
}

/// GET /api/keys/active - List unredeemed keys with derived expiry metadata
pub async fn list_active_keys(pool: web::Data<DbPool>, _auth: AdminAuth) -> AppResult<HttpResponse> {
    let keys = SubscriptionService::list_active_keys(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(keys))
}

/// Configure subscription key routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/keys")
            .route("", web::post().to(generate_key))
            .route("/active", web::get().to(list_active_keys)),
    );
}
