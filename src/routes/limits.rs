use actix_web::{web, HttpResponse};

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::SetServiceLimit;
use crate::services::QuotaService;

/// PUT /api/limits/{service} - Upsert the daily limit for a service
pub async fn set_limit(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<String>,
    body: web::Json<SetServiceLimit>,
) -> AppResult<HttpResponse> {
    let service = path.into_inner();
    let limit = QuotaService::set_limit(pool.get_ref(), &service, body.daily_limit).await?;

    Ok(HttpResponse::Ok().json(limit))
}

/// GET /api/limits - List all configured service limits
pub async fn list_limits(pool: web::Data<DbPool>, _auth: AdminAuth) -> AppResult<HttpResponse> {
    let limits = QuotaService::list_limits(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(limits))
}

/// Configure service limit routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/limits")
            .route("", web::get().to(list_limits))
            .route("/{service}", web::put().to(set_limit)),
    );
}
