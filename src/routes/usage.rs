use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::{QuotaService, UsageService};

/// Cap on the search-event readback; the log is telemetry, not an archive
const RECENT_SEARCHES_LIMIT: i64 = 50;

/// GET /api/usage/{user_id} - Lifetime query total for a user
pub async fn get_total(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let total = UsageService::get_total(pool.get_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No usage recorded for this user".to_string()))?;

    Ok(HttpResponse::Ok().json(total))
}

/// GET /api/usage/{user_id}/searches - Most recent search events, newest first
pub async fn recent_searches(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let searches =
        UsageService::recent_searches(pool.get_ref(), user_id, RECENT_SEARCHES_LIMIT).await?;

    Ok(HttpResponse::Ok().json(searches))
}

/// GET /api/usage/{user_id}/daily/{service} - Today's usage on one service
pub async fn get_daily_usage(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<(Uuid, String)>,
) -> AppResult<HttpResponse> {
    let (user_id, service) = path.into_inner();
    let usage = QuotaService::get_daily_usage(pool.get_ref(), user_id, &service)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No usage recorded today for service '{}'",
                service
            ))
        })?;

    Ok(HttpResponse::Ok().json(usage))
}

/// Configure usage readback routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/usage")
            .route("/{user_id}", web::get().to(get_total))
            .route("/{user_id}/searches", web::get().to(recent_searches))
            .route("/{user_id}/daily/{service}", web::get().to(get_daily_usage)),
    );
}
