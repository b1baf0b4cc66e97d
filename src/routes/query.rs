use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::{QuotaService, SubscriptionService, UsageService};

#[derive(Debug, Deserialize)]
pub struct AuthorizeQueryRequest {
    pub user_id: Uuid,
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeQueryResponse {
    pub allowed: bool,
    pub service: String,
    pub lifetime_queries: i64,
}

/// POST /api/query/authorize - Gate one call to a downstream service.
///
/// Subscription check, then quota check, then usage recording; the caller
/// forwards to the provider only on 200. Rejections: 403 when no active
/// subscription, 429 when today's budget for the service is exhausted.
/// Quota consumption and usage recording run as two separate transactions;
/// a crash between them under-counts the lifetime aggregate only.
pub async fn authorize_query(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    _auth: AdminAuth,
    body: web::Json<AuthorizeQueryRequest>,
) -> AppResult<HttpResponse> {
    let AuthorizeQueryRequest { user_id, service } = body.into_inner();

    if SubscriptionService::get_active(pool.get_ref(), user_id)
        .await?
        .is_none()
    {
        return Err(AppError::SubscriptionRequired);
    }

    if !QuotaService::can_make_query(pool.get_ref(), &config.quota, user_id, &service).await? {
        return Err(AppError::QuotaExceeded(service));
    }

    let lifetime_queries = UsageService::record_query(pool.get_ref(), user_id, &service).await?;

    Ok(HttpResponse::Ok().json(AuthorizeQueryResponse {
        allowed: true,
        service,
        lifetime_queries,
    }))
}

/// Configure query authorization routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/query").route("/authorize", web::post().to(authorize_query)),
    );
}
