use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

use crate::db::{self, DbPool};

#[derive(Serialize)]
pub struct LivenessResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    status: &'static str,
    quota_store: QuotaStoreStatus,
}

#[derive(Serialize)]
pub struct QuotaStoreStatus {
    reachable: bool,
    migrated: bool,
}

/// Liveness check - is the process running?
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(LivenessResponse {
        service: "quotrak",
        status: "ok",
    })
}

/// Readiness check - can the service gate queries?
///
/// Ready only when the quota store answers and its schema is migrated;
/// 503 otherwise so load balancers keep traffic away.
pub async fn readiness(pool: web::Data<DbPool>) -> HttpResponse {
    let storage = db::storage_status(pool.get_ref()).await;

    let (status, http_status) = if storage.is_ready() {
        ("ready", StatusCode::OK)
    } else {
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    HttpResponse::build(http_status).json(ReadinessResponse {
        status,
        quota_store: QuotaStoreStatus {
            reachable: storage.reachable,
            migrated: storage.migrated,
        },
    })
}
