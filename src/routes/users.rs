use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::CreateUser;
use crate::services::UsersService;

/// POST /api/users - Create a user identity record
pub async fn create_user(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    body: web::Json<CreateUser>,
) -> AppResult<HttpResponse> {
    let user = UsersService::create(pool.get_ref(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(user))
}

/// GET /api/users/{id} - Fetch a user
pub async fn get_user(
    pool: web::Data<DbPool>,
    _auth: AdminAuth,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let user = UsersService::get_by_id(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// Configure user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::post().to(create_user))
            .route("/{id}", web::get().to(get_user)),
    );
}
