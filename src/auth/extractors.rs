use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::Future;
use std::pin::Pin;

use crate::auth::token::is_valid_token_format;
use crate::db::DbPool;
use crate::error::AppError;
use crate::models::AdminToken;
use crate::services::AdminTokenService;

/// Extractor for Bearer token authentication.
///
/// Gates every admin endpoint and the query-authorize endpoint; the calling
/// gateway authenticates end users itself and talks to Quotrak
/// service-to-service with one of these tokens.
///
/// Usage in handlers:
/// ```ignore
/// async fn my_handler(auth: AdminAuth) -> HttpResponse {
///     // auth.token contains the validated AdminToken
/// }
/// ```
pub struct AdminAuth {
    #[allow(dead_code)] // Available for handlers that need token details
    pub token: AdminToken,
}

impl FromRequest for AdminAuth {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = match req.app_data::<web::Data<DbPool>>().cloned() {
            Some(pool) => pool,
            None => {
                return Box::pin(async {
                    Err(AppError::Internal(
                        "Database pool not configured".to_string(),
                    ))
                });
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        Box::pin(async move {
            let header = auth_header.ok_or_else(|| {
                AppError::Unauthorized("Missing Authorization header".to_string())
            })?;

            if !header.starts_with("Bearer ") {
                return Err(AppError::Unauthorized(
                    "Invalid Authorization header format, expected 'Bearer <token>'".to_string(),
                ));
            }

            let token_str = header["Bearer ".len()..].trim();

            if !is_valid_token_format(token_str) {
                return Err(AppError::Unauthorized(
                    "Malformed Bearer token, must be 40 lowercase hex chars".to_string(),
                ));
            }

            // Lookup token in database
            let token = AdminTokenService::get_by_token(pool.get_ref(), token_str)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Invalid Bearer token".to_string()))?;

            // Update last_used_at asynchronously (fire and forget)
            let pool_clone = pool.clone();
            let token_id = token.id;
            tokio::spawn(async move {
                let _ = AdminTokenService::update_last_used(pool_clone.get_ref(), token_id).await;
            });

            Ok(AdminAuth { token })
        })
    }
}
