use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{CreateUser, User};

pub struct UsersService;

impl UsersService {
    /// Creates a user identity record
    pub async fn create(pool: &PgPool, input: CreateUser) -> AppResult<User> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username)
            VALUES ($1)
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!("Username '{}' already exists", username));
                }
            }
            AppError::Database(e)
        })?;

        Ok(user)
    }

    /// Gets a user by ID
    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> AppResult<User> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, created_at FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        Ok(user)
    }
}
