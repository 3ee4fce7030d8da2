use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{AppError, AppResult};

/// Public view of a user row; never includes the password hash.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserRead {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub name: String,
    pub is_active: bool,
}

#[debug_handler]
pub(crate) async fn list_users(
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<Vec<UserRead>>> {
    let users = sqlx::query_as("SELECT id,email,role,name,is_active FROM users")
        .fetch_all(&db_pool)
        .await?;
    Ok(Json(users))
}

#[debug_handler]
pub(crate) async fn get_user(
    Path(user_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Json<UserRead>> {
    let user: Option<UserRead> =
        sqlx::query_as("SELECT id,email,role,name,is_active FROM users WHERE id=?")
            .bind(user_id)
            .fetch_optional(&db_pool)
            .await?;

    user.map(Json).ok_or(AppError::NotFound("User not found"))
}
