use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppError, AppResult};

use super::{Role, hash_password, users::UserRead};

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    email: String,
    password: String,
    role: Role,
    name: String,
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<UserRead>> {
    if !payload.email.contains('@') {
        return Err(AppError::UnprocessableEntity(
            "email must be a valid address".to_owned(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(AppError::UnprocessableEntity(
            "password must be at least 6 characters".to_owned(),
        ));
    }
    if payload.name.trim().is_empty() {
        return Err(AppError::UnprocessableEntity("name is required".to_owned()));
    }

    let hashed = hash_password(&payload.password)?;

    let user = sqlx::query_as::<_, UserRead>(
        "INSERT INTO users (name,email,hashed_password,role,is_active) VALUES (?,?,?,?,1) \
         RETURNING id,email,role,name,is_active",
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&hashed)
    .bind(payload.role.as_str())
    .fetch_one(&db_pool)
    .await
    .map_err(|err| {
        AppError::Internal(anyhow::Error::from(err).context("database error while creating user"))
    })?;

    Ok(Json(user))
}
