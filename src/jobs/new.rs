use axum::{Json, debug_handler, extract::State, http::StatusCode};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, auth::AuthUser};

use super::JobRead;

#[derive(Deserialize)]
pub(crate) struct JobCreate {
    title: String,
    description: String,
    budget: i64,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn create_job(
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(payload): Json<JobCreate>,
) -> AppResult<(StatusCode, Json<JobRead>)> {
    if payload.title.len() < 4 {
        return Err(AppError::UnprocessableEntity(
            "title must be at least 4 characters".to_owned(),
        ));
    }
    if payload.description.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "description is required".to_owned(),
        ));
    }
    if payload.budget < 0 {
        return Err(AppError::UnprocessableEntity(
            "budget must not be negative".to_owned(),
        ));
    }

    let role: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id=?")
        .bind(user.user_id)
        .fetch_optional(&db_pool)
        .await?;
    if role.as_ref().map(|(r,)| r.as_str()) != Some("client") {
        return Err(AppError::MethodNotAllowed("Only Clients can create jobs"));
    }

    let job = sqlx::query_as(
        "INSERT INTO jobs (title,description,budget,status,client_id) VALUES (?,?,?,'open',?) \
         RETURNING id,title,description,budget,status,client_id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.budget)
    .bind(user.user_id)
    .fetch_one(&db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}
