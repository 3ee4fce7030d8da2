use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, auth::AuthUser};

use super::JobRead;

#[derive(Deserialize)]
pub(crate) struct JobUpdate {
    title: Option<String>,
    description: Option<String>,
    budget: Option<i64>,
    status: Option<String>,
}

async fn job_owner(db_pool: &SqlitePool, job_id: i64) -> AppResult<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT client_id FROM jobs WHERE id=?")
        .bind(job_id)
        .fetch_optional(db_pool)
        .await?;
    row.map(|(client_id,)| client_id)
        .ok_or(AppError::NotFound("Job not found"))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn update_job(
    Path(job_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(payload): Json<JobUpdate>,
) -> AppResult<Json<JobRead>> {
    if payload.title.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::UnprocessableEntity(
            "title must not be empty".to_owned(),
        ));
    }
    if payload.budget.is_some_and(|budget| budget <= 0) {
        return Err(AppError::UnprocessableEntity(
            "budget must be positive".to_owned(),
        ));
    }

    if job_owner(&db_pool, job_id).await? != user.user_id {
        return Err(AppError::Forbidden("Job can only be edited by creator"));
    }

    let job = sqlx::query_as(
        "UPDATE jobs SET \
            title=COALESCE(?,title), \
            description=COALESCE(?,description), \
            budget=COALESCE(?,budget), \
            status=COALESCE(?,status) \
         WHERE id=? \
         RETURNING id,title,description,budget,status,client_id",
    )
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.budget)
    .bind(payload.status)
    .bind(job_id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(job))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn delete_job(
    Path(job_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> AppResult<StatusCode> {
    if job_owner(&db_pool, job_id).await? != user.user_id {
        return Err(AppError::Forbidden("Job can only be deleted by creator"));
    }

    sqlx::query("DELETE FROM jobs WHERE id=?")
        .bind(job_id)
        .execute(&db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
