use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{AppError, AppResult, auth::AuthUser};

use super::ProposalRead;

#[derive(Deserialize)]
pub(crate) struct ProposalCreate {
    bid_amount: i64,
    cover_letter: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn submit_proposal(
    Path(job_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ProposalCreate>,
) -> AppResult<Json<ProposalRead>> {
    let role: Option<(String,)> = sqlx::query_as("SELECT role FROM users WHERE id=?")
        .bind(user.user_id)
        .fetch_optional(&db_pool)
        .await?;
    if role.as_ref().map(|(r,)| r.as_str()) != Some("freelancer") {
        return Err(AppError::MethodNotAllowed(
            "Proposals can only be submitted by freelancers",
        ));
    }

    let proposal = sqlx::query_as(
        "INSERT INTO proposals (bid_amount,cover_letter,job_id,freelancer_id) VALUES (?,?,?,?) \
         RETURNING id,bid_amount,cover_letter,job_id,freelancer_id",
    )
    .bind(payload.bid_amount)
    .bind(payload.cover_letter)
    .bind(job_id)
    .bind(user.user_id)
    .fetch_one(&db_pool)
    .await?;

    Ok(Json(proposal))
}
