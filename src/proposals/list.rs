use axum::{
    Json, debug_handler,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::{AppResult, auth::AuthUser};

use super::ProposalRead;

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_proposals(
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<ProposalRead>>> {
    let proposals = sqlx::query_as(
        "SELECT id,bid_amount,cover_letter,job_id,freelancer_id FROM proposals WHERE freelancer_id=?",
    )
    .bind(user.user_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(proposals))
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn proposals_for_job(
    Path(job_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    AuthUser(_user): AuthUser,
) -> AppResult<Json<Vec<ProposalRead>>> {
    let proposals = sqlx::query_as(
        "SELECT id,bid_amount,cover_letter,job_id,freelancer_id FROM proposals WHERE job_id=?",
    )
    .bind(job_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(proposals))
}
