use std::sync::Arc;

use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use sqlx::SqlitePool;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    AppError, AppResult,
    auth::AuthUser,
    hub::{ChatEvent, ChatHub},
};

use super::{CONTRACT_COLUMNS, ContractRead};

/// Accepting a proposal closes its job, creates the contract, and announces
/// the new contract to anyone already connected to its chat room.
#[debug_handler(state = crate::AppState)]
pub(crate) async fn accept_proposal(
    Path(proposal_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    State(hub): State<Arc<ChatHub>>,
    AuthUser(user): AuthUser,
) -> AppResult<(StatusCode, Json<ContractRead>)> {
    let proposal: Option<(i64, i64, i64)> =
        sqlx::query_as("SELECT bid_amount,job_id,freelancer_id FROM proposals WHERE id=?")
            .bind(proposal_id)
            .fetch_optional(&db_pool)
            .await?;
    let Some((bid_amount, job_id, freelancer_id)) = proposal else {
        return Err(AppError::NotFound("Proposal not found"));
    };

    let job: Option<(i64,)> = sqlx::query_as("SELECT client_id FROM jobs WHERE id=?")
        .bind(job_id)
        .fetch_optional(&db_pool)
        .await?;
    let Some((client_id,)) = job else {
        return Err(AppError::NotFound("Job not found"));
    };
    if client_id != user.user_id {
        return Err(AppError::MethodNotAllowed(
            "Proposals can only be accepted by job owner",
        ));
    }

    sqlx::query("UPDATE jobs SET status='closed' WHERE id=?")
        .bind(job_id)
        .execute(&db_pool)
        .await?;

    let created_at = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let contract: ContractRead = sqlx::query_as(&format!(
        "INSERT INTO contracts (amount,status,created_at,job_id,freelancer_id,client_id) \
         VALUES (?,'ongoing',?,?,?,?) RETURNING {CONTRACT_COLUMNS}"
    ))
    .bind(bid_amount)
    .bind(&created_at)
    .bind(job_id)
    .bind(freelancer_id)
    .bind(client_id)
    .fetch_one(&db_pool)
    .await?;

    hub.broadcast(
        contract.id,
        &ChatEvent::ContractCreated {
            contract_id: contract.id,
            job_id: contract.job_id,
            client_id: contract.client_id,
            freelancer_id: contract.freelancer_id,
            status: contract.status.clone(),
        },
    );

    Ok((StatusCode::CREATED, Json(contract)))
}
