mod accept;
mod ws;

use axum::{
    Json, Router, debug_handler,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{AppResult, AppState, auth::AuthUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contracts", get(my_contracts))
        .route("/contracts/", get(my_contracts))
        .route("/contracts/{proposal_id}", post(accept::accept_proposal))
        .route("/contracts/ws/{contract_id}", get(ws::contract_chat))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ContractRead {
    pub id: i64,
    pub amount: i64,
    pub status: String,
    pub created_at: String,
    pub job_id: i64,
    pub freelancer_id: i64,
    pub client_id: i64,
}

const CONTRACT_COLUMNS: &str = "id,amount,status,created_at,job_id,freelancer_id,client_id";

#[debug_handler(state = crate::AppState)]
pub(crate) async fn my_contracts(
    State(db_pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<ContractRead>>> {
    let contracts = sqlx::query_as(&format!(
        "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE client_id=? OR freelancer_id=?"
    ))
    .bind(user.user_id)
    .bind(user.user_id)
    .fetch_all(&db_pool)
    .await?;

    Ok(Json(contracts))
}

/// The authorization fact behind a chat join: is `user_id` a party (client or
/// freelancer) to the contract the room is keyed by? The hub itself never
/// touches the database; this is its only view into the persistent domain.
pub async fn is_party(db_pool: &SqlitePool, contract_id: i64, user_id: i64) -> sqlx::Result<bool> {
    let hit: Option<(i64,)> =
        sqlx::query_as("SELECT 1 FROM contracts WHERE id=? AND (client_id=? OR freelancer_id=?)")
            .bind(contract_id)
            .bind(user_id)
            .bind(user_id)
            .fetch_optional(db_pool)
            .await?;

    Ok(hit.is_some())
}
