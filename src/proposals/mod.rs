mod list;
mod submit;

use axum::{Router, routing::get};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/proposals", get(list::my_proposals))
        .route("/proposals/", get(list::my_proposals))
        .route(
            "/proposals/{job_id}",
            get(list::proposals_for_job).post(submit::submit_proposal),
        )
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProposalRead {
    pub id: i64,
    pub bid_amount: i64,
    pub cover_letter: Option<String>,
    pub job_id: i64,
    pub freelancer_id: i64,
}
