mod edit;
mod list;
mod new;

use axum::{
    Router,
    routing::{get, patch, post},
};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    // The browser clients call the collection with a trailing slash, curl
    // users without one; serve both spellings.
    Router::new()
        .route("/jobs", get(list::list_jobs))
        .route("/jobs/", get(list::list_jobs))
        .route("/jobs/create", post(new::create_job))
        .route(
            "/jobs/{job_id}",
            patch(edit::update_job).delete(edit::delete_job),
        )
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct JobRead {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub budget: i64,
    pub status: String,
    pub client_id: i64,
}
