pub mod auth;
pub mod contracts;
pub mod db;
pub mod hub;
pub mod jobs;
pub mod proposals;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::FromRef,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::{auth::token::JwtKeys, hub::ChatHub};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub jwt: JwtKeys,
    pub hub: Arc<ChatHub>,
}

pub fn app(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .nest("/auth", auth::router())
        .merge(jobs::router())
        .merge(proposals::router())
        .merge(contracts::router())
        .with_state(app_state)
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({"running": "true"}))
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    MethodNotAllowed(&'static str),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(err) => {
                tracing::error!("internal error: {err:?}");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"detail": "internal server error"})),
                )
                    .into_response();
            }
        };

        (status, Json(json!({"detail": self.to_string()}))).into_response()
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self::Internal(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(serde_json::Error);
apperr_impl!(axum::Error);
apperr_impl!(time::error::Format);
