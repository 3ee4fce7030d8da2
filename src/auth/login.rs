use axum::{Form, Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::Duration;

use crate::{AppError, AppResult};

use super::{token, token::JwtKeys, verify_password};

const TOKEN_TTL: Duration = Duration::minutes(20);

// OAuth2 password-flow shape: the form field is `username` but carries the
// email address.
#[derive(Deserialize)]
pub(crate) struct LoginForm {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub(crate) struct Token {
    access_token: String,
    token_type: &'static str,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    State(keys): State<JwtKeys>,
    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Json<Token>> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT id,hashed_password FROM users WHERE email=?")
            .bind(&username)
            .fetch_optional(&db_pool)
            .await?;

    let Some((user_id, hashed)) = row else {
        return Err(AppError::Unauthorized("Not Authenticated"));
    };
    if !verify_password(&password, &hashed) {
        tracing::debug!(email = %username, "login with wrong password");
        return Err(AppError::Unauthorized("Not Authenticated"));
    }

    let access_token = token::issue(&keys, &username, user_id, TOKEN_TTL)?;
    Ok(Json(Token {
        access_token,
        token_type: "bearer",
    }))
}
