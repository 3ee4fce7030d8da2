mod login;
mod register;
pub mod token;
mod users;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    Router,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult, AppState};
use token::{Identity, JwtKeys};

pub use users::UserRead;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register))
        .route("/login", post(login::login))
        .route("/users", get(users::list_users))
        .route("/users/{user_id}", get(users::get_user))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Freelancer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Freelancer => "freelancer",
        }
    }
}

/// Bearer-token guard for the CRUD endpoints.
pub struct AuthUser(pub Identity);

const CREDENTIAL_REJECTION: AppError = AppError::Unauthorized("could not validate credentials");

impl<S> FromRequestParts<S> for AuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(CREDENTIAL_REJECTION)?;

        let identity = token::verify(&keys, bearer).map_err(|err| {
            tracing::debug!(%err, "rejected bearer credential");
            CREDENTIAL_REJECTION
        })?;

        Ok(Self(identity))
    }
}

pub(crate) fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?
        .to_string())
}

pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
