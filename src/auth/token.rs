use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::AppResult;

/// HS256 key pair shared by token issue and verify. Cheap to clone into each
/// session; verification is pure and safe to run from any number of tasks.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Who a verified credential says the caller is. Immutable for the lifetime
/// of the session that authenticated it.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed, expired, or signature-invalid credential.
    #[error("invalid token")]
    Invalid,
    /// Structurally valid token lacking the subject or user-id claim.
    #[error("token missing required claims")]
    MissingClaims,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: Option<String>,
    id: Option<i64>,
    exp: i64,
}

pub fn issue(keys: &JwtKeys, email: &str, user_id: i64, ttl: Duration) -> AppResult<String> {
    let claims = Claims {
        sub: Some(email.to_owned()),
        id: Some(user_id),
        exp: (OffsetDateTime::now_utc() + ttl).unix_timestamp(),
    };

    Ok(encode(&Header::default(), &claims, &keys.encoding).map_err(anyhow::Error::from)?)
}

pub fn verify(keys: &JwtKeys, token: &str) -> Result<Identity, AuthError> {
    let data = decode::<Claims>(token, &keys.decoding, &Validation::default())
        .map_err(|_| AuthError::Invalid)?;

    match (data.claims.id, data.claims.sub) {
        (Some(user_id), Some(email)) => Ok(Identity { user_id, email }),
        _ => Err(AuthError::MissingClaims),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> JwtKeys {
        JwtKeys::new("test-secret")
    }

    #[test]
    fn issue_then_verify_roundtrips() {
        let keys = keys();
        let token = issue(&keys, "ada@example.com", 7, Duration::minutes(20)).unwrap();
        let identity = verify(&keys, &token).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_id: 7,
                email: "ada@example.com".to_owned(),
            }
        );
    }

    #[test]
    fn garbage_is_invalid() {
        assert!(matches!(
            verify(&keys(), "definitely.not.a.jwt"),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn wrong_key_is_invalid() {
        let token = issue(&keys(), "ada@example.com", 7, Duration::minutes(20)).unwrap();
        let other = JwtKeys::new("some-other-secret");
        assert!(matches!(verify(&other, &token), Err(AuthError::Invalid)));
    }

    #[test]
    fn expired_token_is_invalid() {
        let keys = keys();
        let token = issue(&keys, "ada@example.com", 7, Duration::minutes(-10)).unwrap();
        assert!(matches!(verify(&keys, &token), Err(AuthError::Invalid)));
    }

    #[test]
    fn missing_claims_are_rejected() {
        let keys = keys();
        let exp = (OffsetDateTime::now_utc() + Duration::minutes(20)).unix_timestamp();
        let token = encode(
            &Header::default(),
            &serde_json::json!({"exp": exp, "sub": "ada@example.com"}),
            &keys.encoding,
        )
        .unwrap();
        assert!(matches!(verify(&keys, &token), Err(AuthError::MissingClaims)));
    }
}
