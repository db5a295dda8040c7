use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env},
    error::{AppError, AppResult},
    repository::RepositoryState,
};

/// How long an issued token stays valid.
pub const TOKEN_TTL_DAYS: i64 = 30;

/// Claims
///
/// Payload of the JSON Web Tokens this service issues at login and accepts on
/// authenticated routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the id of the user the token was issued to.
    pub sub: i64,
    /// Expiration Time (exp): seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat): seconds since the epoch.
    pub iat: usize,
}

/// issue_token
///
/// Signs an HS256 token for `user_id`, valid for `TOKEN_TTL_DAYS` from now.
pub fn issue_token(user_id: i64, secret: &str) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// decode_token
///
/// Verifies signature and expiry and returns the claims. Every failure is an
/// `Unauthorized`; the cause is only logged.
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                _ => tracing::debug!("rejected token: {:?}", e),
            }
            Err(AppError::Unauthorized("Invalid or expired token".to_string()))
        }
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Handlers take it as an
/// argument; its `id` is the only source of "who is calling".
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: i64,
}

/// AuthUser Extractor Implementation
///
/// 1. Local Bypass: in `Env::Local` only, an `x-user-id` header naming an existing
///    user is accepted in place of a token.
/// 2. Token Validation: `Authorization: Bearer <jwt>`, signature and expiry checked.
/// 3. DB Lookup: the subject must still exist, so a token outliving its user is refused.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // 1. Local Development Bypass
        if config.env == Env::Local {
            if let Some(user_id) = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<i64>().ok())
            {
                if let Some(user) = repo.get_user_by_id(user_id).await? {
                    return Ok(AuthUser { id: user.id });
                }
            }
        }

        // 2. Token Extraction and Validation
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = decode_token(token, &config.jwt_secret)?;

        // 3. Database Lookup
        let user = repo
            .get_user_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser { id: user.id })
    }
}
