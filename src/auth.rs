use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{User, UserRecord},
    repository::RepositoryState,
};

/// Claims
///
/// Payload of the bearer tokens issued by `POST /users/login`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): id of the user the token was issued to.
    pub sub: i64,
    /// Expiration Time (exp), seconds since the Unix epoch.
    pub exp: usize,
    /// Issued At (iat), seconds since the Unix epoch.
    pub iat: usize,
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// issue_token
///
/// Signs an HS256 token for `user_id`, valid for `config.token_ttl_seconds`.
pub fn issue_token(config: &AppConfig, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp().max(0);
    // `exp` saturates instead of overflowing.
    let exp = now.saturating_add(config.token_ttl_seconds.max(0));
    let claims = Claims {
        sub: user_id,
        iat: usize::try_from(now).unwrap_or(usize::MAX),
        exp: usize::try_from(exp).unwrap_or(usize::MAX),
    };
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    encode(&Header::default(), &claims, &key)
}

/// hash_password
///
/// PHC-format argon2 hash for storage in `users.password_hash`.
pub fn hash_password(password: &str) -> String {
    password_auth::generate_hash(password)
}

/// verify_credentials
///
/// Returns the user only if `record` exists and `password` matches its hash.
/// Unknown email and wrong password are indistinguishable to the caller.
pub fn verify_credentials(record: Option<UserRecord>, password: &str) -> Result<User, ApiError> {
    let record = record.ok_or(ApiError::InvalidCredentials)?;
    password_auth::verify_password(password, &record.password_hash)
        .map_err(|_| ApiError::InvalidCredentials)?;
    Ok(User::from(record))
}

/// AuthUser Extractor Implementation
///
/// Guards every mutating route:
/// 1. Reads `Authorization: Bearer <token>`.
/// 2. Verifies signature and expiry against the configured secret.
/// 3. Confirms the subject still exists in the user store.
///
/// Any failure rejects with `ApiError::Unauthenticated` (401) before the
/// handler, and therefore any mutation, runs.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::Unauthenticated)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!("rejected bearer token: {:?}", e.kind());
            ApiError::Unauthenticated
        })?;

        // Tokens outlive deleted accounts; the store has the final word.
        let user = repo
            .find_user_by_id(token_data.claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}
