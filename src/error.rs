use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// RepositoryError
///
/// Failures raised by a store. "Not found" is deliberately absent: lookups
/// return `Option` and deletes return `bool`, so callers branch on presence.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("foreign key constraint violated")]
    ForeignKeyViolation,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// ApiError
///
/// The single error type returned by handlers and the `AuthUser` extractor.
/// Display strings are the exact `message` values clients see.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("County not found")]
    CountyNotFound,

    #[error("City not found in the specified county")]
    CityNotFound,

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("The resource is still referenced by other records")]
    ConstraintViolation,

    #[error("Internal server error")]
    Repository(RepositoryError),

    #[error("Internal server error")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ForeignKeyViolation => ApiError::ConstraintViolation,
            other => ApiError::Repository(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CountyNotFound | ApiError::CityNotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ConstraintViolation => StatusCode::CONFLICT,
            ApiError::Repository(_) | ApiError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// MessageResponse
///
/// `{ "message": ... }` body shared by error responses and delete confirmations.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Repository(e) => tracing::error!("repository failure: {e}"),
            ApiError::Token(e) => tracing::error!("token signing failure: {e}"),
            _ => {}
        }
        (status, Json(MessageResponse::new(self.to_string()))).into_response()
    }
}
