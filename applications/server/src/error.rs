/// Server error types
use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tune_core::TuneError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Catalog error: {0}")]
    Catalog(TuneError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Domain errors map onto their HTTP counterparts; only store failures stay
/// opaque to the client.
impl From<TuneError> for ServerError {
    fn from(err: TuneError) -> Self {
        match err {
            TuneError::NotFound { entity, .. } => ServerError::NotFound(format!("{entity} not found")),
            TuneError::Forbidden(msg) => ServerError::Forbidden(msg),
            TuneError::Conflict(msg) => ServerError::Conflict(msg),
            TuneError::InvalidInput(msg) => ServerError::Validation(msg),
            other => ServerError::Catalog(other),
        }
    }
}

impl From<tune_storage::StorageError> for ServerError {
    fn from(err: tune_storage::StorageError) -> Self {
        ServerError::Catalog(err.into())
    }
}

/// Body rejections keep the `{"detail"}` shape; unreadable payloads are
/// validation failures, everything else is a bad request.
fn body_rejection(status: StatusCode, detail: String) -> ServerError {
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        ServerError::Validation(detail)
    } else {
        ServerError::BadRequest(detail)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for ServerError {
    fn from(rejection: FormRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ServerError::Auth(msg) => {
                let mut response = (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": msg })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                return response;
            }
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServerError::Catalog(ref e) => {
                tracing::error!("Catalog error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            ServerError::Jwt(ref e) => {
                tracing::debug!("JWT error: {:?}", e);
                return ServerError::Auth("Could not validate credentials".to_string())
                    .into_response();
            }
            ServerError::Bcrypt(ref e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Password error".to_string(),
                )
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
