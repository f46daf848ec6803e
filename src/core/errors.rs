use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use thiserror::Error;

/// Failure kinds surfaced by the repository.
///
/// List-returning reads never produce these; an unknown handle yields an
/// empty sequence instead of `NotFound`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The password hashing backend failed.
    #[error("credential error: {0}")]
    Credential(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    Conflict(String),
    CapacityExceeded(String),
    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::CapacityExceeded(msg) => write!(f, "Capacity Exceeded: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::CapacityExceeded(_) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Forbidden => "Forbidden".to_string(),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::CapacityExceeded(msg)
            | ApiError::InternalError(msg) => msg.clone(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": msg }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::AlreadyExists(msg) => ApiError::Conflict(msg),
            StoreError::CapacityExceeded(msg) => ApiError::CapacityExceeded(msg),
            StoreError::InvalidInput(msg) => ApiError::BadRequest(msg),
            StoreError::Credential(msg) => ApiError::InternalError(msg),
        }
    }
}

// Implement conversion from anyhow::Error to ApiError for internal errors
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
