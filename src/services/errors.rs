use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::domain::order::OrderStatus;
use crate::repository::errors::RepositoryError;

/// Result type returned by service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the service layer and rendered by the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,
    #[error("not allowed")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    Conflict(String),
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("order is already assigned to another agent")]
    AlreadyAssigned,
    #[error("code does not match, {remaining} attempts left")]
    CodeMismatch { remaining: i32 },
    #[error("code is locked after too many failed attempts")]
    CodeLocked,
    #[error("code was already used")]
    CodeAlreadyUsed,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Forbidden => "forbidden",
            ServiceError::NotFound => "not_found",
            ServiceError::Form(_) => "invalid_input",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::InvalidTransition { .. } => "invalid_transition",
            ServiceError::AlreadyAssigned => "already_assigned",
            ServiceError::CodeMismatch { .. } => "code_mismatch",
            ServiceError::CodeLocked => "code_locked",
            ServiceError::CodeAlreadyUsed => "code_already_used",
            ServiceError::Internal(_) => "internal",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::ConstraintViolation(message) => ServiceError::Form(message),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Form(_) | ServiceError::CodeMismatch { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Conflict(_)
            | ServiceError::InvalidTransition { .. }
            | ServiceError::AlreadyAssigned
            | ServiceError::CodeAlreadyUsed => StatusCode::CONFLICT,
            ServiceError::CodeLocked => StatusCode::LOCKED,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::warn!("Request rejected ({}): {self}", self.code());
        }

        // Internal details stay in the log.
        let message = match self {
            ServiceError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(status).json(json!({ "error": message, "code": self.code() }))
    }
}
