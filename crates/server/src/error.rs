//! API error type and its HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use ticketdesk_core::{FieldErrors, TicketError};
use tracing::error;

/// Message returned alongside field errors.
pub const VALIDATION_MESSAGE: &str = "The given data was invalid.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The given data was invalid.")]
    Validation(FieldErrors),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl From<TicketError> for ApiError {
    fn from(e: TicketError) -> Self {
        match e {
            TicketError::Validation(errors) => ApiError::Validation(errors),
            TicketError::NotFound(id) => ApiError::NotFound(id),
            TicketError::Database(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                VALIDATION_MESSAGE.to_string(),
                Some(errors),
            ),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Ticket not found".to_string(), None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        (status, Json(ErrorResponse { message, errors })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
