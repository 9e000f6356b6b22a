use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::calculator::CalcError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InputMissing(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {} problem row(s)", .0.len())]
    ValidationFailed(Vec<String>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Unexpected(String),
}

impl From<CalcError> for AppError {
    fn from(e: CalcError) -> Self {
        AppError::Unexpected(e.to_string())
    }
}

/// Failure half of the JSON envelope.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = false)]
    pub success: bool,
    #[schema(example = "No 2024 rule found for city 佛山")]
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InputMissing(_) | AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error, details) = match self {
            AppError::ValidationFailed(messages) => (self.to_string(), messages.clone()),
            AppError::Store(e) => {
                tracing::error!(error = %e, "Store operation failed");
                ("Internal Server Error".to_string(), Vec::new())
            }
            AppError::Unexpected(message) => {
                tracing::error!(error = %message, "Unexpected failure");
                (message.clone(), Vec::new())
            }
            _ => (self.to_string(), Vec::new()),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            success: false,
            error,
            details,
        })
    }
}
