use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::DecodeError;
use crate::service::ServiceError;

/// Everything that can stop a request from producing a success response.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed query parameters, one entry per offending parameter.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Backend(#[from] ServiceError),
}

impl GatewayError {
    /// Status for this failure. With `collapse_backend` every backend error
    /// is reported as a 500, whatever its kind.
    pub fn status(&self, collapse_backend: bool) -> StatusCode {
        match self {
            GatewayError::Validation(_) | GatewayError::Decode(_) => StatusCode::BAD_REQUEST,
            GatewayError::Backend(_) if collapse_backend => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Backend(e) => match e {
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ServiceError::Internal(_) | ServiceError::DeadlineExceeded(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

/// Body of every failure response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl From<&GatewayError> for ErrorEnvelope {
    fn from(err: &GatewayError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
