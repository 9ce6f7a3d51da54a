use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::inference::InferenceError;
use crate::rate_limit::AdmissionError;

/// Everything a request can fail with, rendered at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("{0}")]
    Validation(String),

    #[error("Batch queue is full, try again later")]
    QueueFull,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::MissingCredential) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(AuthError::InvalidCredential) => StatusCode::FORBIDDEN,
            ApiError::Admission(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Inference(InferenceError::Timeout(_)) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Inference(InferenceError::Failure { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Auth(AuthError::MissingCredential) => "MISSING_CREDENTIAL",
            ApiError::Auth(AuthError::InvalidCredential) => "INVALID_CREDENTIAL",
            ApiError::Admission(_) => "RATE_LIMIT_EXCEEDED",
            ApiError::Inference(InferenceError::Timeout(_)) => "INFERENCE_TIMEOUT",
            ApiError::Inference(InferenceError::Failure { .. }) => "INFERENCE_FAILURE",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::QueueFull => "QUEUE_FULL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            code: self.error_code(),
            message: self.to_string(),
            timestamp: chrono::Utc::now(),
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::Admission(AdmissionError::RateLimitExceeded { retry_after_secs, .. }) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}
