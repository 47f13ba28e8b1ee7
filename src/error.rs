//! Service Error Types
//!
//! This module defines the error taxonomy surfaced by the HTTP handlers
//! and its mapping onto response status codes.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::StoreError;

/// Errors reported to API callers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Requested record does not exist
    #[error("Author not found")]
    NotFound,

    /// Update carried no fields to apply
    #[error("Nothing to modify")]
    NotModified,

    /// Input rejected by validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Quota exhausted for the current window
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited {
        /// Seconds until the current window rolls over
        retry_after_secs: u64,
    },

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::InvalidName(_) | StoreError::InvalidEmail(_) => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl ApiError {
    /// Status code this error maps to on the wire
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::NotModified => StatusCode::NOT_MODIFIED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable rejection label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::NotFound => "not_found",
            ApiError::NotModified => "not_modified",
            ApiError::Validation(_) => "validation",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        crate::metrics::REQUESTS_REJECTED_TOTAL
            .with_label_values(&[self.reason()])
            .inc();

        match self {
            // 304 responses must not carry a body
            ApiError::NotModified => status.into_response(),
            ApiError::RateLimited { retry_after_secs } => {
                let body = Json(serde_json::json!({ "error": self.to_string() }));
                (
                    status,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    body,
                )
                    .into_response()
            }
            ApiError::Internal(ref err) => {
                tracing::error!("Internal error serving request: {:#}", err);
                let body = Json(serde_json::json!({ "error": "internal error" }));
                (status, body).into_response()
            }
            _ => {
                let body = Json(serde_json::json!({ "error": self.to_string() }));
                (status, body).into_response()
            }
        }
    }
}
