use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use pinmirror_core::{ErrorCategory, GatewayError, PinError};
use pinmirror_types::api::ErrorResponse;

/// A failed admin request: a status plus a JSON `{error}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::Configuration => StatusCode::CONFLICT,
        ErrorCategory::Resolution => StatusCode::NOT_FOUND,
        ErrorCategory::Transport => StatusCode::BAD_GATEWAY,
        ErrorCategory::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PinError> for ApiError {
    fn from(e: PinError) -> Self {
        Self::new(status_for(e.category()), e.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        PinError::from(e).into()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("Store error: {:#}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal storage error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}
