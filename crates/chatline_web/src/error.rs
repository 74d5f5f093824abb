//! HTTP mapping for chat errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use chatline_core::ChatError;

/// JSON body returned by API routes on failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Status code a chat error is reported with
pub fn status_for(err: &ChatError) -> StatusCode {
    match err {
        ChatError::EmptyInput => StatusCode::BAD_REQUEST,
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Responder(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A [`ChatError`] rendered as a JSON API response
#[derive(Debug)]
pub struct ApiError(pub ChatError);

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "request failed");
        }
        (status, Json(ErrorResponse::new(self.0.to_string()))).into_response()
    }
}
