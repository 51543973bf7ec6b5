//! JSON error responses
//!
//! Handlers return `anyhow::Result`; the conversion here looks for a
//! [`LeagueError`] in the chain to pick the status code.

use crate::error::LeagueError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
        }
    }
}

impl From<LeagueError> for ApiError {
    fn from(err: LeagueError) -> Self {
        let status = match &err {
            LeagueError::InvalidUpload { .. } | LeagueError::UnknownGameIds { .. } => {
                StatusCode::BAD_REQUEST
            }
            LeagueError::GameNotFound { .. } | LeagueError::RecapNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            LeagueError::Unauthorized => StatusCode::UNAUTHORIZED,
            LeagueError::AdminDisabled => StatusCode::FORBIDDEN,
            LeagueError::StorageUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LeagueError::ConfigurationError { .. } | LeagueError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let details = match &err {
            LeagueError::InvalidUpload { details, .. } => details.clone(),
            LeagueError::UnknownGameIds { ids } => ids.clone(),
            _ => Vec::new(),
        };

        Self {
            status,
            message: err.to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let mut api = ApiError::new(rejection.status(), "Invalid request body");
        api.details.push(rejection.body_text());
        api
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<LeagueError>() {
            Ok(league) => league.into(),
            Err(other) => {
                error!("Unhandled error: {:#}", other);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{} {}", self.status, self.message);
        }

        (
            self.status,
            Json(json!({
                "error": self.message,
                "details": self.details,
            })),
        )
            .into_response()
    }
}
