//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use sailtrim_core::ConfigError;

/// Errors returned by the route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A document could not be written.
    #[error("storage failure: {0}")]
    Storage(#[from] ConfigError),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Details go to the log, not to the client
        error!("{}", self);
        let body = match &self {
            Self::Storage(_) => "Failed to save configuration",
        };
        (self.status_code(), body).into_response()
    }
}
