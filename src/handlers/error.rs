use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{response::IntoResponse, Json};
use tracing::error;

use crate::errors::engine::EngineError;
use crate::models::response::ErrorBody;

/// An engine failure on its way out of the API as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: EngineError,
}

fn map_error(err: &EngineError) -> StatusCode {
    use EngineError::*;
    match err {
        NotConnected => StatusCode::INTERNAL_SERVER_ERROR,
        NotFound { .. } => StatusCode::NOT_FOUND,
        ImageNotFound { .. } => StatusCode::NOT_FOUND,
        MissingIndexFile { .. } => StatusCode::BAD_REQUEST,
        InvalidAction { .. } => StatusCode::BAD_REQUEST,
        InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        Api { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiFailure {
    /// Overrides the status used for errors the daemon answered with on this endpoint.
    /// Failures that never reached the daemon stay a 500.
    pub fn with_api_status(mut self, status: StatusCode) -> Self {
        if matches!(self.error, EngineError::Api { status: Some(_), .. }) {
            self.status = status;
        }
        self
    }
}

impl From<EngineError> for ApiFailure {
    fn from(error: EngineError) -> Self {
        ApiFailure {
            status: map_error(&error),
            error,
        }
    }
}

/// Undecodable request bodies keep axum's status but answer with `{ "error": ... }`.
impl From<JsonRejection> for ApiFailure {
    fn from(rejection: JsonRejection) -> Self {
        ApiFailure {
            status: rejection.status(),
            error: EngineError::InvalidRequest {
                reason: rejection.body_text(),
            },
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> axum::response::Response {
        error!(
            "Request failed with {} [{}]: {}",
            self.status,
            self.error.error_code(),
            self.error
        );
        let body = ErrorBody {
            error: self.error.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}
