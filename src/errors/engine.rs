use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Docker not connected")]
    NotConnected,

    #[error("Container not found")]
    NotFound { id: String },

    #[error("Image '{image}' not found. Pulling it now... try again in a moment.")]
    ImageNotFound { image: String },

    #[error("Custom index.html not found at {path}")]
    MissingIndexFile { path: String },

    #[error("Invalid action")]
    InvalidAction { action: String },

    #[error("{reason}")]
    InvalidRequest { reason: String },

    #[error("{reason}")]
    Api { status: Option<u16>, reason: String },
}

impl EngineError {
    pub fn error_code(&self) -> &'static str {
        use crate::errors::codes::ErrorCode;

        match self {
            EngineError::NotConnected => ErrorCode::ENGINE_NOT_CONNECTED,
            EngineError::NotFound { .. } => ErrorCode::ENGINE_CONTAINER_NOT_FOUND,
            EngineError::ImageNotFound { .. } => ErrorCode::ENGINE_IMAGE_NOT_FOUND,
            EngineError::MissingIndexFile { .. } => ErrorCode::ENGINE_INDEX_FILE_MISSING,
            EngineError::InvalidAction { .. } => ErrorCode::ENGINE_INVALID_ACTION,
            EngineError::InvalidRequest { .. } => ErrorCode::ENGINE_INVALID_REQUEST,
            EngineError::Api { .. } => ErrorCode::ENGINE_API_FAILED,
        }
    }
}

impl From<bollard::errors::Error> for EngineError {
    fn from(value: bollard::errors::Error) -> Self {
        match value {
            bollard::errors::Error::DockerResponseServerError {
                status_code,
                message,
            } => EngineError::Api {
                status: Some(status_code),
                reason: message,
            },
            other => EngineError::Api {
                status: None,
                reason: other.to_string(),
            },
        }
    }
}
