use thiserror::Error;

/// Failures detected before any request is built.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a container name.")]
    EmptyName,

    #[error("Unknown action '{0}'")]
    UnknownAction(String),

    #[error("Action '{action}' is not available for container {id}")]
    ActionNotOffered { id: String, action: String },

    #[error("No container matches '{0}'")]
    UnknownContainer(String),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("{message}")]
    Backend { status: Option<u16>, message: String },
}

impl RegistryError {
    pub fn transport(url: impl Into<String>, reason: impl ToString) -> Self {
        RegistryError::Transport {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        use crate::errors::codes::ErrorCode;

        match self {
            RegistryError::Validation(ValidationError::EmptyName) => {
                ErrorCode::VALIDATION_EMPTY_NAME
            }
            RegistryError::Validation(ValidationError::UnknownAction(_)) => {
                ErrorCode::VALIDATION_UNKNOWN_ACTION
            }
            RegistryError::Validation(ValidationError::ActionNotOffered { .. }) => {
                ErrorCode::VALIDATION_ACTION_NOT_OFFERED
            }
            RegistryError::Validation(ValidationError::UnknownContainer(_)) => {
                ErrorCode::VALIDATION_UNKNOWN_CONTAINER
            }
            RegistryError::Transport { .. } => ErrorCode::TRANSPORT_FAILED,
            RegistryError::Backend { .. } => ErrorCode::BACKEND_REPORTED,
        }
    }
}
