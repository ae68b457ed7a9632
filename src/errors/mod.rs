pub mod codes;
pub mod engine;
pub mod registry;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::engine::EngineError;
use crate::errors::registry::RegistryError;

pub type PanelResult<T> = Result<T, PanelError>;

pub trait HasErrorCode {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HasErrorCode for PanelError {
    fn error_code(&self) -> &'static str {
        match self {
            PanelError::Config(e) => e.error_code(),
            PanelError::Registry(e) => e.error_code(),
            PanelError::Engine(e) => e.error_code(),
            PanelError::Internal(_) => "E000",
        }
    }
}
