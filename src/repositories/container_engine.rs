use async_trait::async_trait;
use mockall::automock;

use crate::errors::engine::EngineError;
use crate::models::engine::{EngineContainer, RunSpec};

/// Local container engine the control-plane API drives.
#[automock]
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    async fn list_containers(&self) -> Result<Vec<EngineContainer>, EngineError>;
    /// Creates and starts a container, returning its full identifier.
    async fn run_container(&self, spec: &RunSpec) -> Result<String, EngineError>;
    async fn pull_image(&self, image: &str) -> Result<(), EngineError>;
    async fn container_name(&self, id: &str) -> Result<String, EngineError>;
    async fn start_container(&self, id: &str) -> Result<(), EngineError>;
    async fn stop_container(&self, id: &str) -> Result<(), EngineError>;
    async fn remove_container(&self, id: &str) -> Result<(), EngineError>;
}
