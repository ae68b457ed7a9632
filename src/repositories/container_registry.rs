use async_trait::async_trait;
use mockall::automock;

use crate::errors::registry::RegistryError;
use crate::models::container::{
    Container, ContainerAction, ContainerId, ContainerName, CreatedContainer,
};

/// Request/response access to the control-plane container API.
///
/// Every call is a single outbound request: no retries, no caching.
#[automock]
#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    /// Containers in backend order.
    async fn list_containers(&self) -> Result<Vec<Container>, RegistryError>;

    async fn create_container(
        &self,
        name: &ContainerName,
    ) -> Result<CreatedContainer, RegistryError>;

    /// Returns the backend's human-readable confirmation.
    async fn perform_action(
        &self,
        id: &ContainerId,
        action: ContainerAction,
    ) -> Result<String, RegistryError>;
}
