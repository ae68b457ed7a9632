use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::registry::RegistryError;
use crate::models::container::{
    Container, ContainerAction, ContainerId, ContainerName, CreatedContainer,
};
use crate::models::response::{ActionRequest, CreateContainerRequest, ErrorBody, MessageBody};
use crate::repositories::container_registry::ContainerRegistry;

const CONTAINERS_PATH: &str = "api/containers";

/// The listing endpoint signals failure by an `error` field, not only by status.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Containers(Vec<Container>),
    Failure(ErrorBody),
}

#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    http: Client,
    base_url: Url,
}

impl HttpRegistryClient {
    pub fn new(base_url: &str) -> Result<HttpRegistryClient, RegistryError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| RegistryError::transport(base_url, e))?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn containers_url(&self) -> Result<Url, RegistryError> {
        self.base_url
            .join(CONTAINERS_PATH)
            .map_err(|e| RegistryError::transport(self.base_url.as_str(), e))
    }

    fn action_url(&self, id: &ContainerId) -> Result<Url, RegistryError> {
        let mut url = self.containers_url()?;
        url.path_segments_mut()
            .map_err(|_| RegistryError::transport(self.base_url.as_str(), "URL cannot be a base"))?
            .push(id.as_str())
            .push("action");
        Ok(url)
    }

    async fn read_body(
        &self,
        url: &Url,
        response: reqwest::Response,
    ) -> Result<(StatusCode, String), RegistryError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RegistryError::transport(url.as_str(), e))?;
        Ok((status, body))
    }
}

/// Decodes `T` from a success response, or the `{error}` payload otherwise.
fn decode<T: DeserializeOwned>(
    url: &Url,
    status: StatusCode,
    body: &str,
) -> Result<T, RegistryError> {
    if status.is_success() {
        return serde_json::from_str(body).map_err(|e| {
            RegistryError::transport(url.as_str(), format!("malformed response: {}", e))
        });
    }

    let failure: ErrorBody = serde_json::from_str(body).map_err(|e| {
        RegistryError::transport(
            url.as_str(),
            format!("malformed error response ({}): {}", status, e),
        )
    })?;

    Err(RegistryError::Backend {
        status: Some(status.as_u16()),
        message: failure.error,
    })
}

#[async_trait]
impl ContainerRegistry for HttpRegistryClient {
    async fn list_containers(&self) -> Result<Vec<Container>, RegistryError> {
        let url = self.containers_url()?;
        info!("Listing containers from {}", url);

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RegistryError::transport(url.as_str(), e))?;
        let (status, body) = self.read_body(&url, response).await?;

        match serde_json::from_str::<ListBody>(&body) {
            Ok(ListBody::Containers(containers)) => Ok(containers),
            Ok(ListBody::Failure(failure)) => {
                warn!("Backend refused container listing: {}", failure.error);
                Err(RegistryError::Backend {
                    status: Some(status.as_u16()),
                    message: failure.error,
                })
            }
            Err(e) => Err(RegistryError::transport(
                url.as_str(),
                format!("malformed response ({}): {}", status, e),
            )),
        }
    }

    async fn create_container(
        &self,
        name: &ContainerName,
    ) -> Result<CreatedContainer, RegistryError> {
        let url = self.containers_url()?;
        info!("Creating container '{}' via {}", name, url);

        let request = CreateContainerRequest {
            name: Some(name.as_str().to_string()),
        };
        let response = self
            .http
            .post(url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RegistryError::transport(url.as_str(), e))?;
        let (status, body) = self.read_body(&url, response).await?;

        decode(&url, status, &body)
    }

    async fn perform_action(
        &self,
        id: &ContainerId,
        action: ContainerAction,
    ) -> Result<String, RegistryError> {
        let url = self.action_url(id)?;
        info!("Requesting '{}' for container {}", action, id);

        let response = self
            .http
            .post(url.clone())
            .json(&ActionRequest { action })
            .send()
            .await
            .map_err(|e| RegistryError::transport(url.as_str(), e))?;
        let (status, body) = self.read_body(&url, response).await?;

        decode::<MessageBody>(&url, status, &body).map(|body| body.message)
    }
}
