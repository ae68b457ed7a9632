use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions,
    RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding};
use bollard::Docker;
use futures_util::stream::TryStreamExt;
use tracing::info;

use crate::errors::engine::EngineError;
use crate::models::engine::{EngineContainer, ExposedPort, RunSpec};
use crate::repositories::container_engine::ContainerEngine;

#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
    exposed: ExposedPort,
    stop_timeout_secs: i64,
}

impl DockerEngine {
    pub fn new(exposed: ExposedPort, stop_timeout_secs: i64) -> Result<DockerEngine, EngineError> {
        info!("Connecting to the local Docker daemon");
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            exposed,
            stop_timeout_secs,
        })
    }

    /// Docker answers 404 for unknown ids; everything else stays an API error.
    fn not_found_as(id: &str, error: bollard::errors::Error) -> EngineError {
        match EngineError::from(error) {
            EngineError::Api {
                status: Some(404), ..
            } => EngineError::NotFound { id: id.to_string() },
            other => other,
        }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn list_containers(&self) -> Result<Vec<EngineContainer>, EngineError> {
        info!("Listing containers");
        let options = Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        });

        let containers = self
            .docker
            .list_containers(options)
            .await?
            .into_iter()
            .map(|summary| EngineContainer::from_summary(summary, &self.exposed))
            .collect();

        Ok(containers)
    }

    async fn run_container(&self, spec: &RunSpec) -> Result<String, EngineError> {
        info!("Creating container: {} from {}", spec.name, spec.image);
        let options = Some(CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        });

        let port_key = spec.exposed.key();
        let port_bindings = HashMap::from([(
            port_key.clone(),
            Some(vec![PortBinding {
                host_ip: None,
                host_port: None,
            }]),
        )]);

        let config = Config {
            image: Some(spec.image.clone()),
            exposed_ports: Some(HashMap::from([(port_key, HashMap::new())])),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                binds: Some(vec![spec.index_bind()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = self
            .docker
            .create_container(options, config)
            .await
            .map_err(|e| match EngineError::from(e) {
                EngineError::Api {
                    status: Some(404), ..
                } => EngineError::ImageNotFound {
                    image: spec.image.clone(),
                },
                other => other,
            })?;

        self.docker
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await?;

        Ok(created.id)
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        info!("Pulling image: {}", image);
        let options = Some(CreateImageOptions {
            from_image: image,
            ..Default::default()
        });

        let _ = self
            .docker
            .create_image(options, None, None)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(())
    }

    async fn container_name(&self, id: &str) -> Result<String, EngineError> {
        let inspected = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| Self::not_found_as(id, e))?;

        Ok(inspected
            .name
            .map(|name| name.trim_start_matches('/').to_string())
            .unwrap_or_else(|| id.to_string()))
    }

    async fn start_container(&self, id: &str) -> Result<(), EngineError> {
        info!("Starting container: {}", id);
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| Self::not_found_as(id, e))
    }

    async fn stop_container(&self, id: &str) -> Result<(), EngineError> {
        info!("Stopping container: {}", id);
        let options = Some(StopContainerOptions {
            t: self.stop_timeout_secs,
        });

        self.docker
            .stop_container(id, options)
            .await
            .map_err(|e| Self::not_found_as(id, e))
    }

    async fn remove_container(&self, id: &str) -> Result<(), EngineError> {
        info!("Removing container: {}", id);
        let options = Some(RemoveContainerOptions {
            force: true,
            ..Default::default()
        });

        self.docker
            .remove_container(id, options)
            .await
            .map_err(|e| Self::not_found_as(id, e))
    }
}
