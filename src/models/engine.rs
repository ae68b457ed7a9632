use std::path::PathBuf;
use std::str::FromStr;

use crate::models::container::{Container, ContainerId, ContainerStatus, PublishedPort};

/// Length of the identifier the API exposes, matching `docker ps`.
pub const SHORT_ID_LEN: usize = 12;

/// Path inside the container the custom page is mounted at.
pub const NGINX_INDEX_TARGET: &str = "/usr/share/nginx/html/index.html";

/// A container-side port such as `80/tcp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedPort {
    pub port: u16,
    pub protocol: String,
}

impl ExposedPort {
    pub fn key(&self) -> String {
        format!("{}/{}", self.port, self.protocol)
    }
}

impl FromStr for ExposedPort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (port, protocol) = s.split_once('/').unwrap_or((s, "tcp"));
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| format!("Invalid port '{}': {}", s, e))?;

        Ok(ExposedPort {
            port,
            protocol: protocol.trim().to_lowercase(),
        })
    }
}

/// What the engine reports about one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineContainer {
    pub id: String,
    pub name: String,
    pub state: String,
    pub image: String,
    pub host_port: Option<u16>,
}

impl EngineContainer {
    pub fn from_summary(value: bollard::models::ContainerSummary, exposed: &ExposedPort) -> Self {
        let host_port = value.ports.unwrap_or_default().into_iter().find_map(|port| {
            let protocol = port
                .typ
                .map(|typ| typ.to_string())
                .filter(|typ| !typ.is_empty())
                .unwrap_or_else(|| "tcp".to_string());

            if port.private_port == exposed.port && protocol == exposed.protocol {
                port.public_port
            } else {
                None
            }
        });

        let name = value
            .names
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|name| name.trim_start_matches('/').to_string())
            .unwrap_or_default();

        EngineContainer {
            id: value.id.unwrap_or_default(),
            name,
            state: value.state.unwrap_or_else(|| "unknown".to_string()),
            image: value
                .image
                .filter(|image| !image.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
            host_port,
        }
    }
}

impl From<EngineContainer> for Container {
    fn from(value: EngineContainer) -> Self {
        let id = ContainerId::new(value.id);
        Container {
            id: ContainerId::new(id.short(SHORT_ID_LEN)),
            name: value.name,
            status: ContainerStatus::from(value.state),
            image: value.image,
            port: PublishedPort::from(value.host_port),
        }
    }
}

/// Everything needed to launch a dashboard-managed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub name: String,
    pub image: String,
    pub index_html: PathBuf,
    pub exposed: ExposedPort,
}

impl RunSpec {
    pub fn index_bind(&self) -> String {
        format!("{}:{}:ro", self.index_html.display(), NGINX_INDEX_TARGET)
    }
}
