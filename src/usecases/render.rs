use crate::config::DashboardConfig;
use crate::models::container::{Container, ContainerAction, ContainerId, ContainerStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Running,
    NotRunning,
}

impl StatusBadge {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusBadge::Running => "status-running",
            StatusBadge::NotRunning => "status-exited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortCell {
    None,
    Link { port: u16, url: String },
}

impl PortCell {
    pub fn label(&self) -> String {
        match self {
            PortCell::None => "None".to_string(),
            PortCell::Link { port, .. } => format!("{} (Open)", port),
        }
    }
}

/// One rendered table row. `id` keeps the full identifier for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRow {
    pub id: ContainerId,
    pub short_id: String,
    pub name: String,
    pub status: ContainerStatus,
    pub badge: StatusBadge,
    pub image: String,
    pub port: PortCell,
    pub actions: Vec<ContainerAction>,
}

impl ContainerRow {
    pub fn offers(&self, action: ContainerAction) -> bool {
        self.actions.contains(&action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPolicy {
    pub link_host: String,
    pub id_prefix_len: usize,
}

impl RenderPolicy {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            link_host: config.link_host(),
            id_prefix_len: config.id_prefix_len,
        }
    }

    /// Rows in the same order as `containers`.
    pub fn render(&self, containers: &[Container]) -> Vec<ContainerRow> {
        containers.iter().map(|c| self.render_row(c)).collect()
    }

    pub fn render_row(&self, container: &Container) -> ContainerRow {
        let badge = if container.status.is_running() {
            StatusBadge::Running
        } else {
            StatusBadge::NotRunning
        };

        let port = match container.port.port() {
            Some(port) => PortCell::Link {
                port,
                url: format!("http://{}:{}", self.link_host, port),
            },
            None => PortCell::None,
        };

        ContainerRow {
            id: container.id.clone(),
            short_id: container.id.short(self.id_prefix_len).to_string(),
            name: container.name.clone(),
            status: container.status.clone(),
            badge,
            image: container.image.clone(),
            port,
            actions: container.status.available_actions(),
        }
    }
}
