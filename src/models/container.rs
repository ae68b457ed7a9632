use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::registry::ValidationError;

/// Placeholder the API uses for a container without a published port.
pub const UNPUBLISHED_PORT: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `len` characters of the identifier, used for display only.
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A container name that is known to be non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Created,
    Dead,
    Exited,
    Paused,
    Removing,
    Restarting,
    Running,
    Other(String),
}

impl ContainerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Dead => "dead",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Removing => "removing",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Running => "running",
            ContainerStatus::Other(other) => other,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerStatus::Running)
    }

    /// Actions an operator may trigger in this state. Delete is always offered.
    pub fn available_actions(&self) -> Vec<ContainerAction> {
        if self.is_running() {
            vec![ContainerAction::Stop, ContainerAction::Delete]
        } else {
            vec![ContainerAction::Start, ContainerAction::Delete]
        }
    }
}

impl From<String> for ContainerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "created" => ContainerStatus::Created,
            "dead" => ContainerStatus::Dead,
            "exited" => ContainerStatus::Exited,
            "paused" => ContainerStatus::Paused,
            "removing" => ContainerStatus::Removing,
            "restarting" => ContainerStatus::Restarting,
            "running" => ContainerStatus::Running,
            _ => ContainerStatus::Other(value),
        }
    }
}

impl From<&str> for ContainerStatus {
    fn from(value: &str) -> Self {
        ContainerStatus::from(value.to_string())
    }
}

impl From<ContainerStatus> for String {
    fn from(value: ContainerStatus) -> Self {
        match value {
            ContainerStatus::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerAction {
    Start,
    Stop,
    Delete,
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Delete => "delete",
        }
    }

    pub fn gerund(&self) -> &'static str {
        match self {
            ContainerAction::Start => "Starting",
            ContainerAction::Stop => "Stopping",
            ContainerAction::Delete => "Deleting",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ContainerAction::Start => "started",
            ContainerAction::Stop => "stopped",
            ContainerAction::Delete => "deleted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContainerAction::Start => "Start",
            ContainerAction::Stop => "Stop",
            ContainerAction::Delete => "Delete",
        }
    }
}

impl FromStr for ContainerAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ContainerAction::Start),
            "stop" => Ok(ContainerAction::Stop),
            "delete" => Ok(ContainerAction::Delete),
            other => Err(ValidationError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host port a container publishes, or the "not published" sentinel.
///
/// On the wire this is either a number, a numeric string, `"N/A"`, or absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishedPort {
    #[default]
    Unpublished,
    Port(u16),
}

impl PublishedPort {
    pub fn port(&self) -> Option<u16> {
        match self {
            PublishedPort::Port(port) => Some(*port),
            PublishedPort::Unpublished => None,
        }
    }
}

impl From<Option<u16>> for PublishedPort {
    fn from(value: Option<u16>) -> Self {
        value.map_or(PublishedPort::Unpublished, PublishedPort::Port)
    }
}

impl Serialize for PublishedPort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PublishedPort::Port(port) => serializer.serialize_str(&port.to_string()),
            PublishedPort::Unpublished => serializer.serialize_str(UNPUBLISHED_PORT),
        }
    }
}

impl<'de> Deserialize<'de> for PublishedPort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPort {
            Number(u64),
            Text(String),
        }

        let port = match Option::<RawPort>::deserialize(deserializer)? {
            Some(RawPort::Number(number)) => u16::try_from(number).ok(),
            Some(RawPort::Text(text)) => text.trim().parse::<u16>().ok(),
            None => None,
        };

        Ok(port.filter(|port| *port != 0).into())
    }
}

/// Backend-owned container snapshot as returned by `GET /api/containers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub name: String,
    pub status: ContainerStatus,
    pub image: String,
    #[serde(default)]
    pub port: PublishedPort,
}

/// Identity info returned by the backend after a successful create.
///
/// Any JSON object is accepted; the success status alone means the container exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedContainer {
    #[serde(default)]
    pub id: Option<ContainerId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_padded_name_when_parse_then_name_is_trimmed() {
        let name = ContainerName::parse("  web1 \t").unwrap();
        assert_eq!(name.as_str(), "web1");
    }

    #[test]
    fn given_whitespace_name_when_parse_then_empty_name_error() {
        assert_eq!(ContainerName::parse("   "), Err(ValidationError::EmptyName));
        assert_eq!(ContainerName::parse(""), Err(ValidationError::EmptyName));
    }

    #[test]
    fn given_long_id_when_short_then_first_twelve_characters() {
        let id = ContainerId::new("abc123def456789");
        assert_eq!(id.short(12), "abc123def456");
        assert_eq!(id.as_str(), "abc123def456789");
    }

    #[test]
    fn given_id_shorter_than_prefix_when_short_then_whole_id() {
        let id = ContainerId::new("abc");
        assert_eq!(id.short(12), "abc");
    }

    #[test]
    fn given_running_status_when_available_actions_then_stop_and_delete() {
        let actions = ContainerStatus::Running.available_actions();
        assert_eq!(actions, vec![ContainerAction::Stop, ContainerAction::Delete]);
    }

    #[test]
    fn given_non_running_statuses_when_available_actions_then_start_and_delete() {
        for status in ["exited", "created", "paused", "dead", "something-new"] {
            let actions = ContainerStatus::from(status).available_actions();
            assert_eq!(actions, vec![ContainerAction::Start, ContainerAction::Delete]);
        }
    }

    #[test]
    fn given_unknown_action_string_when_parse_then_rejected() {
        let result = "restart".parse::<ContainerAction>();
        assert_eq!(
            result,
            Err(ValidationError::UnknownAction("restart".to_string()))
        );
        assert_eq!("stop".parse::<ContainerAction>(), Ok(ContainerAction::Stop));
    }

    #[test]
    fn given_action_when_gerund_then_loading_prefix() {
        assert_eq!(ContainerAction::Stop.gerund(), "Stopping");
        assert_eq!(ContainerAction::Start.gerund(), "Starting");
        assert_eq!(ContainerAction::Delete.gerund(), "Deleting");
    }

    #[test]
    fn given_listing_with_mixed_port_shapes_when_deserialized_then_ports_are_normalised() {
        let json = r#"[
            {"id":"a1","name":"web1","status":"running","image":"nginx","port":8080},
            {"id":"b2","name":"web2","status":"exited","image":"nginx","port":"32768"},
            {"id":"c3","name":"web3","status":"exited","image":"nginx","port":"N/A"},
            {"id":"d4","name":"web4","status":"created","image":"nginx","port":null},
            {"id":"e5","name":"web5","status":"created","image":"nginx"}
        ]"#;

        let containers: Vec<Container> = serde_json::from_str(json).unwrap();

        let ports: Vec<PublishedPort> = containers.iter().map(|c| c.port).collect();
        assert_eq!(
            ports,
            vec![
                PublishedPort::Port(8080),
                PublishedPort::Port(32768),
                PublishedPort::Unpublished,
                PublishedPort::Unpublished,
                PublishedPort::Unpublished,
            ]
        );
        assert!(containers[0].status.is_running());
    }

    #[test]
    fn given_container_when_serialized_then_api_shape_is_produced() {
        let container = Container {
            id: ContainerId::new("abc123"),
            name: "web1".to_string(),
            status: ContainerStatus::Other("removing-soon".to_string()),
            image: "nginx:latest".to_string(),
            port: PublishedPort::Unpublished,
        };

        let value = serde_json::to_value(&container).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "id": "abc123",
                "name": "web1",
                "status": "removing-soon",
                "image": "nginx:latest",
                "port": "N/A"
            })
        );
    }
}
