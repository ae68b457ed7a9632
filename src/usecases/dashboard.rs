use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::errors::registry::{RegistryError, ValidationError};
use crate::models::container::{ContainerAction, ContainerId, ContainerName};
use crate::repositories::container_registry::ContainerRegistry;
use crate::usecases::render::{ContainerRow, RenderPolicy};
use crate::usecases::status_channel::{StatusChannel, StatusKind, StatusSlot};

pub const LIST_FAILED_MESSAGE: &str = "Failed to load container list.";
pub const CREATE_NETWORK_ERROR_MESSAGE: &str = "Network error while creating container.";
pub const ACTION_NETWORK_ERROR_MESSAGE: &str = "Network error.";
pub const CREATING_MESSAGE: &str = "Creating container...";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshCycle {
    #[default]
    Idle,
    Fetching,
    Rendered,
    Error,
}

/// Everything the operator sees apart from the status message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardView {
    pub rows: Vec<ContainerRow>,
    pub refresh_cycle: RefreshCycle,
    pub name_input: String,
    /// Sequence number of the refresh whose result is on screen.
    pub applied_refresh: u64,
}

#[derive(Debug)]
pub struct DashboardController<R>
where
    R: ContainerRegistry + 'static,
{
    registry: Arc<R>,
    status: StatusChannel,
    view: watch::Sender<DashboardView>,
    policy: RenderPolicy,
    refresh_seq: AtomicU64,
    refreshes_in_flight: AtomicUsize,
    discard_stale_refreshes: bool,
}

impl<R> DashboardController<R>
where
    R: ContainerRegistry + 'static,
{
    pub fn new(registry: Arc<R>, config: &DashboardConfig) -> Self {
        let (view, _) = watch::channel(DashboardView::default());
        Self {
            registry,
            status: StatusChannel::new(config.success_clear_delay()),
            view,
            policy: RenderPolicy::from_config(config),
            refresh_seq: AtomicU64::new(0),
            refreshes_in_flight: AtomicUsize::new(0),
            discard_stale_refreshes: config.discard_stale_refreshes,
        }
    }

    pub fn status(&self) -> &StatusChannel {
        &self.status
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusSlot> {
        self.status.subscribe()
    }

    pub fn subscribe_view(&self) -> watch::Receiver<DashboardView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    pub fn set_name_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.view.send_modify(|view| view.name_input = text);
    }

    /// Full re-fetch and re-render of the container table.
    pub async fn refresh(&self) {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.refreshes_in_flight.fetch_add(1, Ordering::SeqCst);
        self.enter(RefreshCycle::Fetching);

        match self.registry.list_containers().await {
            Ok(containers) => {
                let rows = self.policy.render(&containers);
                let discard_stale = self.discard_stale_refreshes;
                let applied = self.view.send_if_modified(|view| {
                    if discard_stale && seq < view.applied_refresh {
                        return false;
                    }
                    view.rows = rows;
                    view.applied_refresh = seq;
                    view.refresh_cycle = RefreshCycle::Rendered;
                    true
                });

                if applied {
                    debug!("Refresh #{} rendered {} containers", seq, containers.len());
                } else {
                    debug!("Refresh #{} arrived after a newer one, discarded", seq);
                }
                self.settle();
            }
            Err(e) => {
                error!("Refresh #{} failed [{}]: {}", seq, e.error_code(), e);
                self.status.show(list_failure_text(&e), StatusKind::Error);
                self.enter(RefreshCycle::Error);
                self.settle();
            }
        }
    }

    /// Creates a container named after the current name input.
    pub async fn submit_create(&self) {
        let input = self.view.borrow().name_input.clone();

        let name = match ContainerName::parse(&input) {
            Ok(name) => name,
            Err(e) => {
                warn!("Rejected create request: {}", e);
                self.status.show(e.to_string(), StatusKind::Error);
                return;
            }
        };

        self.status.show(CREATING_MESSAGE, StatusKind::Loading);

        match self.registry.create_container(&name).await {
            Ok(created) => {
                match &created.id {
                    Some(id) => info!("Container '{}' created with id {}", name, id),
                    None => info!("Container '{}' created", name),
                }
                self.status.show(
                    format!("Container '{}' created successfully!", name),
                    StatusKind::Success,
                );
                self.view.send_modify(|view| view.name_input.clear());
                self.refresh().await;
            }
            Err(e) => {
                error!("Creating '{}' failed [{}]: {}", name, e.error_code(), e);
                self.status.show(
                    failure_text(&e, CREATE_NETWORK_ERROR_MESSAGE),
                    StatusKind::Error,
                );
            }
        }
    }

    pub async fn create(&self, input: &str) {
        self.set_name_input(input);
        self.submit_create().await;
    }

    pub async fn dispatch_action(&self, id: &ContainerId, action: ContainerAction) {
        self.status.show(
            format!("{} container...", action.gerund()),
            StatusKind::Loading,
        );

        match self.registry.perform_action(id, action).await {
            Ok(message) => {
                info!("Action '{}' on {} succeeded: {}", action, id, message);
                self.status.show(message, StatusKind::Success);
                self.refresh().await;
            }
            Err(e) => {
                error!("Action '{}' on {} failed [{}]: {}", action, id, e.error_code(), e);
                self.status.show(
                    failure_text(&e, ACTION_NETWORK_ERROR_MESSAGE),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Resolves a row by 1-based position or id prefix and runs `action` on it,
    /// provided the row currently offers that action.
    pub async fn request_action(&self, selector: &str, action: &str) {
        match self.resolve_action(selector, action) {
            Ok((id, action)) => self.dispatch_action(&id, action).await,
            Err(e) => {
                warn!("Rejected action request: {}", e);
                self.status.show(e.to_string(), StatusKind::Error);
            }
        }
    }

    fn resolve_action(
        &self,
        selector: &str,
        action: &str,
    ) -> Result<(ContainerId, ContainerAction), ValidationError> {
        let action: ContainerAction = action.trim().parse()?;
        let selector = selector.trim();
        let view = self.view.borrow();

        let row = match selector.parse::<usize>() {
            Ok(position) if position >= 1 && position <= view.rows.len() => {
                view.rows.get(position - 1)
            }
            _ if selector.is_empty() => None,
            _ => view
                .rows
                .iter()
                .find(|row| row.id.as_str().starts_with(selector)),
        }
        .ok_or_else(|| ValidationError::UnknownContainer(selector.to_string()))?;

        if !row.offers(action) {
            return Err(ValidationError::ActionNotOffered {
                id: row.short_id.clone(),
                action: action.to_string(),
            });
        }

        Ok((row.id.clone(), action))
    }

    /// Back to `Idle` once no other refresh is outstanding.
    fn settle(&self) {
        let remaining = self.refreshes_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        if remaining == 0 {
            self.enter(RefreshCycle::Idle);
        } else {
            self.enter(RefreshCycle::Fetching);
        }
    }

    fn enter(&self, state: RefreshCycle) {
        debug!("Refresh cycle -> {:?}", state);
        self.view.send_modify(|view| view.refresh_cycle = state);
    }
}

fn list_failure_text(error: &RegistryError) -> String {
    match error {
        RegistryError::Backend { message, .. } => message.clone(),
        RegistryError::Transport { .. } => LIST_FAILED_MESSAGE.to_string(),
        RegistryError::Validation(e) => e.to_string(),
    }
}

fn failure_text(error: &RegistryError, network_message: &str) -> String {
    match error {
        RegistryError::Backend { message, .. } => format!("Error: {}", message),
        RegistryError::Transport { .. } => network_message.to_string(),
        RegistryError::Validation(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::container::{Container, ContainerStatus, CreatedContainer, PublishedPort};
    use crate::repositories::container_registry::MockContainerRegistry;
    use crate::usecases::render::{PortCell, StatusBadge};
    use mockall::Sequence;

    fn config() -> DashboardConfig {
        DashboardConfig {
            api_base_url: "http://panel.test:5000".to_string(),
            ..Default::default()
        }
    }

    fn container(id: &str, name: &str, status: &str, port: Option<u16>) -> Container {
        Container {
            id: ContainerId::new(id),
            name: name.to_string(),
            status: ContainerStatus::from(status),
            image: "nginx".to_string(),
            port: PublishedPort::from(port),
        }
    }

    fn controller(mock: MockContainerRegistry) -> DashboardController<MockContainerRegistry> {
        DashboardController::new(Arc::new(mock), &config())
    }

    fn status_text<R: ContainerRegistry + 'static>(controller: &DashboardController<R>) -> Option<String> {
        controller.status().current().map(|message| message.text)
    }

    fn backend_error(message: &str) -> RegistryError {
        RegistryError::Backend {
            status: Some(500),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn given_one_running_container_when_loaded_then_single_row_with_stop_and_link() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_list_containers().times(1).returning(|| {
            Ok(vec![container(
                "abc123456789abcdef",
                "web1",
                "running",
                Some(8080),
            )])
        });
        let controller = controller(mock);

        controller.refresh().await;

        let view = controller.view();
        assert_eq!(view.rows.len(), 1);
        let row = &view.rows[0];
        assert_eq!(row.name, "web1");
        assert_eq!(row.short_id, "abc123456789");
        assert_eq!(row.badge, StatusBadge::Running);
        assert_eq!(row.status.as_str(), "running");
        assert_eq!(
            row.actions,
            vec![ContainerAction::Stop, ContainerAction::Delete]
        );
        assert_eq!(
            row.port,
            PortCell::Link {
                port: 8080,
                url: "http://panel.test:8080".to_string()
            }
        );
        assert_eq!(view.refresh_cycle, RefreshCycle::Idle);
        assert_eq!(status_text(&controller), None);
    }

    #[tokio::test]
    async fn given_transport_failure_when_loaded_then_generic_list_error_is_shown() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_list_containers()
            .times(1)
            .returning(|| Err(RegistryError::transport("http://panel.test", "refused")));
        let controller = controller(mock);

        controller.refresh().await;

        let message = controller.status().current().unwrap();
        assert_eq!(message.text, LIST_FAILED_MESSAGE);
        assert_eq!(message.kind, StatusKind::Error);
        assert_eq!(controller.view().refresh_cycle, RefreshCycle::Idle);
        assert!(controller.view().rows.is_empty());
    }

    #[tokio::test]
    async fn given_backend_list_error_when_loaded_then_backend_text_is_shown_verbatim() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_list_containers()
            .returning(|| Err(backend_error("Docker not connected")));
        let controller = controller(mock);

        controller.refresh().await;

        assert_eq!(status_text(&controller).as_deref(), Some("Docker not connected"));
    }

    #[tokio::test]
    async fn given_whitespace_name_when_submitted_then_validation_error_and_no_calls() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_create_container().never();
        mock.expect_list_containers().never();
        let controller = controller(mock);

        controller.create("   ").await;

        let message = controller.status().current().unwrap();
        assert_eq!(message.text, "Please enter a container name.");
        assert_eq!(message.kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn given_padded_name_when_created_then_trimmed_name_is_sent_and_list_refreshed() {
        let mut seq = Sequence::new();
        let mut mock = MockContainerRegistry::new();
        mock.expect_create_container()
            .withf(|name| name.as_str() == "web1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(CreatedContainer {
                    id: Some(ContainerId::new("0123456789ab")),
                    message: Some("Container created".to_string()),
                })
            });
        mock.expect_list_containers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![container("0123456789ab", "web1", "running", None)]));
        let controller = controller(mock);

        controller.create("  web1  ").await;

        let message = controller.status().current().unwrap();
        assert_eq!(message.text, "Container 'web1' created successfully!");
        assert_eq!(message.kind, StatusKind::Success);
        let view = controller.view();
        assert_eq!(view.name_input, "");
        assert_eq!(view.rows.len(), 1);
    }

    #[tokio::test]
    async fn given_create_reply_without_id_when_submitted_then_success_and_single_refresh() {
        let mut seq = Sequence::new();
        let mut mock = MockContainerRegistry::new();
        mock.expect_create_container()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(CreatedContainer {
                    id: None,
                    message: Some("Container created".to_string()),
                })
            });
        mock.expect_list_containers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![container("0123456789ab", "web1", "running", None)]));
        let controller = controller(mock);

        controller.create("web1").await;

        let message = controller.status().current().unwrap();
        assert_eq!(message.text, "Container 'web1' created successfully!");
        assert_eq!(message.kind, StatusKind::Success);
        assert_eq!(controller.view().name_input, "");
    }

    #[tokio::test]
    async fn given_backend_rejects_create_when_submitted_then_error_kept_and_no_refresh() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_create_container()
            .times(1)
            .returning(|_| Err(backend_error("Conflict. The container name is already in use")));
        mock.expect_list_containers().never();
        let controller = controller(mock);
        controller.set_name_input("web1");

        controller.submit_create().await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some("Error: Conflict. The container name is already in use")
        );
        assert_eq!(controller.view().name_input, "web1");
    }

    #[tokio::test]
    async fn given_transport_failure_on_create_when_submitted_then_network_message() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_create_container()
            .returning(|_| Err(RegistryError::transport("http://panel.test", "reset")));
        mock.expect_list_containers().never();
        let controller = controller(mock);

        controller.create("web1").await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some(CREATE_NETWORK_ERROR_MESSAGE)
        );
    }

    #[tokio::test]
    async fn given_stop_rejected_by_backend_when_dispatched_then_error_and_no_refresh() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_perform_action()
            .withf(|id, action| id.as_str() == "abc123" && *action == ContainerAction::Stop)
            .times(1)
            .returning(|_, _| Err(backend_error("container not running")));
        mock.expect_list_containers().never();
        let controller = controller(mock);

        controller
            .dispatch_action(&ContainerId::new("abc123"), ContainerAction::Stop)
            .await;

        let message = controller.status().current().unwrap();
        assert_eq!(message.text, "Error: container not running");
        assert_eq!(message.kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn given_delete_succeeds_when_dispatched_then_message_shown_and_table_rebuilt() {
        let mut seq = Sequence::new();
        let mut mock = MockContainerRegistry::new();
        mock.expect_perform_action()
            .withf(|id, action| id.as_str() == "abc123" && *action == ContainerAction::Delete)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok("Container deleted".to_string()));
        mock.expect_list_containers()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![container("other", "web2", "exited", None)]));
        let controller = controller(mock);

        controller
            .dispatch_action(&ContainerId::new("abc123"), ContainerAction::Delete)
            .await;

        assert_eq!(status_text(&controller).as_deref(), Some("Container deleted"));
        let rows = controller.view().rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "web2");
    }

    #[tokio::test]
    async fn given_action_success_and_refresh_failure_when_dispatched_then_error_replaces_success()
    {
        let mut mock = MockContainerRegistry::new();
        mock.expect_perform_action()
            .returning(|_, _| Ok("Container web1 started".to_string()));
        mock.expect_list_containers()
            .returning(|| Err(RegistryError::transport("http://panel.test", "refused")));
        let controller = controller(mock);

        controller
            .dispatch_action(&ContainerId::new("abc123"), ContainerAction::Start)
            .await;

        assert_eq!(status_text(&controller).as_deref(), Some(LIST_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn given_rendered_rows_when_action_requested_by_position_then_full_id_is_used() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_list_containers()
            .returning(|| Ok(vec![container("abcdef0123456789", "web1", "running", None)]));
        mock.expect_perform_action()
            .withf(|id, action| {
                id.as_str() == "abcdef0123456789" && *action == ContainerAction::Stop
            })
            .times(1)
            .returning(|_, _| Ok("Container web1 stopped".to_string()));
        let controller = controller(mock);
        controller.refresh().await;

        controller.request_action("1", "stop").await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some("Container web1 stopped")
        );
    }

    #[tokio::test]
    async fn given_running_row_when_start_requested_then_not_offered_and_no_request() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_list_containers()
            .times(1)
            .returning(|| Ok(vec![container("abcdef0123456789", "web1", "running", None)]));
        mock.expect_perform_action().never();
        let controller = controller(mock);
        controller.refresh().await;

        controller.request_action("abcdef", "start").await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some("Action 'start' is not available for container abcdef012345")
        );
    }

    #[tokio::test]
    async fn given_free_form_action_when_requested_then_rejected_before_any_request() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_perform_action().never();
        let controller = controller(mock);

        controller.request_action("1", "restart").await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some("Unknown action 'restart'")
        );
    }

    #[tokio::test]
    async fn given_unknown_selector_when_requested_then_no_container_matches() {
        let mut mock = MockContainerRegistry::new();
        mock.expect_perform_action().never();
        let controller = controller(mock);

        controller.request_action("7", "delete").await;

        assert_eq!(
            status_text(&controller).as_deref(),
            Some("No container matches '7'")
        );
    }
}
