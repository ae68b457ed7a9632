use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::errors::engine::EngineError;
use crate::handlers::error::ApiFailure;
use crate::models::container::{Container, ContainerAction, ContainerId};
use crate::models::engine::{RunSpec, SHORT_ID_LEN};
use crate::models::response::{
    ApiResponse, CreateContainerRequest, CreatedBody, MessageBody, RawActionRequest,
};
use crate::repositories::container_engine::ContainerEngine;

pub const DEFAULT_CONTAINER_NAME: &str = "my-nginx";

/// Shared handler state. `engine` is `None` when the daemon was unreachable at startup.
#[derive(Debug)]
pub struct ApiState<E>
where
    E: ContainerEngine + 'static,
{
    pub engine: Option<Arc<E>>,
    pub engine_config: EngineConfig,
}

impl<E> Clone for ApiState<E>
where
    E: ContainerEngine + 'static,
{
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            engine_config: self.engine_config.clone(),
        }
    }
}

impl<E> ApiState<E>
where
    E: ContainerEngine + 'static,
{
    pub fn new(engine: Option<Arc<E>>, engine_config: EngineConfig) -> Self {
        Self {
            engine,
            engine_config,
        }
    }

    fn engine(&self) -> Result<Arc<E>, EngineError> {
        self.engine.clone().ok_or(EngineError::NotConnected)
    }
}

pub async fn list_containers<E>(
    State(state): State<ApiState<E>>,
) -> Result<Json<Vec<Container>>, ApiFailure>
where
    E: ContainerEngine + 'static,
{
    let engine = state.engine()?;
    let containers = engine
        .list_containers()
        .await?
        .into_iter()
        .map(Container::from)
        .collect();

    Ok(Json(containers))
}

pub async fn create_container<E>(
    State(state): State<ApiState<E>>,
    payload: Result<Json<CreateContainerRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedBody>, ApiFailure>
where
    E: ContainerEngine + 'static,
{
    let engine = state.engine()?;
    let Json(request) = payload?;
    let config = &state.engine_config;
    let name = request
        .name
        .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());

    let index_html = resolve_host_path(&config.index_html)?;
    if !index_html.exists() {
        return Err(EngineError::MissingIndexFile {
            path: index_html.display().to_string(),
        }
        .into());
    }

    let exposed = config.published_port.parse().map_err(|reason| EngineError::Api {
        status: None,
        reason,
    })?;
    let spec = RunSpec {
        name,
        image: config.image.clone(),
        index_html,
        exposed,
    };

    match engine.run_container(&spec).await {
        Ok(id) => {
            let id = ContainerId::new(id);
            info!("Container '{}' created as {}", spec.name, id.short(SHORT_ID_LEN));
            Ok(ApiResponse::created(CreatedBody {
                message: "Container created".to_string(),
                id: ContainerId::new(id.short(SHORT_ID_LEN)),
            }))
        }
        Err(EngineError::ImageNotFound { image }) => {
            spawn_image_pull(Arc::clone(&engine), image.clone());
            Err(EngineError::ImageNotFound { image }.into())
        }
        Err(e) => Err(ApiFailure::from(e).with_api_status(StatusCode::BAD_REQUEST)),
    }
}

pub async fn container_action<E>(
    State(state): State<ApiState<E>>,
    Path(id): Path<String>,
    payload: Result<Json<RawActionRequest>, JsonRejection>,
) -> Result<Json<MessageBody>, ApiFailure>
where
    E: ContainerEngine + 'static,
{
    let engine = state.engine()?;
    let Json(request) = payload?;
    let name = engine.container_name(&id).await?;

    let raw_action = request.action.unwrap_or_default();
    let action: ContainerAction = raw_action
        .parse()
        .map_err(|_| EngineError::InvalidAction { action: raw_action })?;

    match action {
        ContainerAction::Start => engine.start_container(&id).await?,
        ContainerAction::Stop => engine.stop_container(&id).await?,
        ContainerAction::Delete => engine.remove_container(&id).await?,
    }

    Ok(Json(MessageBody {
        message: format!("Container {} {}", name, action.past_tense()),
    }))
}

fn resolve_host_path(path: &str) -> Result<PathBuf, EngineError> {
    let path = FsPath::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    std::env::current_dir()
        .map(|dir| dir.join(path))
        .map_err(|e| EngineError::Api {
            status: None,
            reason: format!("Cannot resolve {}: {}", path.display(), e),
        })
}

fn spawn_image_pull<E>(engine: Arc<E>, image: String)
where
    E: ContainerEngine + 'static,
{
    tokio::spawn(async move {
        match engine.pull_image(&image).await {
            Ok(()) => info!("Pulled image {}", image),
            Err(e) => warn!("Pulling image {} failed: {}", image, e),
        }
    });
}
