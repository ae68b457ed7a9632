pub mod config;
pub mod console;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod telemetry;
pub mod usecases;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, info};

use crate::config::Config;
use crate::console::Console;
use crate::errors::PanelResult;
use crate::handlers::containers::{container_action, create_container, list_containers, ApiState};
use crate::models::engine::ExposedPort;
use crate::repositories::container_engine::ContainerEngine;
use crate::repositories::docker_engine::DockerEngine;
use crate::repositories::http_registry::HttpRegistryClient;
use crate::usecases::dashboard::DashboardController;

pub fn router<E>(state: ApiState<E>) -> Router
where
    E: ContainerEngine + 'static,
{
    Router::new()
        .route(
            "/api/containers",
            get(list_containers::<E>).post(create_container::<E>),
        )
        .route("/api/containers/{id}/action", post(container_action::<E>))
        .with_state(state)
}

fn connect_engine(config: &Config) -> Option<Arc<DockerEngine>> {
    let exposed: ExposedPort = match config.engine.published_port.parse() {
        Ok(exposed) => exposed,
        Err(e) => {
            error!("Invalid published port in configuration: {}", e);
            return None;
        }
    };

    match DockerEngine::new(exposed, config.engine.stop_timeout_secs) {
        Ok(engine) => Some(Arc::new(engine)),
        Err(e) => {
            error!("Error connecting to Docker: {}", e);
            None
        }
    }
}

/// Runs the JSON API until the listener fails.
pub async fn serve(config: Config) -> PanelResult<()> {
    let engine = connect_engine(&config);
    let app = router(ApiState::new(engine, config.engine.clone()));

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .await
        .context("API server stopped unexpectedly")?;
    Ok(())
}

/// Runs the interactive dashboard against the API at `dashboard.api_base_url`.
pub async fn run_console(config: Config) -> PanelResult<()> {
    let registry = Arc::new(HttpRegistryClient::new(&config.dashboard.api_base_url)?);
    info!("Dashboard talking to {}", registry.base_url());

    let controller = Arc::new(DashboardController::new(registry, &config.dashboard));
    Console::new(controller).run().await?;
    Ok(())
}
