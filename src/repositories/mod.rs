pub mod container_engine;
pub mod container_registry;
pub mod docker_engine;
pub mod http_registry;
