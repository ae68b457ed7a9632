pub mod container;
pub mod engine;
pub mod response;
