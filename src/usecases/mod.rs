pub mod dashboard;
pub mod render;
pub mod status_channel;
