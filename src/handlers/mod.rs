pub mod containers;
pub mod error;
