pub mod config;
pub mod connectors;
pub mod core;
pub mod errors;
pub mod notify;
pub mod types;
