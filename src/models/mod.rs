pub mod config;

pub use config::{AppConfig, ConfigLayer};
