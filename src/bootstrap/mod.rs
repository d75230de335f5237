//! Startup: config loading, tracing and dependency wiring.

pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{load_config, load_config_or_default, resolve_config_path, CONFIG_ENV_VAR};
pub use tracing::init_tracing_subscriber;
pub use wiring::{resolve_app_paths, wire_dependencies, AppPaths, WiredApp, WiringError};
