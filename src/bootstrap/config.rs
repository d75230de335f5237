//! # Configuration Loader
//!
//! Reads the TOML file and maps it onto [`AppConfig`]. Business rules are
//! not checked here; the DTO parser only rejects values it cannot represent.

use anyhow::Context;
use std::path::{Path, PathBuf};

use ca_core::config::AppConfig;

/// Overrides the config location when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "COMPANY_APPLY_CONFIG";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file.
///
/// # Errors
///
/// - File cannot be read
/// - Content is not valid TOML
/// - A value has the wrong type or names an unknown slot
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    let config = AppConfig::from_toml(&toml_value)
        .with_context(|| format!("Invalid config file: {}", config_path.display()))?;
    Ok(config)
}

/// Picks the config path: `--config`, then [`CONFIG_ENV_VAR`], then
/// `config.toml` inside `default_dir`.
pub fn resolve_config_path(explicit: Option<PathBuf>, default_dir: &Path) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .unwrap_or_else(|| default_dir.join(CONFIG_FILE_NAME))
}

/// Like [`load_config`], but an absent file yields [`AppConfig::default`].
pub fn load_config_or_default(config_path: &Path) -> anyhow::Result<AppConfig> {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "config file not found; using defaults");
        return Ok(AppConfig::default());
    }
    load_config(config_path)
}
