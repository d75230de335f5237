use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "company-apply";

/// Application data root.
///
/// - macOS: ~/Library/Application Support/company-apply
/// - Windows: %APPDATA%\company-apply
/// - Linux: $XDG_DATA_HOME/company-apply or ~/.local/share/company-apply
///
/// The directory is not created here.
pub fn app_data_dir() -> Result<PathBuf> {
    let base_dir = platform_data_dir().context("Failed to get platform-specific data directory")?;
    Ok(base_dir.join(APP_DIR_NAME))
}

fn platform_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_data_home) = std::env::var_os("XDG_DATA_HOME") {
            return Ok(PathBuf::from(xdg_data_home));
        }
    }

    dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Unable to get platform data directory"))
}
