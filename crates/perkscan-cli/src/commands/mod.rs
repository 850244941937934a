//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod perks;
pub mod process;
pub mod serve;

use std::path::PathBuf;

use perkscan_core::models::config::PerkscanConfig;

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("perkscan")
        .join("config.json")
}

/// Load the config from an explicit path, the default path, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PerkscanConfig> {
    if let Some(path) = config_path {
        return Ok(PerkscanConfig::from_file(std::path::Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        Ok(PerkscanConfig::from_file(&default_path)?)
    } else {
        Ok(PerkscanConfig::default())
    }
}
