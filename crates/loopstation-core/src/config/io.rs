//! YAML load/save for [`LooperConfig`]

use anyhow::{Context, Result};
use std::path::Path;

use super::LooperConfig;

/// Load the looper config from a YAML file
///
/// A missing file gives the defaults. An unreadable or invalid file logs a
/// warning and also gives the defaults, so a broken config never stops the
/// looper from starting. Levels are clamped into range.
pub fn load_config(path: &Path) -> LooperConfig {
    if !path.exists() {
        log::info!("load_config: {:?} not found, using defaults", path);
        return LooperConfig::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!("load_config: Cannot read {:?}: {}, using defaults", path, e);
            return LooperConfig::default();
        }
    };

    match serde_yaml::from_str::<LooperConfig>(&contents) {
        Ok(config) => {
            log::info!("load_config: Loaded {:?}", path);
            config.sanitized()
        }
        Err(e) => {
            log::warn!("load_config: Invalid config in {:?}: {}, using defaults", path, e);
            LooperConfig::default()
        }
    }
}

/// Save the looper config as YAML, creating parent directories as needed
pub fn save_config(config: &LooperConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize looper config")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Saved {:?}", path);
    Ok(())
}
