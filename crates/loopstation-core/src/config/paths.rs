//! Standard location of the looper config file

use std::path::PathBuf;

/// Directory name under the platform config directory
pub const APP_DIR: &str = "loopstation";

/// Config file name
pub const CONFIG_FILE: &str = "config.yaml";

/// Get the default config file path
///
/// Returns: `<config dir>/loopstation/config.yaml`, e.g.
/// `~/.config/loopstation/config.yaml` on Linux. Falls back to the current
/// directory when the platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("loopstation/config.yaml"));
    }
}
