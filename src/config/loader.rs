//! Configuration loading from file system

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::{APP_DIR_NAME, CONFIG_FILE_NAME, STORAGE_FILE_NAME};
use super::types::Config;

/// Directory holding the config and store files.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default()
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE_NAME)
}

pub fn default_storage_path() -> PathBuf {
    app_dir().join(STORAGE_FILE_NAME)
}

/// Load configuration from a JSON file.
///
/// Returns Config::default() if the file is missing or cannot be parsed.
#[instrument(name = "load_config", skip(path), fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Config file not found, using defaults");
            return Config::default();
        }
        Err(e) => {
            warn!(error = %e, "Failed to read config, using defaults");
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&content) {
        Ok(config) => {
            info!(
                image_width = %config.image_width,
                hotkeys_enabled = config.hotkeys_enabled,
                "Successfully loaded config"
            );
            config
        }
        Err(e) => {
            // Point at the usual mistake: a bare number for imageWidth
            let hint = if e.to_string().contains("imageWidth") || e.to_string().contains("struct ImageWidth") {
                "imageWidth must look like {\"value\": 420, \"unit\": \"px\"}"
            } else {
                ""
            };
            warn!(error = %e, hint, "Failed to parse config JSON, using defaults");
            Config::default()
        }
    }
}
