//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use super::loader::default_storage_path;
use crate::editing::ImageWidth;

fn default_hotkeys_enabled() -> bool {
    DEFAULT_HOTKEYS_ENABLED
}

/// Application settings, read from `config.json`.
///
/// Every field has a default, so a partial file (or `{}`) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Width written by the image command and by pasted or dropped images
    /// (default: 420 px)
    #[serde(default)]
    pub image_width: ImageWidth,
    /// Whether markdown hotkeys are active (default: true)
    #[serde(default = "default_hotkeys_enabled")]
    pub hotkeys_enabled: bool,
    /// Key-value store location (default: next to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            image_width: ImageWidth::default(),
            hotkeys_enabled: DEFAULT_HOTKEYS_ENABLED,
            storage_path: None,
        }
    }
}

impl Config {
    /// Configured store location, or the default one.
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(default_storage_path)
    }
}
