//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

pub use crate::editing::DEFAULT_IMAGE_WIDTH;

/// Hotkeys are on unless the user turns them off
pub const DEFAULT_HOTKEYS_ENABLED: bool = true;

/// Directory under the platform config dir holding all files
pub const APP_DIR_NAME: &str = "anilist-markdown";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Key-value store file (hotkey mappings and other host settings)
pub const STORAGE_FILE_NAME: &str = "storage.json";
