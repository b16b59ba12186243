//! Configuration module - Application settings
//!
//! This module provides functionality for:
//! - Loading configuration from `config.json` in the platform config dir
//! - Default values for all settings
//! - Locating the key-value store file
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - The `Config` struct
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

pub use defaults::{DEFAULT_HOTKEYS_ENABLED, DEFAULT_IMAGE_WIDTH};

pub use types::Config;

pub use loader::{app_dir, default_config_path, default_storage_path, load_config};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
