//! Configuration module for SearX-Relay
//!
//! Handles loading and validating settings from YAML files and environment variables.
//! Settings are built once at startup and handed to each component; nothing
//! reads configuration from global state.

mod settings;

pub use settings::*;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default settings file locations, checked in order
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("searx-relay/settings.yml"));
    }
    paths
}

/// Load settings from an explicit file, the first default path that exists,
/// or defaults, then merge environment values on top.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("settings file {} does not exist", path.display());
            }
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => match default_paths().into_iter().find(|p| p.exists()) {
            Some(path) => {
                info!("Loading settings from: {}", path.display());
                Settings::from_file(&path)?
            }
            None => {
                info!("No settings file found, using defaults");
                Settings::default()
            }
        },
    };

    settings.merge_env();
    Ok(settings)
}
