//! Configuration module for searchsynth
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming an explicit settings file
pub const SETTINGS_PATH_VAR: &str = "SEARCHSYNTH_SETTINGS_PATH";

/// Load settings from an explicit path, the well-known locations, or defaults.
///
/// Environment variables are merged on top in every case.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "settings file not found: {}",
                    path.display()
                )));
            }
            info!("Loading settings from: {}", path.display());
            Settings::from_file(path)?
        }
        None => match find_settings_file() {
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

/// First existing settings file among the search locations
fn find_settings_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(SETTINGS_PATH_VAR) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let mut paths = vec![
        PathBuf::from("searchsynth.yml"),
        PathBuf::from("config/searchsynth.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("searchsynth/settings.yml"));
    }

    paths.into_iter().find(|p| p.exists())
}
