// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read once at startup from a YAML file. Every field is
//! optional; anything missing falls back to the built-in default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV: &str = "BOXLABEL_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Height of the viewport the current image is fitted into, in points.
    pub canvas_height: f32,
    /// Corner handle hit tolerance, in image pixels.
    pub handle_radius: f64,
    /// Boxes must be strictly larger than this on both axes, in image pixels.
    pub min_box_size: f64,
    /// Backing file of the key-value cache.
    pub store_path: Option<PathBuf>,
    /// File name suggested by the export dialog.
    pub archive_name: String,
    /// Show the getting-started window at launch.
    pub show_welcome: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas_height: 600.0,
            handle_radius: 10.0,
            min_box_size: 5.0,
            store_path: None,
            archive_name: "dataset.zip".to_string(),
            show_welcome: true,
        }
    }
}

impl AppConfig {
    fn config_dir() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config").join("boxlabel"))
    }

    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| Self::config_dir().map(|dir| dir.join("config.yaml")))
    }

    /// Load the configuration, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(yaml) => Self::from_yaml(&yaml).unwrap_or_else(|e| {
                log::warn!("Ignoring unparsable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                log::debug!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Where the key-value cache lives, if anywhere.
    pub fn resolved_store_path(&self) -> Option<PathBuf> {
        self.store_path
            .clone()
            .or_else(|| Self::config_dir().map(|dir| dir.join("store.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("handle_radius: 14.5\n").unwrap();
        assert_eq!(config.handle_radius, 14.5);
        assert_eq!(config.min_box_size, 5.0);
        assert_eq!(config.archive_name, "dataset.zip");
        assert!(config.show_welcome);
    }

    #[test]
    fn test_welcome_can_be_turned_off() {
        let config = AppConfig::from_yaml("show_welcome: false\n").unwrap();
        assert!(!config.show_welcome);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_explicit_store_path_wins() {
        let config = AppConfig::from_yaml("store_path: /tmp/boxlabel-store.json\n").unwrap();
        assert_eq!(
            config.resolved_store_path(),
            Some(PathBuf::from("/tmp/boxlabel-store.json"))
        );
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("canvas_height: [1, 2").is_err());
    }
}
