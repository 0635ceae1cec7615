//! Installer configuration: `fa-release.toml` settings and the bundle
//! manifest.
pub mod bundle;
pub mod toml_loader;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::steam::FACTORIO_APP_ID;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fa-release.toml";

/// Top-level `fa-release.toml` document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `[install]` table.
    pub install: InstallSettings,
}

/// Settings consumed by the `install` and `detect` commands.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSettings {
    /// Prepared bundle directory (contains `bundle.toml`).
    pub bundle: PathBuf,
    /// Extra game data roots or install directories to install into.
    pub custom_paths: Vec<PathBuf>,
    /// Steam application ID of the game.
    pub steam_app_id: String,
    /// Whether to edit Steam launch options for Steam targets.
    pub configure_launch_options: bool,
    /// Whether to copy the screen reader script into assistive-tool folders.
    pub install_screen_reader_script: bool,
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            bundle: PathBuf::from("dist/bundle"),
            custom_paths: Vec::new(),
            steam_app_id: FACTORIO_APP_ID.to_string(),
            configure_launch_options: true,
            install_screen_reader_script: true,
        }
    }
}

impl Config {
    /// Load settings from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or contains
    /// invalid TOML or unknown keys.
    pub fn load(path: &Path) -> Result<Self> {
        toml_loader::load_config(path)
            .with_context(|| format!("loading settings from {}", path.display()))
    }
}
