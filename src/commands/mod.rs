//! Top-level subcommand implementations.
pub mod detect;
pub mod install;
pub mod version;

use anyhow::Result;
use std::path::Path;

use crate::cli::{GlobalOpts, TargetOpts};
use crate::config::{Config, DEFAULT_CONFIG_FILE, InstallSettings};
use crate::logging::Log;

/// Load `fa-release.toml` (or the `--config` file) and append the
/// command-line custom paths.
///
/// # Errors
///
/// Returns an error if the settings file exists but cannot be parsed.
pub fn resolve_settings(
    global: &GlobalOpts,
    targets: &TargetOpts,
    log: &dyn Log,
) -> Result<InstallSettings> {
    let path = global
        .config
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    log.stage("Loading configuration");
    let mut settings = Config::load(path)?.install;
    settings
        .custom_paths
        .extend(targets.custom_paths.iter().cloned());

    log.debug(&format!("settings: {}", path.display()));
    log.debug(&format!("bundle: {}", settings.bundle.display()));
    log.debug(&format!("{} custom paths", settings.custom_paths.len()));
    log.debug(&format!("steam app id: {}", settings.steam_app_id));
    Ok(settings)
}

/// The version string embedded at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("FA_RELEASE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
