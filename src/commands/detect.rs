//! Command: list detected targets.
use anyhow::Result;

use crate::cli::{DetectOpts, GlobalOpts};
use crate::config::InstallSettings;
use crate::error::InstallError;
use crate::install::{InstallTarget, TargetDetector};
use crate::logging::{Log, Logger};
use crate::platform::Platform;

/// Run the detect command: list targets without changing anything.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or no target was found.
pub fn run(global: &GlobalOpts, opts: &DetectOpts, log: &Logger) -> Result<()> {
    let settings = super::resolve_settings(global, &opts.targets, log)?;
    let targets = discover(&Platform::detect(), &settings, log);
    if targets.is_empty() {
        return Err(InstallError::NoTargetFound.into());
    }
    Ok(())
}

/// Discover and describe every target on `platform`.
pub fn discover(platform: &Platform, settings: &InstallSettings, log: &dyn Log) -> Vec<InstallTarget> {
    log.stage("Discovering Factorio installations");
    let targets = TargetDetector::for_host(platform, settings).discover(log);
    if targets.is_empty() {
        log.warn(&InstallError::NoTargetFound.to_string());
    }
    for target in &targets {
        log.info(&describe(target));
    }
    targets
}

/// One-line description of a target.
#[must_use]
pub fn describe(target: &InstallTarget) -> String {
    let mut line = format!("{target}: mods in {}", target.mods_dir.display());
    if let Some(steam) = &target.steam {
        line.push_str(&format!(
            ", steam {} (app {})",
            steam.steam_root.display(),
            steam.app_id
        ));
    }
    if !target.writable {
        line.push_str(", not writable");
    }
    line
}
