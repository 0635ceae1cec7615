//! Screen reader script placement.
//!
//! JAWS keeps per-version, per-language settings under
//! `%APPDATA%\Freedom Scientific\JAWS\<version>\Settings\<language>\`.  The
//! script is copied into each of them; other platforms have no known
//! directories.
use std::path::{Path, PathBuf};

use crate::error::InstallError;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::file_copy::FileCopyResource;
use crate::resources::{ResourceChange, reconcile};

/// Result for one assistive-technology directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistiveOutcome {
    /// Settings directory the script was copied into.
    pub dir: PathBuf,
    /// What happened there.
    pub outcome: Result<ResourceChange, InstallError>,
}

/// Copies the screen reader script into every known settings directory.
#[derive(Debug, Clone, Default)]
pub struct AssistiveScriptInstaller {
    dirs: Vec<PathBuf>,
}

impl AssistiveScriptInstaller {
    /// Enumerate the host's JAWS settings directories.
    #[must_use]
    pub fn for_host(platform: &Platform) -> Self {
        let dirs = match (&platform.appdata, platform.is_windows()) {
            (Some(appdata), true) => jaws_settings_dirs(&appdata.join("Freedom Scientific/JAWS")),
            _ => Vec::new(),
        };
        Self::with_dirs(dirs)
    }

    /// Use the given directories.
    #[must_use]
    pub const fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Directories that will receive the script.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Copy `script` into each directory, keeping its file name.  Each
    /// directory's outcome is independent of the others.
    pub fn install(&self, script: &Path, log: &dyn Log) -> Vec<AssistiveOutcome> {
        self.dirs
            .iter()
            .map(|dir| {
                let outcome = install_into(script, dir, log);
                if let Err(e) = &outcome {
                    log.warn(&e.to_string());
                }
                AssistiveOutcome {
                    dir: dir.clone(),
                    outcome,
                }
            })
            .collect()
    }
}

fn install_into(script: &Path, dir: &Path, log: &dyn Log) -> Result<ResourceChange, InstallError> {
    let failed = |reason: String| InstallError::AssistiveDirCopyFailed {
        dir: dir.to_path_buf(),
        reason,
    };
    let name = script
        .file_name()
        .ok_or_else(|| failed(format!("script path has no file name: {}", script.display())))?;
    let resource = FileCopyResource::new(script.to_path_buf(), dir.join(name));
    match reconcile(&resource, log).map_err(|e| failed(format!("{e:#}")))? {
        ResourceChange::Skipped { reason } => Err(failed(reason)),
        change => Ok(change),
    }
}

/// `<jaws>/<version>/Settings/<language>` for every version and language
/// present, sorted.
fn jaws_settings_dirs(jaws_root: &Path) -> Vec<PathBuf> {
    let subdirs = |dir: &Path| -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect()
            })
            .unwrap_or_default()
    };
    let mut dirs: Vec<PathBuf> = subdirs(jaws_root)
        .into_iter()
        .flat_map(|version| subdirs(&version.join("Settings")))
        .collect();
    dirs.sort();
    dirs
}
