//! Merge a bundle into one target's `mods/` directory.
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read as _;
use std::path::Path;

use super::InstallTarget;
use super::mod_list::ModListState;
use crate::config::bundle::{Bundle, BundleEntry, BundleSource};
use crate::error::InstallError;
use crate::logging::Log;
use crate::resources::file_copy::FileCopyResource;
use crate::resources::helpers::fs::remove_existing;
use crate::resources::mod_directory::ModDirectoryResource;
use crate::resources::{Resource, ResourceChange, reconcile};

/// Outcome of merging a bundle into one target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeResult {
    /// Mods present and current in the target after the merge.
    pub applied_mods: BTreeSet<String>,
    /// Subset of `applied_mods` whose files were written by this merge.
    pub updated_mods: BTreeSet<String>,
    /// Whether `mod-list.json` was written.
    pub mod_list_written: bool,
    /// Per-entry and per-asset failures; none of them stopped the merge.
    pub warnings: Vec<InstallError>,
}

/// The `name` and `version` fields every Factorio mod declares.
#[derive(Debug, Deserialize)]
struct ModInfo {
    name: String,
    version: String,
}

/// Copies bundle content into targets and updates their mod lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct BundleMerger;

impl BundleMerger {
    /// Apply `bundle` to `target`.
    ///
    /// Each entry is validated and copied in (zip) or mirrored (raw); once
    /// it is in place, stale copies of the same mod are removed.  The launcher goes to
    /// the target root.  The mod list gains entries only for mods it has not
    /// seen before.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::TargetUnwritable`] if `mods/` or `saves/`
    /// cannot be created.  Every other failure is collected in
    /// [`MergeResult::warnings`].
    pub fn apply(
        &self,
        bundle: &Bundle,
        target: &InstallTarget,
        log: &dyn Log,
    ) -> Result<MergeResult, InstallError> {
        for dir in [&target.mods_dir, &target.saves_dir] {
            std::fs::create_dir_all(dir).map_err(|e| InstallError::TargetUnwritable {
                path: target.root_path.clone(),
                reason: format!("cannot create {}: {e}", dir.display()),
            })?;
        }

        let mut result = MergeResult::default();
        for entry in bundle.entries() {
            match install_entry(entry, target, log) {
                Ok(change) => {
                    if change == ResourceChange::Applied {
                        log.info(&format!("installed {}", entry.mod_name));
                        result.updated_mods.insert(entry.mod_name.clone());
                    }
                    result.applied_mods.insert(entry.mod_name.clone());
                }
                Err(e) => {
                    log.warn(&e.to_string());
                    result.warnings.push(e);
                }
            }
        }

        if let Some(launcher) = &bundle.shared_assets.launcher
            && let Err(e) = install_asset(launcher, target, log)
        {
            log.warn(&e.to_string());
            result.warnings.push(e);
        }

        match merge_mod_list(bundle, target, &result.applied_mods, log) {
            Ok(written) => result.mod_list_written = written,
            Err(e) => {
                log.warn(&e.to_string());
                result.warnings.push(e);
            }
        }

        Ok(result)
    }
}

fn install_entry(
    entry: &BundleEntry,
    target: &InstallTarget,
    log: &dyn Log,
) -> Result<ResourceChange, InstallError> {
    let name = &entry.mod_name;
    let copy_failed = |reason: String| InstallError::EntryCopyFailed {
        mod_name: name.clone(),
        reason,
    };
    let source = entry.source.path();
    let exists = match &entry.source {
        BundleSource::Archive(p) => p.is_file(),
        BundleSource::Directory(p) => p.is_dir(),
    };
    if !exists {
        return Err(copy_failed(format!(
            "source does not exist: {}",
            source.display()
        )));
    }

    validate_entry(entry).map_err(|reason| InstallError::InvalidModEntry {
        mod_name: name.clone(),
        reason,
    })?;

    let resource: Box<dyn Resource> = match &entry.source {
        BundleSource::Archive(path) => {
            let file_name = path
                .file_name()
                .ok_or_else(|| copy_failed(format!("archive has no file name: {}", path.display())))?;
            Box::new(FileCopyResource::new(
                path.clone(),
                target.mods_dir.join(file_name),
            ))
        }
        BundleSource::Directory(path) => Box::new(ModDirectoryResource::new(
            path.clone(),
            target.mods_dir.join(name),
        )),
    };

    let change = match reconcile(resource.as_ref(), log)
        .map_err(|e| copy_failed(format!("{e:#}")))?
    {
        ResourceChange::Skipped { reason } => return Err(copy_failed(reason)),
        change => change,
    };

    // Old copies go only once the new one is in place.
    remove_stale_copies(entry, target, log).map_err(|e| copy_failed(format!("{e:#}")))?;
    Ok(change)
}

/// Check the entry's `info.json` against its declared name.
fn validate_entry(entry: &BundleEntry) -> Result<(), String> {
    let raw = match &entry.source {
        BundleSource::Directory(dir) => std::fs::read_to_string(dir.join("info.json"))
            .map_err(|e| format!("cannot read info.json: {e}"))?,
        BundleSource::Archive(path) => read_archive_info(path)?,
    };
    let info: ModInfo =
        serde_json::from_str(&raw).map_err(|e| format!("invalid info.json: {e}"))?;
    if info.name != entry.mod_name {
        return Err(format!(
            "info.json names the mod '{}', expected '{}'",
            info.name, entry.mod_name
        ));
    }
    if info.version.trim().is_empty() {
        return Err("info.json has an empty version".to_string());
    }
    Ok(())
}

/// Read `<top-level>/info.json` from a mod archive.
fn read_archive_info(path: &Path) -> Result<String, String> {
    let file = std::fs::File::open(path).map_err(|e| format!("cannot open archive: {e}"))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| format!("not a zip archive: {e}"))?;
    let info_name = archive
        .file_names()
        .find(|n| {
            n.split_once('/')
                .is_some_and(|(top, rest)| !top.is_empty() && rest == "info.json")
        })
        .map(str::to_string)
        .ok_or_else(|| "archive has no <folder>/info.json".to_string())?;
    let mut content = String::new();
    archive
        .by_name(&info_name)
        .map_err(|e| format!("cannot read {info_name}: {e}"))?
        .read_to_string(&mut content)
        .map_err(|e| format!("cannot read {info_name}: {e}"))?;
    Ok(content)
}

/// Remove other copies of the entry's mod so the game sees exactly one.
fn remove_stale_copies(
    entry: &BundleEntry,
    target: &InstallTarget,
    log: &dyn Log,
) -> anyhow::Result<()> {
    let name = &entry.mod_name;
    let keep = match &entry.source {
        BundleSource::Archive(path) => {
            let folder = target.mods_dir.join(name);
            if folder.symlink_metadata().is_ok() {
                log.debug(&format!("removing stale folder {}", folder.display()));
                remove_existing(&folder)?;
            }
            path.file_name().map(std::ffi::OsStr::to_os_string)
        }
        BundleSource::Directory(_) => None,
    };

    let entries = std::fs::read_dir(&target.mods_dir)?;
    for dir_entry in entries.flatten() {
        let file_name = dir_entry.file_name();
        if keep.as_ref() == Some(&file_name) {
            continue;
        }
        if is_archive_of(&file_name.to_string_lossy(), name) {
            let path = dir_entry.path();
            log.debug(&format!("removing stale archive {}", path.display()));
            remove_existing(&path)?;
        }
    }
    Ok(())
}

/// Whether `file_name` is `<mod>.zip` or `<mod>_<version>.zip`.
fn is_archive_of(file_name: &str, mod_name: &str) -> bool {
    let Some(rest) = file_name
        .strip_suffix(".zip")
        .and_then(|stem| stem.strip_prefix(mod_name))
    else {
        return false;
    };
    rest.is_empty()
        || rest.strip_prefix('_').is_some_and(|version| {
            !version.is_empty() && version.chars().all(|c| c.is_ascii_digit() || c == '.')
        })
}

fn install_asset(asset: &Path, target: &InstallTarget, log: &dyn Log) -> Result<(), InstallError> {
    let asset_name = asset
        .file_name()
        .map_or_else(|| asset.display().to_string(), |n| n.to_string_lossy().into_owned());
    let failed = |reason: String| InstallError::AssetCopyFailed {
        asset: asset_name.clone(),
        reason,
    };
    let dest = target
        .asset_path(asset)
        .ok_or_else(|| failed("asset path has no file name".to_string()))?;
    match reconcile(&FileCopyResource::new(asset.to_path_buf(), dest), log)
        .map_err(|e| failed(format!("{e:#}")))?
    {
        ResourceChange::Skipped { reason } => Err(failed(reason)),
        _ => Ok(()),
    }
}

/// Add defaults for new mods to `mod-list.json`.  Returns whether the file
/// was written.
fn merge_mod_list(
    bundle: &Bundle,
    target: &InstallTarget,
    applied: &BTreeSet<String>,
    log: &dyn Log,
) -> Result<bool, InstallError> {
    let path = target.mod_list_path();
    let existing = ModListState::load(&path)?;
    let mut changed = existing.is_none();
    let mut state = existing.unwrap_or_default();

    if let Some(template_path) = &bundle.shared_assets.mod_list_template {
        match ModListState::load(template_path)? {
            Some(template) => {
                for entry in &template.mods {
                    let enabled = match bundle.entry(&entry.name) {
                        Some(_) if !applied.contains(&entry.name) => continue,
                        Some(bundled) => bundled.enabled,
                        None => entry.enabled,
                    };
                    changed |= state.insert_default(&entry.name, enabled);
                }
            }
            None => log.debug(&format!(
                "mod list template {} not found",
                template_path.display()
            )),
        }
    }

    for entry in bundle.entries() {
        if applied.contains(&entry.mod_name) {
            changed |= state.insert_default(&entry.mod_name, entry.enabled);
        }
    }

    if !changed {
        log.debug(&format!("{} already current", path.display()));
        return Ok(false);
    }
    state
        .save(&path)
        .map_err(|e| InstallError::AssetCopyFailed {
            asset: super::mod_list::MOD_LIST_FILE.to_string(),
            reason: format!("{e:#}"),
        })?;
    log.debug(&format!("wrote {}", path.display()));
    Ok(true)
}
