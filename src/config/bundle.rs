//! Bundle manifest (`bundle.toml`) loading.
//!
//! A bundle is a prepared directory holding per-mod archives or source
//! folders plus shared assets.  The manifest lists each mod's name,
//! packaging mode, source path (relative to the bundle root), and the
//! `enabled` flag a new install should start with.
//!
//! ```toml
//! [[mods]]
//! name = "FactorioAccess"
//! mode = "zip"
//! path = "FactorioAccess_0.14.0.zip"
//!
//! [[mods]]
//! name = "fa-extras"
//! mode = "raw"
//! path = "src/fa-extras"
//! enabled = false
//!
//! [assets]
//! launcher = "launcher.exe"
//! mod_list = "mod-list.json"
//! screen_reader_script = "Factorio.jkm"
//! ```
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::error::BundleError;

/// File name of the manifest inside a bundle directory.
pub const MANIFEST_FILE: &str = "bundle.toml";

/// How a mod is shipped in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagingMode {
    /// A packaged `.zip` archive copied as-is.
    Zip,
    /// A source folder mirrored into `mods/<name>/`.
    Raw,
}

/// Where a bundle entry's content lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleSource {
    /// Zip mode: an archive file.
    Archive(PathBuf),
    /// Raw mode: a source directory.
    Directory(PathBuf),
}

impl BundleSource {
    /// Path of the archive or directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive(p) | Self::Directory(p) => p,
        }
    }
}

/// One mod shipped in a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Mod name as Factorio knows it (`info.json` `name`).
    pub mod_name: String,
    /// Archive or source directory.
    pub source: BundleSource,
    /// `enabled` flag for a mod the target has never seen.
    pub enabled: bool,
}

impl BundleEntry {
    /// Zip-mode entry.
    #[must_use]
    pub fn archive(mod_name: impl Into<String>, path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            mod_name: mod_name.into(),
            source: BundleSource::Archive(path.into()),
            enabled,
        }
    }

    /// Raw-mode entry.
    #[must_use]
    pub fn directory(mod_name: impl Into<String>, path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            mod_name: mod_name.into(),
            source: BundleSource::Directory(path.into()),
            enabled,
        }
    }
}

/// Files installed alongside the mods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedAssets {
    /// Accessibility launcher copied into the target root.
    pub launcher: Option<PathBuf>,
    /// Template `mod-list.json` supplying defaults such as `base`.
    pub mod_list_template: Option<PathBuf>,
    /// Screen reader script copied into assistive-tool folders.
    pub screen_reader_script: Option<PathBuf>,
}

/// A loaded, validated bundle.  Mod names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    entries: Vec<BundleEntry>,
    /// Shared asset files.
    pub shared_assets: SharedAssets,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    #[serde(default)]
    mods: Vec<ManifestMod>,
    #[serde(default)]
    assets: ManifestAssets,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestMod {
    name: String,
    mode: PackagingMode,
    path: PathBuf,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestAssets {
    launcher: Option<PathBuf>,
    mod_list: Option<PathBuf>,
    screen_reader_script: Option<PathBuf>,
}

const fn default_enabled() -> bool {
    true
}

/// Whether `name` is one normal path component, so `mods/<name>` stays
/// inside `mods/`.
fn is_plain_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(first)), None) if first == name
    )
}

impl Bundle {
    /// Build a bundle from entries, enforcing unique non-empty mod names that
    /// are each a single path component.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::EmptyModName`], [`BundleError::InvalidModName`]
    /// or [`BundleError::DuplicateMod`].
    pub fn new(entries: Vec<BundleEntry>, shared_assets: SharedAssets) -> Result<Self, BundleError> {
        let mut seen = HashSet::new();
        for (idx, entry) in entries.iter().enumerate() {
            if entry.mod_name.trim().is_empty() {
                return Err(BundleError::EmptyModName(idx));
            }
            if !is_plain_name(&entry.mod_name) {
                return Err(BundleError::InvalidModName(entry.mod_name.clone()));
            }
            if !seen.insert(entry.mod_name.as_str()) {
                return Err(BundleError::DuplicateMod(entry.mod_name.clone()));
            }
        }
        Ok(Self {
            entries,
            shared_assets,
        })
    }

    /// Load `<root>/bundle.toml`, resolving every path against `root`.
    ///
    /// Source paths are not checked here; a missing source surfaces as a
    /// per-entry warning during installation.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing, unreadable, malformed, or
    /// names a mod twice.
    pub fn load(root: &Path) -> Result<Self, BundleError> {
        let path = root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(BundleError::ManifestMissing(path));
        }
        let content = std::fs::read_to_string(&path).map_err(|source| BundleError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: ManifestFile =
            toml::from_str(&content).map_err(|e| BundleError::InvalidManifest {
                path: path.clone(),
                message: e.message().to_string(),
            })?;

        let entries = manifest
            .mods
            .into_iter()
            .map(|m| {
                let source = root.join(&m.path);
                match m.mode {
                    PackagingMode::Zip => BundleEntry::archive(m.name, source, m.enabled),
                    PackagingMode::Raw => BundleEntry::directory(m.name, source, m.enabled),
                }
            })
            .collect();

        let assets = SharedAssets {
            launcher: manifest.assets.launcher.map(|p| root.join(p)),
            mod_list_template: manifest.assets.mod_list.map(|p| root.join(p)),
            screen_reader_script: manifest.assets.screen_reader_script.map(|p| root.join(p)),
        };

        Self::new(entries, assets)
    }

    /// Entries in manifest order.
    #[must_use]
    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    /// Look up an entry by mod name.
    #[must_use]
    pub fn entry(&self, mod_name: &str) -> Option<&BundleEntry> {
        self.entries.iter().find(|e| e.mod_name == mod_name)
    }
}
