//! Installation engine: target discovery, bundle merging, launch options,
//! screen reader scripts, and the orchestrator that sequences them.
pub mod assistive;
pub mod detect;
pub mod launch;
pub mod merge;
pub mod mod_list;
pub mod orchestrator;

use std::fmt;
use std::path::{Path, PathBuf};

pub use assistive::{AssistiveOutcome, AssistiveScriptInstaller};
pub use detect::{Candidate, Detector, TargetDetector};
pub use launch::{LaunchOptionConfigurator, LaunchOutcome};
pub use merge::{BundleMerger, MergeResult};
pub use mod_list::{ModListEntry, ModListState};
pub use orchestrator::{
    InstallOptions, InstallOrchestrator, InstallReport, InstallStatus, InstallStep, RunReport,
};

/// How a target was found.  Variant order is discovery precedence: when one
/// root is reached through several heuristics, the smallest kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetKind {
    /// A Steam library install.
    Steam,
    /// A standalone installer's default location.
    StandaloneInstaller,
    /// A path supplied by the user.
    Custom,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Steam => write!(f, "steam"),
            Self::StandaloneInstaller => write!(f, "standalone"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// What the launch-option configurator needs to reach a Steam install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamLink {
    /// Steam installation root (holds `userdata/`).
    pub steam_root: PathBuf,
    /// Steam application ID.
    pub app_id: String,
}

/// A game user-data root to install into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Discovery heuristic that found this root.
    pub kind: TargetKind,
    /// User-data root (holds `mods/`, `saves/`, `config/`).
    pub root_path: PathBuf,
    /// `<root>/mods`; may not exist yet.
    pub mods_dir: PathBuf,
    /// `<root>/saves`; may not exist yet.
    pub saves_dir: PathBuf,
    /// Result of the write probe at discovery time.
    pub writable: bool,
    /// Set for Steam targets.
    pub steam: Option<SteamLink>,
}

impl InstallTarget {
    /// Build a target rooted at `root_path`, deriving its subdirectories.
    #[must_use]
    pub fn new(kind: TargetKind, root_path: impl Into<PathBuf>, writable: bool) -> Self {
        let root_path = root_path.into();
        Self {
            kind,
            mods_dir: root_path.join("mods"),
            saves_dir: root_path.join("saves"),
            root_path,
            writable,
            steam: None,
        }
    }

    /// Attach Steam details.
    #[must_use]
    pub fn with_steam(mut self, steam: SteamLink) -> Self {
        self.steam = Some(steam);
        self
    }

    /// Path of `mod-list.json`.
    #[must_use]
    pub fn mod_list_path(&self) -> PathBuf {
        self.mods_dir.join(mod_list::MOD_LIST_FILE)
    }

    /// Where a shared asset named like `asset` is installed.
    #[must_use]
    pub fn asset_path(&self, asset: &Path) -> Option<PathBuf> {
        asset.file_name().map(|name| self.root_path.join(name))
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.root_path.display(), self.kind)
    }
}
