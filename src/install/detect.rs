//! Target discovery.
//!
//! Each install kind has its own [`Detector`] that proposes candidate data
//! roots.  [`TargetDetector`] runs them in precedence order, validates every
//! candidate, probes writability, and collapses roots reached more than once.
use std::path::{Path, PathBuf};

use super::{InstallTarget, SteamLink, TargetKind};
use crate::config::InstallSettings;
use crate::logging::Log;
use crate::platform::{Os, Platform};
use crate::steam;

/// A proposed user-data root before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Proposed user-data root.
    pub root: PathBuf,
    /// Steam details when proposed by the Steam detector.
    pub steam: Option<SteamLink>,
}

impl Candidate {
    /// A candidate with no Steam details.
    #[must_use]
    pub fn plain(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            steam: None,
        }
    }
}

/// One discovery heuristic.
#[cfg_attr(test, mockall::automock)]
pub trait Detector {
    /// Kind assigned to targets this detector finds.
    fn kind(&self) -> TargetKind;

    /// Candidate roots, in the order they should be reported.
    fn candidates(&self) -> Vec<Candidate>;
}

/// Resolve the user-data root that belongs to a game install directory.
///
/// A portable install (holding `config`, `mods`, and `saves`) keeps its data
/// beside the game; otherwise the platform's shared data directory is used.
#[must_use]
pub fn resolve_data_root(platform: &Platform, install_dir: &Path) -> Option<PathBuf> {
    let portable = ["config", "mods", "saves"]
        .iter()
        .all(|sub| install_dir.join(sub).is_dir());
    if portable {
        Some(install_dir.to_path_buf())
    } else {
        platform.user_data_dir()
    }
}

/// Finds Factorio in every library of every Steam installation.
#[derive(Debug, Clone)]
pub struct SteamDetector {
    platform: Platform,
    steam_roots: Vec<PathBuf>,
    app_id: String,
}

impl SteamDetector {
    /// Probe the platform's usual Steam locations.
    #[must_use]
    pub fn for_platform(platform: &Platform, app_id: impl Into<String>) -> Self {
        Self::with_roots(platform, steam::candidate_roots(platform), app_id)
    }

    /// Probe the given Steam roots.
    #[must_use]
    pub fn with_roots(platform: &Platform, steam_roots: Vec<PathBuf>, app_id: impl Into<String>) -> Self {
        Self {
            platform: platform.clone(),
            steam_roots,
            app_id: app_id.into(),
        }
    }
}

impl Detector for SteamDetector {
    fn kind(&self) -> TargetKind {
        TargetKind::Steam
    }

    fn candidates(&self) -> Vec<Candidate> {
        steam::find_installations(&self.steam_roots)
            .into_iter()
            .flat_map(|steam_root| {
                steam::app_install_dirs(&steam_root, &self.app_id)
                    .into_iter()
                    .filter(|dir| self.platform.has_executable(dir))
                    .filter_map(|dir| resolve_data_root(&self.platform, &dir))
                    .map(|root| Candidate {
                        root,
                        steam: Some(SteamLink {
                            steam_root: steam_root.clone(),
                            app_id: self.app_id.clone(),
                        }),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

/// Finds installs at the standalone installer's default locations.
#[derive(Debug, Clone)]
pub struct StandaloneDetector {
    platform: Platform,
    install_dirs: Vec<PathBuf>,
}

impl StandaloneDetector {
    /// Probe the platform's default install directories.
    #[must_use]
    pub fn for_platform(platform: &Platform) -> Self {
        let home = platform.home.clone();
        let install_dirs = match platform.os {
            Os::Windows => platform
                .program_files
                .iter()
                .map(|p| p.join("Factorio"))
                .chain(home.map(|h| h.join("factorio")))
                .collect(),
            Os::Linux => std::iter::once(PathBuf::from("/opt/factorio"))
                .chain(home.map(|h| h.join("factorio")))
                .collect(),
            Os::MacOs => std::iter::once(PathBuf::from("/Applications/factorio.app"))
                .chain(home.map(|h| h.join("factorio/factorio.app")))
                .collect(),
        };
        Self::with_dirs(platform, install_dirs)
    }

    /// Probe the given install directories.
    #[must_use]
    pub fn with_dirs(platform: &Platform, install_dirs: Vec<PathBuf>) -> Self {
        Self {
            platform: platform.clone(),
            install_dirs,
        }
    }
}

impl Detector for StandaloneDetector {
    fn kind(&self) -> TargetKind {
        TargetKind::StandaloneInstaller
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.install_dirs
            .iter()
            .filter(|dir| self.platform.has_executable(dir))
            .filter_map(|dir| resolve_data_root(&self.platform, dir))
            .map(Candidate::plain)
            .collect()
    }
}

/// User-supplied paths: either a game install directory or a data root.
#[derive(Debug, Clone)]
pub struct CustomDetector {
    platform: Platform,
    paths: Vec<PathBuf>,
}

impl CustomDetector {
    /// Wrap the user's paths.
    #[must_use]
    pub fn new(platform: &Platform, paths: Vec<PathBuf>) -> Self {
        Self {
            platform: platform.clone(),
            paths,
        }
    }
}

impl Detector for CustomDetector {
    fn kind(&self) -> TargetKind {
        TargetKind::Custom
    }

    fn candidates(&self) -> Vec<Candidate> {
        self.paths
            .iter()
            .map(|path| {
                if self.platform.has_executable(path) {
                    resolve_data_root(&self.platform, path).unwrap_or_else(|| path.clone())
                } else {
                    path.clone()
                }
            })
            .map(Candidate::plain)
            .collect()
    }
}

/// Runs every detector and produces the deduplicated target list.
pub struct TargetDetector {
    detectors: Vec<Box<dyn Detector>>,
}

impl std::fmt::Debug for TargetDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetDetector")
            .field("detectors", &self.detectors.len())
            .finish()
    }
}

impl TargetDetector {
    /// Use the given detectors, in precedence order.
    #[must_use]
    pub fn new(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    /// Steam, then standalone installs, then the configured custom paths.
    #[must_use]
    pub fn for_host(platform: &Platform, settings: &InstallSettings) -> Self {
        Self::new(vec![
            Box::new(SteamDetector::for_platform(platform, settings.steam_app_id.clone())),
            Box::new(StandaloneDetector::for_platform(platform)),
            Box::new(CustomDetector::new(platform, settings.custom_paths.clone())),
        ])
    }

    /// Discover install targets.
    ///
    /// Candidates that do not exist or are not directories are dropped.  A
    /// root found more than once keeps its first position and takes the
    /// highest-precedence kind among its discoveries.  Never fails: an empty
    /// list means nothing was found.
    pub fn discover(&self, log: &dyn Log) -> Vec<InstallTarget> {
        let mut found: Vec<(PathBuf, InstallTarget)> = Vec::new();

        for detector in &self.detectors {
            let kind = detector.kind();
            for candidate in detector.candidates() {
                if !candidate.root.is_dir() {
                    let msg = format!(
                        "skipping {kind} candidate {}: not a directory",
                        candidate.root.display()
                    );
                    if kind == TargetKind::Custom {
                        log.warn(&msg);
                    } else {
                        log.debug(&msg);
                    }
                    continue;
                }

                let identity =
                    dunce::canonicalize(&candidate.root).unwrap_or_else(|_| candidate.root.clone());
                if let Some((_, existing)) = found.iter_mut().find(|(id, _)| *id == identity) {
                    if kind < existing.kind {
                        log.debug(&format!(
                            "{} also found as {kind}; taking precedence over {}",
                            existing.root_path.display(),
                            existing.kind
                        ));
                        existing.kind = kind;
                        existing.steam = candidate.steam;
                    }
                    continue;
                }

                let writable = probe_writable(&candidate.root);
                log.debug(&format!(
                    "found {kind} target {} (writable: {writable})",
                    candidate.root.display()
                ));
                let mut target = InstallTarget::new(kind, candidate.root, writable);
                target.steam = candidate.steam;
                found.push((identity, target));
            }
        }

        found.into_iter().map(|(_, target)| target).collect()
    }
}

/// Try to create and delete a file in `root`.
fn probe_writable(root: &Path) -> bool {
    tempfile::Builder::new()
        .prefix(".fa-release-probe-")
        .tempfile_in(root)
        .is_ok()
}
