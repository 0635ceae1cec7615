//! Steam discovery: installation roots, library folders, installed app
//! directories, and per-account `localconfig.vdf` files.
//!
//! Supports native, Flatpak, and Snap Steam installations on Linux, the
//! registry-recorded path on Windows, and the default macOS location.
pub mod process;
pub mod vdf;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VdfError;
use crate::platform::{Os, Platform};
use vdf::VdfDocument;

/// Steam application ID of Factorio.
pub const FACTORIO_APP_ID: &str = "427520";

/// Install directory name used when no app manifest names one.
const DEFAULT_INSTALL_DIR: &str = "Factorio";

/// Steam installation paths relative to `$HOME` on Linux.
const UNIX_STEAM_PATHS: &[&str] = &[
    ".steam/steam",
    ".local/share/Steam",
    ".steam/debian-installation",
    ".var/app/com.valvesoftware.Steam/.local/share/Steam",
    ".var/app/com.valvesoftware.Steam/data/Steam",
    "snap/steam/common/.local/share/Steam",
];

/// Fallback Windows install location when the registry has no entry.
const WINDOWS_DEFAULT_STEAM: &str = r"C:\Program Files (x86)\Steam";

/// A Steam library folder and the app IDs it lists.
///
/// `apps` is empty when the manifest format does not record apps (legacy
/// `libraryfolders.vdf`); callers then fall back to app manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Library root (contains `steamapps/`).
    pub path: PathBuf,
    /// App IDs installed in this library.
    pub apps: Vec<String>,
}

/// Every location Steam may be installed at on this platform, in probe
/// order.  Paths are not checked for existence.
#[must_use]
pub fn candidate_roots(platform: &Platform) -> Vec<PathBuf> {
    match platform.os {
        Os::Windows => {
            let mut roots: Vec<PathBuf> = registry_steam_path().into_iter().collect();
            roots.extend(platform.program_files.iter().map(|p| p.join("Steam")));
            roots.push(PathBuf::from(WINDOWS_DEFAULT_STEAM));
            roots
        }
        Os::Linux => platform
            .home
            .as_ref()
            .map(|home| UNIX_STEAM_PATHS.iter().map(|p| home.join(p)).collect())
            .unwrap_or_default(),
        Os::MacOs => platform
            .home
            .iter()
            .map(|home| home.join("Library/Application Support/Steam"))
            .collect(),
    }
}

/// Whether `path` looks like a Steam installation root.
#[must_use]
pub fn is_steam_root(path: &Path) -> bool {
    path.join("steamapps").is_dir()
        || path.join("SteamApps").is_dir()
        || path.join("config/config.vdf").is_file()
}

/// Filter `candidates` down to real Steam roots, collapsing symlinked
/// duplicates (e.g. `~/.steam/steam` -> `~/.local/share/Steam`).
#[must_use]
pub fn find_installations(candidates: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: Vec<PathBuf> = Vec::new();
    let mut roots = Vec::new();
    for candidate in candidates {
        if !is_steam_root(candidate) {
            continue;
        }
        let canonical = dunce::canonicalize(candidate).unwrap_or_else(|_| candidate.clone());
        if !seen.contains(&canonical) {
            seen.push(canonical);
            roots.push(candidate.clone());
        }
    }
    roots
}

/// Parse `libraryfolders.vdf`.
///
/// Understands the current format (`"0" { "path" ... "apps" { ... } }`) and
/// the legacy one (`"1" "D:\\SteamLibrary"`).
///
/// # Errors
///
/// Returns a [`VdfError`] if the text is not valid VDF.
pub fn parse_library_folders(content: &str) -> Result<Vec<Library>, VdfError> {
    let doc = VdfDocument::parse(content)?;
    let Some(folders) = doc
        .lookup(&["libraryfolders"])
        .and_then(|n| n.value.as_object())
    else {
        return Ok(Vec::new());
    };

    // Library folders are keyed by index: "0", "1", "2", etc.
    let libraries = folders
        .iter()
        .filter(|n| n.key.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|node| {
            if let Some(path) = node.value.as_str() {
                return Some(Library {
                    path: PathBuf::from(path),
                    apps: Vec::new(),
                });
            }
            let path = node.value.get_str("path")?;
            let apps = node
                .value
                .get("apps")
                .and_then(|a| a.value.as_object())
                .map(|apps| apps.iter().map(|a| a.key.clone()).collect())
                .unwrap_or_default();
            Some(Library {
                path: PathBuf::from(path),
                apps,
            })
        })
        .collect();
    Ok(libraries)
}

/// All library folders of a Steam installation, the root itself first.
#[must_use]
pub fn libraries(steam_root: &Path) -> Vec<Library> {
    let mut found: Vec<Library> = Vec::new();
    for manifest in [
        steam_root.join("steamapps/libraryfolders.vdf"),
        steam_root.join("config/libraryfolders.vdf"),
    ] {
        let Ok(content) = fs::read_to_string(&manifest) else {
            continue;
        };
        let Ok(listed) = parse_library_folders(&content) else {
            continue;
        };
        for library in listed {
            match found.iter_mut().find(|l| l.path == library.path) {
                Some(existing) if existing.apps.is_empty() => existing.apps = library.apps,
                Some(_) => {}
                None => found.push(library),
            }
        }
    }

    if !found.iter().any(|l| l.path == steam_root) {
        found.insert(
            0,
            Library {
                path: steam_root.to_path_buf(),
                apps: Vec::new(),
            },
        );
    }
    found
}

/// Install directories of `app_id` across every library of `steam_root`.
///
/// A library qualifies when its `apps` block lists the app or it holds an
/// `appmanifest_<id>.acf`; the directory name comes from the manifest's
/// `installdir` when available.
#[must_use]
pub fn app_install_dirs(steam_root: &Path, app_id: &str) -> Vec<PathBuf> {
    libraries(steam_root)
        .into_iter()
        .filter_map(|library| {
            let steamapps = library.path.join("steamapps");
            let manifest = steamapps.join(format!("appmanifest_{app_id}.acf"));
            let listed = library.apps.iter().any(|a| a == app_id);
            if !listed && !manifest.is_file() {
                return None;
            }
            let install_dir = read_install_dir(&manifest).unwrap_or_else(|| DEFAULT_INSTALL_DIR.to_string());
            let dir = steamapps.join("common").join(install_dir);
            dir.is_dir().then_some(dir)
        })
        .collect()
}

fn read_install_dir(manifest: &Path) -> Option<String> {
    let content = fs::read_to_string(manifest).ok()?;
    let doc = VdfDocument::parse(content).ok()?;
    doc.lookup(&["AppState", "installdir"])?
        .value
        .as_str()
        .map(String::from)
}

/// `(account id, path)` of every `userdata/<account>/config/localconfig.vdf`
/// under `steam_root`, sorted by account.
#[must_use]
pub fn localconfig_files(steam_root: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(steam_root.join("userdata")) else {
        return Vec::new();
    };
    let mut files: Vec<(String, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path().join("config/localconfig.vdf");
            path.is_file()
                .then(|| (entry.file_name().to_string_lossy().into_owned(), path))
        })
        .collect();
    files.sort();
    files
}

/// Steam install path recorded in `HKCU\Software\Valve\Steam\SteamPath`.
#[cfg(windows)]
fn registry_steam_path() -> Option<PathBuf> {
    use winreg::RegKey;
    use winreg::enums::HKEY_CURRENT_USER;
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu.open_subkey(r"Software\Valve\Steam").ok()?;
    let path: String = key.get_value("SteamPath").ok()?;
    Some(PathBuf::from(path))
}

#[cfg(not(windows))]
const fn registry_steam_path() -> Option<PathBuf> {
    None
}
