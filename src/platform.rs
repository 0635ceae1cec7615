//! Host platform facts: operating system and the well-known user folders the
//! installer probes.
use std::fmt;
use std::path::{Path, PathBuf};

/// Detected operating system platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Linux and other Unix-like systems.
    Linux,
    /// Windows.
    Windows,
    /// macOS.
    MacOs,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
            Self::MacOs => write!(f, "macos"),
        }
    }
}

/// Platform information for the current system.
///
/// Folder fields are plain data so tests can point them at temporary
/// directories instead of the real user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// User home directory (`HOME` or `USERPROFILE`).
    pub home: Option<PathBuf>,
    /// Roaming application data (`APPDATA`); Windows only.
    pub appdata: Option<PathBuf>,
    /// Program-files roots (`ProgramFiles`, `ProgramFiles(x86)`); Windows only.
    pub program_files: Vec<PathBuf>,
}

impl Platform {
    /// Detect the current platform from compile target and environment.
    #[must_use]
    pub fn detect() -> Self {
        let os = Self::detect_os();
        let env_path = |key: &str| std::env::var_os(key).map(PathBuf::from);
        let home = env_path("HOME").or_else(|| env_path("USERPROFILE"));
        let (appdata, program_files) = if os == Os::Windows {
            let program_files = ["ProgramFiles", "ProgramFiles(x86)"]
                .iter()
                .filter_map(|key| env_path(key))
                .collect();
            (env_path("APPDATA"), program_files)
        } else {
            (None, Vec::new())
        };
        Self {
            os,
            home,
            appdata,
            program_files,
        }
    }

    /// Create a platform with no known folders.
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self {
            os,
            home: None,
            appdata: None,
            program_files: Vec::new(),
        }
    }

    /// Set the home directory.
    #[must_use]
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Set the roaming application-data directory.
    #[must_use]
    pub fn with_appdata(mut self, appdata: impl Into<PathBuf>) -> Self {
        self.appdata = Some(appdata.into());
        self
    }

    /// Set the program-files roots.
    #[must_use]
    pub fn with_program_files(mut self, roots: Vec<PathBuf>) -> Self {
        self.program_files = roots;
        self
    }

    /// Whether this is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Paths of the game executable relative to an install directory.
    ///
    /// On macOS the install directory is either the base folder holding
    /// `factorio.app` or the `.app` bundle itself.
    #[must_use]
    pub const fn executable_paths(&self) -> &'static [&'static str] {
        match self.os {
            Os::Windows => &["bin/x64/factorio.exe"],
            Os::Linux => &["bin/x64/factorio"],
            Os::MacOs => &["factorio.app/Contents/MacOS/factorio", "Contents/MacOS/factorio"],
        }
    }

    /// Whether `install_dir` contains the game executable for this platform.
    #[must_use]
    pub fn has_executable(&self, install_dir: &Path) -> bool {
        self.executable_paths()
            .iter()
            .any(|rel| install_dir.join(rel).is_file())
    }

    /// The shared per-user game data directory used by non-portable installs.
    #[must_use]
    pub fn user_data_dir(&self) -> Option<PathBuf> {
        match self.os {
            Os::Windows => self.appdata.as_ref().map(|d| d.join("factorio")),
            Os::Linux => self.home.as_ref().map(|h| h.join(".factorio")),
            Os::MacOs => self
                .home
                .as_ref()
                .map(|h| h.join("Library/Application Support/factorio")),
        }
    }

    fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            // Default to Linux for other Unix-like systems
            Os::Linux
        }
    }
}
