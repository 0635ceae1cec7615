//! Domain-specific error types for the installer.
//!
//! Internal modules return typed errors (e.g., [`BundleError`], [`VdfError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! ConfigError   : fa-release.toml loading
//! BundleError   : bundle.toml loading and validation
//! VdfError      : Steam VDF parsing
//! InstallError  : per-target and per-entry install failures
//! ```
//!
//! [`InstallError`] values are not only propagated: most of them are
//! *collected* into install reports so a failing entry never aborts the run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise while loading `fa-release.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidSyntax {
        /// Path to the offending file.
        path: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while loading a bundle manifest.
#[derive(Error, Debug)]
pub enum BundleError {
    /// The bundle directory has no `bundle.toml`.
    #[error("Bundle manifest not found: {0}")]
    ManifestMissing(PathBuf),

    /// The manifest could not be parsed.
    #[error("Invalid bundle manifest {path}: {message}")]
    InvalidManifest {
        /// Path to the manifest.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Two entries share the same mod name.
    #[error("Duplicate mod '{0}' in bundle")]
    DuplicateMod(String),

    /// An entry has an empty name.
    #[error("Bundle entry #{0} has an empty mod name")]
    EmptyModName(usize),

    /// A mod name is not a single plain file name.
    #[error("Invalid mod name '{0}': must be a single file name")]
    InvalidModName(String),

    /// An I/O error occurred while reading the manifest.
    #[error("IO error reading bundle manifest {path}: {source}")]
    Io {
        /// Path to the manifest.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise while parsing Steam's VDF (`KeyValues`) text format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VdfError {
    /// Input ended inside a block or before a value.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof {
        /// Byte offset where input ended.
        offset: usize,
    },

    /// A character that cannot start a key or value.
    #[error("unexpected '{found}' at byte {offset}")]
    UnexpectedToken {
        /// Byte offset of the character.
        offset: usize,
        /// The offending character.
        found: char,
    },

    /// A quoted string was never closed.
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        offset: usize,
    },
}

/// Install failures, collected into reports rather than raised.
///
/// [`NoTargetFound`](Self::NoTargetFound) is fatal for the run and
/// [`TargetUnwritable`](Self::TargetUnwritable) is fatal for one target; every
/// other variant is a warning attached to an entry, a target, or an assistive
/// directory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// Discovery found no installation to install into.
    #[error("No Factorio installation found")]
    NoTargetFound,

    /// The target root cannot be written to.
    #[error("Target {path} is not writable: {reason}")]
    TargetUnwritable {
        /// Target root.
        path: PathBuf,
        /// Why the target was rejected.
        reason: String,
    },

    /// A bundle entry could not be copied into the mods directory.
    #[error("Failed to install mod '{mod_name}': {reason}")]
    EntryCopyFailed {
        /// Mod whose copy failed.
        mod_name: String,
        /// Underlying failure.
        reason: String,
    },

    /// A bundle entry failed `info.json` validation and was not copied.
    #[error("Mod '{mod_name}' is invalid: {reason}")]
    InvalidModEntry {
        /// Mod that failed validation.
        mod_name: String,
        /// Validation failure.
        reason: String,
    },

    /// A shared asset (launcher) could not be copied into the target root.
    #[error("Failed to install asset {asset}: {reason}")]
    AssetCopyFailed {
        /// Asset file name.
        asset: String,
        /// Underlying failure.
        reason: String,
    },

    /// The existing mod list is unreadable and was left untouched.
    #[error("Mod list {path} is unreadable: {reason}")]
    ModListUnreadable {
        /// Path of the mod list.
        path: PathBuf,
        /// Parse or I/O failure.
        reason: String,
    },

    /// The launch-option store could not be located, parsed, or updated.
    #[error("Launch options unavailable: {reason}")]
    LaunchOptionUnavailable {
        /// What went wrong.
        reason: String,
    },

    /// The assistive script could not be copied into one directory.
    #[error("Failed to copy screen reader script into {dir}: {reason}")]
    AssistiveDirCopyFailed {
        /// Assistive-technology settings directory.
        dir: PathBuf,
        /// Underlying failure.
        reason: String,
    },
}

impl InstallError {
    /// Whether this error stops work on its target (or the whole run).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::NoTargetFound | Self::TargetUnwritable { .. })
    }
}
