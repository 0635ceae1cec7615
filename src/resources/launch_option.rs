//! Steam launch-option resource (one account's `localconfig.vdf`).
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{copy_atomic, write_atomic};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::steam::vdf::VdfDocument;

/// Key holding the launch-option string inside an app block.
const LAUNCH_OPTIONS_KEY: &str = "LaunchOptions";

/// Steam substitutes the game command line for this placeholder.
const COMMAND_PLACEHOLDER: &str = "%command%";

/// The launcher wrapped around Factorio through one account's launch options.
#[derive(Debug, Clone)]
pub struct LaunchOptionResource {
    /// `userdata/<account>/config/localconfig.vdf`.
    pub config_path: PathBuf,
    /// Steam application ID.
    pub app_id: String,
    /// Installed launcher the game should be started through.
    pub launcher: PathBuf,
}

impl LaunchOptionResource {
    /// Create a new launch-option resource.
    #[must_use]
    pub const fn new(config_path: PathBuf, app_id: String, launcher: PathBuf) -> Self {
        Self {
            config_path,
            app_id,
            launcher,
        }
    }

    fn block_path(&self) -> [&str; 6] {
        [
            "UserLocalConfigStore",
            "Software",
            "Valve",
            "Steam",
            "apps",
            &self.app_id,
        ]
    }

    fn load(&self) -> Result<VdfDocument> {
        let text = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("read {}", self.config_path.display()))?;
        VdfDocument::parse(text).with_context(|| format!("parse {}", self.config_path.display()))
    }

    /// Whether this account has the application configured at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn has_app(&self) -> Result<bool> {
        let doc = self.load()?;
        Ok(doc
            .lookup(&self.block_path())
            .is_some_and(|n| n.value.as_object().is_some()))
    }

    /// Current launch-option string (empty when unset).
    fn current_options(&self, doc: &VdfDocument) -> String {
        doc.lookup(&self.block_path())
            .and_then(|n| n.value.get_str(LAUNCH_OPTIONS_KEY))
            .unwrap_or_default()
            .to_string()
    }
}

impl Applicable for LaunchOptionResource {
    fn description(&self) -> String {
        format!(
            "launch options for app {} in {}",
            self.app_id,
            self.config_path.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        let doc = self.load()?;
        let current = self.current_options(&doc);
        let Some(desired) = merge_launch_options(&current, &self.launcher) else {
            return Ok(ResourceChange::AlreadyCorrect);
        };
        let Some(updated) = doc.with_string(&self.block_path(), LAUNCH_OPTIONS_KEY, &desired) else {
            return Ok(ResourceChange::Skipped {
                reason: format!("app {} is not configured for this account", self.app_id),
            });
        };

        let mut backup = self.config_path.clone().into_os_string();
        backup.push(".bak");
        copy_atomic(&self.config_path, Path::new(&backup))
            .with_context(|| format!("back up {}", self.config_path.display()))?;
        write_atomic(&self.config_path, updated.as_bytes())?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for LaunchOptionResource {
    fn current_state(&self) -> Result<ResourceState> {
        let doc = self.load()?;
        if doc
            .lookup(&self.block_path())
            .and_then(|n| n.value.as_object())
            .is_none()
        {
            return Ok(ResourceState::Invalid {
                reason: format!("app {} is not configured for this account", self.app_id),
            });
        }
        let current = self.current_options(&doc);
        if merge_launch_options(&current, &self.launcher).is_none() {
            Ok(ResourceState::Correct)
        } else if current.is_empty() {
            Ok(ResourceState::Missing)
        } else {
            Ok(ResourceState::Incorrect { current })
        }
    }
}

/// The launch-option token that runs the game through `launcher`.
#[must_use]
pub fn launcher_token(launcher: &Path) -> String {
    format!("\"{}\" {COMMAND_PLACEHOLDER}", launcher.display())
}

/// Add the launcher to an existing launch-option string.
///
/// Returns `None` when the launcher is already present.  Other tokens are
/// kept verbatim: with a `%command%` placeholder the launcher joins the
/// wrapper chain right before it; without one the existing tokens become
/// game arguments after the placeholder.
#[must_use]
pub fn merge_launch_options(existing: &str, launcher: &Path) -> Option<String> {
    let quoted = format!("\"{}\"", launcher.display());
    if existing.contains(&quoted) {
        return None;
    }
    let trimmed = existing.trim();
    if trimmed.is_empty() {
        return Some(launcher_token(launcher));
    }
    if let Some(pos) = existing.find(COMMAND_PLACEHOLDER) {
        let (head, tail) = existing.split_at(pos);
        return Some(format!("{head}{quoted} {tail}"));
    }
    Some(format!("{} {existing}", launcher_token(launcher)))
}
