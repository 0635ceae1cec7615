//! Raw mod folder resource.
use anyhow::Result;
use std::path::PathBuf;

use super::helpers::fs::{mirror_dir_atomic, tree_digest};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A directory that should mirror `source` exactly (minus `.git`).
#[derive(Debug, Clone)]
pub struct ModDirectoryResource {
    /// The unpacked mod folder in the bundle.
    pub source: PathBuf,
    /// `<mods_dir>/<mod_name>`.
    pub target: PathBuf,
}

impl ModDirectoryResource {
    /// Create a new mod directory resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for ModDirectoryResource {
    fn description(&self) -> String {
        format!("{}/ -> {}/", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        mirror_dir_atomic(&self.source, &self.target, true)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ModDirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("source directory does not exist: {}", self.source.display()),
            });
        }
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if !self.target.is_dir() {
            return Ok(ResourceState::Incorrect {
                current: "target is not a directory".to_string(),
            });
        }
        if tree_digest(&self.source, true)? == tree_digest(&self.target, true)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "contents differ".to_string(),
            })
        }
    }
}
