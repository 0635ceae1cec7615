//! Single-file copy resource.
use anyhow::Result;
use std::path::PathBuf;

use super::helpers::fs::{copy_atomic, file_digest};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file that should exist at `target` with the same bytes as `source`.
///
/// Used for zip-packaged mods, the launcher, and screen reader scripts.
#[derive(Debug, Clone)]
pub struct FileCopyResource {
    /// The file shipped in the bundle.
    pub source: PathBuf,
    /// Where the file is installed.
    pub target: PathBuf,
}

impl FileCopyResource {
    /// Create a new file copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for FileCopyResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.target.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        copy_atomic(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FileCopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }
        if self.target.symlink_metadata().is_err() {
            return Ok(ResourceState::Missing);
        }
        if !self.target.is_file() {
            return Ok(ResourceState::Incorrect {
                current: "target is not a regular file".to_string(),
            });
        }
        if file_digest(&self.source)? == file_digest(&self.target)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
