//! Idempotent resource primitives (check + apply pattern).
//!
//! Every change the installer makes to a target (a mod archive, a mirrored
//! mod folder, the launcher, one account's launch options, a screen reader
//! script) is a [`Resource`]: it can report its current state and bring
//! itself to the desired state.  [`reconcile`] ties the two together.
pub mod file_copy;
pub mod helpers;
pub mod launch_option;
pub mod mod_directory;

use anyhow::Result;

use crate::logging::Log;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// This method should:
    /// - Create parent directories if needed
    /// - Replace the destination atomically where the platform allows it
    /// - Return the appropriate `ResourceChange` result
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, invalid paths, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (file, directory, launch-option string).
///
/// # Examples
///
/// ```
/// use fa_release::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "content differs".into() };
/// let skip = ResourceState::Invalid { reason: "source missing".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource cannot be applied (e.g., source file missing).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use fa_release::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "source missing".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
    /// Resource was skipped.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// Unified interface for resources that can be checked and applied.
///
/// # Examples
///
/// ```ignore
/// // All resources follow the same check-then-apply pattern:
/// let state = resource.current_state()?;
/// if resource.needs_change()? {
///     resource.apply()?;
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined due to I/O failures,
    /// permission issues, or other system errors.
    fn current_state(&self) -> Result<ResourceState>;

    /// Determine if the resource needs to be changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the current state cannot be determined (propagates errors from
    /// `current_state()`).
    fn needs_change(&self) -> Result<bool> {
        Ok(matches!(
            self.current_state()?,
            ResourceState::Missing | ResourceState::Incorrect { .. }
        ))
    }
}

/// Check `resource` and apply it if it is missing or incorrect.
///
/// `Invalid` states become [`ResourceChange::Skipped`] so callers can report
/// them without treating them as I/O failures.
///
/// # Errors
///
/// Returns an error if the state check or the apply step fails.
pub fn reconcile<R: Resource + ?Sized>(resource: &R, log: &dyn Log) -> Result<ResourceChange> {
    let desc = resource.description();
    match resource.current_state()? {
        ResourceState::Correct => {
            log.debug(&format!("ok: {desc}"));
            Ok(ResourceChange::AlreadyCorrect)
        }
        ResourceState::Invalid { reason } => {
            log.debug(&format!("skipping {desc}: {reason}"));
            Ok(ResourceChange::Skipped { reason })
        }
        state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if let ResourceState::Incorrect { current } = &state {
                log.debug(&format!("updating {desc} (currently {current})"));
            }
            let change = resource.apply()?;
            if change == ResourceChange::Applied {
                log.debug(&format!("applied: {desc}"));
            }
            Ok(change)
        }
    }
}
