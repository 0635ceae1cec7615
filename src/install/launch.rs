//! Steam launch options for Steam-managed targets.
use std::fmt;
use std::path::Path;

use super::InstallTarget;
use crate::error::InstallError;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::launch_option::LaunchOptionResource;
use crate::resources::{Resource as _, ResourceChange, reconcile};
use crate::steam;
use crate::steam::process::{ProcessProbe, SystemProcessProbe};

/// Result of configuring one target's launch options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOutcome {
    /// Accounts whose launch options were rewritten.
    pub updated_accounts: Vec<String>,
    /// Accounts that could not be read or written while others were.
    pub warnings: Vec<InstallError>,
}

impl LaunchOutcome {
    /// Whether any account changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.updated_accounts.is_empty()
    }
}

/// Wraps the game in the installed launcher via Steam launch options.
pub struct LaunchOptionConfigurator {
    probe: Box<dyn ProcessProbe>,
}

impl fmt::Debug for LaunchOptionConfigurator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchOptionConfigurator").finish_non_exhaustive()
    }
}

impl LaunchOptionConfigurator {
    /// Use `probe` to check for a running Steam client.
    #[must_use]
    pub fn new(probe: Box<dyn ProcessProbe>) -> Self {
        Self { probe }
    }

    /// Check the host's process table for Steam.
    #[must_use]
    pub fn for_host(platform: &Platform) -> Self {
        Self::new(Box::new(SystemProcessProbe::for_platform(platform)))
    }

    /// Make every Steam account that has the game start it through
    /// `launcher`.
    ///
    /// Accounts that fail while others succeed are returned as
    /// [`LaunchOutcome::warnings`].  Nothing is written while Steam is
    /// running, since Steam overwrites the file on exit.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::LaunchOptionUnavailable`] if the target is not
    /// a Steam install, Steam is running and an account needs a change, no
    /// account configuration exists, no account has the game configured, or
    /// no account could be read and written.
    pub fn configure(
        &self,
        target: &InstallTarget,
        launcher: &Path,
        log: &dyn Log,
    ) -> Result<LaunchOutcome, InstallError> {
        let unavailable = |reason: String| InstallError::LaunchOptionUnavailable { reason };
        let Some(link) = &target.steam else {
            return Err(unavailable(format!(
                "{} is not managed by Steam",
                target.root_path.display()
            )));
        };

        let configs = steam::localconfig_files(&link.steam_root);
        if configs.is_empty() {
            return Err(unavailable(format!(
                "no Steam account configuration under {}",
                link.steam_root.display()
            )));
        }

        let mut current = 0_usize;
        let mut pending = Vec::new();
        let mut failures = Vec::new();
        for (account, path) in configs {
            let resource = LaunchOptionResource::new(path, link.app_id.clone(), launcher.to_path_buf());
            match resource.has_app() {
                Ok(false) => {
                    log.debug(&format!("account {account} has no app {}; skipping", link.app_id));
                    continue;
                }
                Ok(true) => {}
                Err(e) => {
                    failures.push(format!("account {account}: {e:#}"));
                    continue;
                }
            }
            match resource.needs_change() {
                Ok(true) => pending.push((account, resource)),
                Ok(false) => current += 1,
                Err(e) => failures.push(format!("account {account}: {e:#}")),
            }
        }

        if !pending.is_empty() && self.probe.steam_running() {
            return Err(unavailable(
                "Steam is running; close Steam and install again".to_string(),
            ));
        }

        let mut outcome = LaunchOutcome::default();
        for (account, resource) in pending {
            match reconcile(&resource, log) {
                Ok(ResourceChange::Applied) => {
                    log.info(&format!("set launch options for account {account}"));
                    outcome.updated_accounts.push(account);
                }
                Ok(ResourceChange::AlreadyCorrect) => current += 1,
                Ok(ResourceChange::Skipped { reason }) => {
                    failures.push(format!("account {account}: {reason}"));
                }
                Err(e) => failures.push(format!("account {account}: {e:#}")),
            }
        }

        if outcome.updated_accounts.is_empty() && current == 0 {
            return Err(unavailable(if failures.is_empty() {
                format!("app {} is not configured in any Steam account", link.app_id)
            } else {
                failures.join("; ")
            }));
        }
        outcome.warnings = failures
            .into_iter()
            .map(|reason| InstallError::LaunchOptionUnavailable { reason })
            .collect();
        Ok(outcome)
    }
}
