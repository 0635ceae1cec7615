//! Sequences discovery, per-target installation, and the screen reader pass.
//!
//! Targets are processed one after another in discovery order.  A failure
//! on one target never stops the run; everything is collected into a
//! [`RunReport`].
use std::collections::BTreeSet;
use std::fmt;

use super::{
    AssistiveOutcome, AssistiveScriptInstaller, BundleMerger, InstallTarget,
    LaunchOptionConfigurator, TargetDetector, TargetKind,
};
use crate::config::InstallSettings;
use crate::config::bundle::Bundle;
use crate::error::InstallError;
use crate::logging::Log;

/// Stage of a per-target install an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    /// Pre-flight checks on the target.
    Prepare,
    /// Copying the bundle and updating the mod list.
    Merge,
    /// Editing Steam launch options.
    LaunchOptions,
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prepare => write!(f, "prepare"),
            Self::Merge => write!(f, "merge"),
            Self::LaunchOptions => write!(f, "launch options"),
        }
    }
}

/// Overall result for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStatus {
    /// Every step completed without warnings.
    Success,
    /// The bundle was merged but some entries or steps failed.
    PartialFailure,
    /// Nothing was installed.
    Failed,
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::PartialFailure => write!(f, "partial failure"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of installing into one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The target.
    pub target: InstallTarget,
    /// Overall status.
    pub status: InstallStatus,
    /// Errors in the order they occurred, tagged with their step.
    pub errors: Vec<(InstallStep, InstallError)>,
    /// Mods present and current after the merge.
    pub applied_mods: BTreeSet<String>,
    /// Whether launch options were changed on this run.
    pub launch_options_changed: bool,
}

/// Result of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One report per discovered target, in discovery order.
    pub targets: Vec<InstallReport>,
    /// One outcome per assistive-technology directory.
    pub assistive: Vec<AssistiveOutcome>,
    /// Run-level errors ([`InstallError::NoTargetFound`]).
    pub errors: Vec<InstallError>,
}

impl RunReport {
    /// Whether every target succeeded and every assistive copy worked.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
            && self
                .targets
                .iter()
                .all(|t| t.status == InstallStatus::Success)
            && self.assistive.iter().all(|a| a.outcome.is_ok())
    }
}

/// Switches for the optional steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOptions {
    /// Edit Steam launch options for Steam targets.
    pub configure_launch_options: bool,
    /// Copy the screen reader script into assistive-tool folders.
    pub install_screen_reader_script: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            configure_launch_options: true,
            install_screen_reader_script: true,
        }
    }
}

impl From<&InstallSettings> for InstallOptions {
    fn from(settings: &InstallSettings) -> Self {
        Self {
            configure_launch_options: settings.configure_launch_options,
            install_screen_reader_script: settings.install_screen_reader_script,
        }
    }
}

/// Runs a full installation.
#[derive(Debug)]
pub struct InstallOrchestrator {
    detector: TargetDetector,
    launch: LaunchOptionConfigurator,
    assistive: AssistiveScriptInstaller,
    options: InstallOptions,
}

impl InstallOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub const fn new(
        detector: TargetDetector,
        launch: LaunchOptionConfigurator,
        assistive: AssistiveScriptInstaller,
        options: InstallOptions,
    ) -> Self {
        Self {
            detector,
            launch,
            assistive,
            options,
        }
    }

    /// Discover targets, install into each, then run the assistive pass.
    ///
    /// With no targets the run ends immediately with
    /// [`InstallError::NoTargetFound`] and the assistive pass is skipped.
    pub fn run(&self, bundle: &Bundle, log: &dyn Log) -> RunReport {
        log.stage("Discovering Factorio installations");
        let targets = self.detector.discover(log);
        if targets.is_empty() {
            let err = InstallError::NoTargetFound;
            log.error(&err.to_string());
            return RunReport {
                errors: vec![err],
                ..RunReport::default()
            };
        }
        for target in &targets {
            log.info(&format!("found {target}"));
        }

        RunReport {
            targets: self.install_targets(bundle, &targets, log),
            assistive: self.assistive_pass(bundle, log),
            errors: Vec::new(),
        }
    }

    /// Install into each target in order.
    pub fn install_targets(
        &self,
        bundle: &Bundle,
        targets: &[InstallTarget],
        log: &dyn Log,
    ) -> Vec<InstallReport> {
        targets
            .iter()
            .map(|target| self.install_target(bundle, target, log))
            .collect()
    }

    fn install_target(&self, bundle: &Bundle, target: &InstallTarget, log: &dyn Log) -> InstallReport {
        log.stage(&format!("Installing into {target}"));
        let root = target.root_path.display().to_string();
        let mut report = InstallReport {
            target: target.clone(),
            status: InstallStatus::Failed,
            errors: Vec::new(),
            applied_mods: BTreeSet::new(),
            launch_options_changed: false,
        };

        if !target.writable {
            let err = InstallError::TargetUnwritable {
                path: target.root_path.clone(),
                reason: "write probe failed".to_string(),
            };
            log.error(&err.to_string());
            report.errors.push((InstallStep::Prepare, err));
            return report;
        }

        match BundleMerger.apply(bundle, target, log) {
            Ok(merged) if merged.applied_mods.is_empty() && !bundle.entries().is_empty() => {
                log.error(&format!("no mod could be installed into {root}"));
                report
                    .errors
                    .extend(merged.warnings.into_iter().map(|w| (InstallStep::Merge, w)));
                return report;
            }
            Ok(merged) => {
                log.info(&format!(
                    "{} mods current, {} updated",
                    merged.applied_mods.len(),
                    merged.updated_mods.len()
                ));
                report.applied_mods = merged.applied_mods;
                report
                    .errors
                    .extend(merged.warnings.into_iter().map(|w| (InstallStep::Merge, w)));
            }
            Err(err) => {
                log.error(&err.to_string());
                report.errors.push((InstallStep::Merge, err));
                return report;
            }
        }

        if target.kind == TargetKind::Steam && target.steam.is_some() {
            self.launch_options(bundle, target, &mut report, log);
        }

        report.status = if report.errors.iter().any(|(_, e)| e.is_fatal()) {
            InstallStatus::Failed
        } else if report.errors.is_empty() {
            InstallStatus::Success
        } else {
            InstallStatus::PartialFailure
        };
        report
    }

    fn launch_options(
        &self,
        bundle: &Bundle,
        target: &InstallTarget,
        report: &mut InstallReport,
        log: &dyn Log,
    ) {
        if !self.options.configure_launch_options {
            log.debug("launch options disabled");
            return;
        }
        let Some(launcher) = bundle
            .shared_assets
            .launcher
            .as_deref()
            .and_then(|l| target.asset_path(l))
        else {
            log.debug("bundle has no launcher; launch options left alone");
            return;
        };

        match self.launch.configure(target, &launcher, log) {
            Ok(outcome) => {
                report.launch_options_changed = outcome.changed();
                if !outcome.changed() {
                    log.info("launch options already set");
                }
                for warning in outcome.warnings {
                    log.warn(&warning.to_string());
                    report.errors.push((InstallStep::LaunchOptions, warning));
                }
            }
            Err(err) => {
                log.warn(&err.to_string());
                report.errors.push((InstallStep::LaunchOptions, err));
            }
        }
    }

    fn assistive_pass(&self, bundle: &Bundle, log: &dyn Log) -> Vec<AssistiveOutcome> {
        if !self.options.install_screen_reader_script {
            log.debug("screen reader script disabled");
            return Vec::new();
        }
        let Some(script) = &bundle.shared_assets.screen_reader_script else {
            log.debug("bundle has no screen reader script");
            return Vec::new();
        };
        if self.assistive.dirs().is_empty() {
            log.debug("no screen reader settings folders found");
            return Vec::new();
        }

        log.stage("Installing screen reader script");
        self.assistive.install(script, log)
    }
}
