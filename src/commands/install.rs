//! Command: install the bundle into every detected target.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::InstallSettings;
use crate::config::bundle::Bundle;
use crate::install::{
    AssistiveScriptInstaller, InstallOptions, InstallOrchestrator, InstallStatus,
    LaunchOptionConfigurator, RunReport, TargetDetector,
};
use crate::logging::{Log, Logger};
use crate::platform::Platform;

/// Run the install command.
///
/// # Errors
///
/// Returns an error if settings or the bundle cannot be loaded, no target
/// was found, or any target or screen reader directory did not fully
/// succeed.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    log.info(&format!("fa-release {}", super::version()));

    let mut settings = super::resolve_settings(global, &opts.targets, log)?;
    if let Some(bundle) = &opts.bundle {
        settings.bundle.clone_from(bundle);
    }
    if opts.no_launch_options {
        settings.configure_launch_options = false;
    }
    if opts.no_screen_reader_script {
        settings.install_screen_reader_script = false;
    }

    let platform = Platform::detect();
    log.debug(&format!("platform: {}", platform.os));
    let report = execute(&platform, &settings, log)?;

    log.stage("Summary");
    for line in summary_lines(&report) {
        log.info(&line);
    }
    if let Some(path) = log.log_file() {
        log.info(&format!("log: {}", path.display()));
    }
    finish(&report)
}

/// Load the bundle and install it into every target found on `platform`.
///
/// # Errors
///
/// Returns an error if the bundle manifest cannot be loaded.  Install
/// failures are reported in the returned [`RunReport`].
pub fn execute(platform: &Platform, settings: &InstallSettings, log: &dyn Log) -> Result<RunReport> {
    log.stage("Loading bundle");
    let bundle = Bundle::load(&settings.bundle)
        .with_context(|| format!("loading bundle from {}", settings.bundle.display()))?;
    log.info(&format!(
        "{} mods in {}",
        bundle.entries().len(),
        settings.bundle.display()
    ));

    let orchestrator = InstallOrchestrator::new(
        TargetDetector::for_host(platform, settings),
        LaunchOptionConfigurator::for_host(platform),
        AssistiveScriptInstaller::for_host(platform),
        InstallOptions::from(settings),
    );
    Ok(orchestrator.run(&bundle, log))
}

/// One line per target, screen reader folder, and run error.
#[must_use]
pub fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines: Vec<String> = report.errors.iter().map(|e| format!("✗ {e}")).collect();
    for target in &report.targets {
        let marker = match target.status {
            InstallStatus::Success => '✓',
            InstallStatus::PartialFailure => '!',
            InstallStatus::Failed => '✗',
        };
        let mut line = format!(
            "{marker} {}: {}, {} mod(s)",
            target.target,
            target.status,
            target.applied_mods.len()
        );
        if target.launch_options_changed {
            line.push_str(", launch options updated");
        }
        if !target.errors.is_empty() {
            line.push_str(&format!(", {} problem(s)", target.errors.len()));
        }
        lines.push(line);
    }
    for assistive in &report.assistive {
        lines.push(match &assistive.outcome {
            Ok(_) => format!("✓ screen reader script in {}", assistive.dir.display()),
            Err(e) => format!("✗ screen reader script in {}: {e}", assistive.dir.display()),
        });
    }
    lines
}

/// Turn a run report into the command's exit status.
///
/// # Errors
///
/// Returns an error describing the failure when the run did not fully
/// succeed.
pub fn finish(report: &RunReport) -> Result<()> {
    if let Some(err) = report.errors.first() {
        anyhow::bail!("{err}");
    }
    let failed_targets = report
        .targets
        .iter()
        .filter(|t| t.status != InstallStatus::Success)
        .count();
    let failed_dirs = report
        .assistive
        .iter()
        .filter(|a| a.outcome.is_err())
        .count();
    if failed_targets > 0 || failed_dirs > 0 {
        anyhow::bail!(
            "{failed_targets} target(s) and {failed_dirs} screen reader folder(s) did not install cleanly"
        );
    }
    Ok(())
}
