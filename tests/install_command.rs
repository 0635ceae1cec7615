#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `install` command.
//!
//! Each test builds an isolated host (fake home, bundle, data roots, Steam
//! installation) and drives [`install::execute`] against it, then inspects
//! the files the engine left behind.

mod common;

use common::*;
use fa_release::commands::install;
use fa_release::config::InstallSettings;
use fa_release::config::bundle::Bundle;
use fa_release::error::InstallError;
use fa_release::install::{
    AssistiveScriptInstaller, InstallOptions, InstallOrchestrator, InstallStatus, InstallStep,
    InstallTarget, LaunchOptionConfigurator, RunReport, TargetDetector, TargetKind,
};

// ---------------------------------------------------------------------------
// Custom targets
// ---------------------------------------------------------------------------

/// `{A: zip, B: raw}` into an empty target: the archive is copied, the
/// folder is mirrored, and the mod list takes the manifest defaults.
#[test]
fn zip_and_raw_into_empty_target() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let data = host.data_root("data");
    let log = RecordingLog::new();

    let report = install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![data.clone()]),
        &log,
    )
    .unwrap();

    assert!(report.succeeded(), "{report:?}");
    assert_eq!(report.targets.len(), 1);
    assert_eq!(report.targets[0].target.kind, TargetKind::Custom);
    assert_eq!(
        std::fs::read(data.join("mods/A_1.0.0.zip")).unwrap(),
        std::fs::read(bundle.join("A_1.0.0.zip")).unwrap()
    );
    assert!(data.join("mods/B/info.json").is_file());
    assert!(data.join("mods/B/locale/en/strings.cfg").is_file());
    assert!(data.join("saves").is_dir());
    assert!(data.join("launcher").is_file());
    assert_eq!(
        mod_list(&data),
        vec![
            ("base".to_string(), true),
            ("A".to_string(), true),
            ("B".to_string(), false),
        ]
    );
    assert!(install::finish(&report).is_ok());
}

/// A mod the player disabled stays disabled after a reinstall, and mods the
/// bundle does not know about are left alone.
#[test]
fn reinstall_keeps_player_choices() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let data = host.data_root("data");
    std::fs::create_dir_all(data.join("mods")).unwrap();
    std::fs::write(
        data.join("mods/mod-list.json"),
        r#"{"mods":[{"name":"base","enabled":true},{"name":"A","enabled":false},{"name":"other","enabled":true}]}"#,
    )
    .unwrap();
    std::fs::write(data.join("mods/other_2.0.0.zip"), "other mod").unwrap();

    let report = install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![data.clone()]),
        &RecordingLog::new(),
    )
    .unwrap();

    assert!(report.succeeded(), "{report:?}");
    assert_eq!(
        mod_list(&data),
        vec![
            ("base".to_string(), true),
            ("A".to_string(), false),
            ("other".to_string(), true),
            ("B".to_string(), false),
        ]
    );
    assert!(data.join("mods/other_2.0.0.zip").is_file());
}

/// Running the same install twice leaves every file byte-identical.
#[test]
fn second_install_is_a_no_op() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let data = host.data_root("data");
    let settings = host.settings(&bundle, vec![data.clone()]);

    install::execute(&host.platform(), &settings, &RecordingLog::new()).unwrap();
    let list = std::fs::read(data.join("mods/mod-list.json")).unwrap();

    let log = RecordingLog::new();
    let report = install::execute(&host.platform(), &settings, &log).unwrap();
    assert!(report.succeeded());
    assert_eq!(std::fs::read(data.join("mods/mod-list.json")).unwrap(), list);
    assert!(
        !log.messages().iter().any(|m| m.starts_with("info: installed")),
        "nothing should be reinstalled: {:?}",
        log.messages()
    );
}

/// A newer build of a zip mod replaces the old archive.
#[test]
fn upgrade_replaces_old_archive() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let data = host.data_root("data");
    write_zip_mod(&data.join("mods/A_0.9.0.zip"), "A", "0.9.0");

    install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![data.clone()]),
        &RecordingLog::new(),
    )
    .unwrap();

    assert!(!data.join("mods/A_0.9.0.zip").exists());
    assert!(data.join("mods/A_1.0.0.zip").is_file());
}

// ---------------------------------------------------------------------------
// Failure handling
// ---------------------------------------------------------------------------

/// Nothing found: one run-level error, no targets, non-zero exit.
#[test]
fn no_target_found() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let report = install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![host.path().join("missing")]),
        &RecordingLog::new(),
    )
    .unwrap();

    assert_eq!(report.errors, vec![InstallError::NoTargetFound]);
    assert!(report.targets.is_empty());
    assert!(install::finish(&report).is_err());
}

/// An unwritable target fails on its own; the next target still installs.
#[test]
fn unwritable_target_is_reported_and_run_completes() {
    let host = TestHost::new();
    let bundle = Bundle::load(&standard_bundle(&host)).unwrap();
    let locked = InstallTarget::new(TargetKind::Custom, host.data_root("locked"), false);
    let open = InstallTarget::new(TargetKind::Custom, host.data_root("open"), true);
    let orchestrator = InstallOrchestrator::new(
        TargetDetector::new(Vec::new()),
        LaunchOptionConfigurator::for_host(&host.platform()),
        AssistiveScriptInstaller::default(),
        InstallOptions::default(),
    );

    let reports = orchestrator.install_targets(&bundle, &[locked, open], &RecordingLog::new());

    assert_eq!(reports[0].status, InstallStatus::Failed);
    assert!(matches!(
        reports[0].errors.as_slice(),
        [(InstallStep::Prepare, InstallError::TargetUnwritable { .. })]
    ));
    assert!(!host.path().join("locked/mods").exists());
    assert_eq!(reports[1].status, InstallStatus::Success);
    assert!(host.path().join("open/mods/A_1.0.0.zip").is_file());
}

/// A `mods` path occupied by a file cannot be created: hard failure for
/// that target only.
#[test]
fn blocked_mods_dir_fails_target() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let data = host.data_root("data");
    std::fs::write(data.join("mods"), "not a directory").unwrap();

    let report = install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![data]),
        &RecordingLog::new(),
    )
    .unwrap();

    assert_eq!(report.targets[0].status, InstallStatus::Failed);
    assert!(matches!(
        report.targets[0].errors.as_slice(),
        [(InstallStep::Merge, InstallError::TargetUnwritable { .. })]
    ));
}

/// A bundle entry whose source is missing is a warning: the other entries
/// install and the target is a partial failure.
#[test]
fn missing_entry_is_partial_failure() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    std::fs::remove_dir_all(bundle.join("src/B")).unwrap();
    let data = host.data_root("data");

    let report = install::execute(
        &host.platform(),
        &host.settings(&bundle, vec![data.clone()]),
        &RecordingLog::new(),
    )
    .unwrap();

    assert_eq!(report.targets[0].status, InstallStatus::PartialFailure);
    assert!(matches!(
        report.targets[0].errors.as_slice(),
        [(InstallStep::Merge, InstallError::EntryCopyFailed { mod_name, .. })] if mod_name == "B"
    ));
    assert!(data.join("mods/A_1.0.0.zip").is_file());
    assert_eq!(
        mod_list(&data)
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>(),
        vec!["base", "A"]
    );
}

/// A missing bundle manifest is a command error, not a report.
#[test]
fn missing_bundle_manifest_is_an_error() {
    let host = TestHost::new();
    let data = host.data_root("data");
    let err = install::execute(
        &host.platform(),
        &host.settings(&host.path().join("no-bundle"), vec![data]),
        &RecordingLog::new(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("bundle.toml"));
}

// ---------------------------------------------------------------------------
// Steam targets
// ---------------------------------------------------------------------------

/// Discover and install like [`install::execute`], with a fixed answer to
/// "is Steam running".
fn install_with_steam(
    host: &TestHost,
    settings: &InstallSettings,
    running: bool,
    log: &RecordingLog,
) -> RunReport {
    let bundle = Bundle::load(&settings.bundle).unwrap();
    InstallOrchestrator::new(
        TargetDetector::for_host(&host.platform(), settings),
        LaunchOptionConfigurator::new(Box::new(FixedSteam { running })),
        AssistiveScriptInstaller::default(),
        InstallOptions::from(settings),
    )
    .run(&bundle, log)
}

/// A Steam install gets the launcher wrapped into its launch options once.
#[test]
fn steam_launch_options_are_set_once() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let steam = SteamFixture::new(&host, &[]);
    let game = SteamFixture::portable_game(&steam.root);
    let config = steam.account("1001", Some("--fullscreen"));
    let settings = host.settings(&bundle, Vec::new());

    let report = install_with_steam(&host, &settings, false, &RecordingLog::new());
    assert!(report.succeeded(), "{report:?}");
    assert!(report.targets[0].launch_options_changed);

    let text = std::fs::read_to_string(&config).unwrap();
    let expected = format!(
        "\"LaunchOptions\"\t\t\"\\\"{}\\\" %command% --fullscreen\"",
        game.join("launcher").display()
    );
    assert!(text.contains(&expected), "{text}");
    assert!(text.contains("\"PersonaName\"\t\t\"player\""));
    assert!(config.with_extension("vdf.bak").is_file());

    let again = install_with_steam(&host, &settings, true, &RecordingLog::new());
    assert!(again.succeeded(), "no edit is needed, so a running Steam is fine");
    assert!(!again.targets[0].launch_options_changed);
    assert_eq!(std::fs::read_to_string(&config).unwrap(), text);
}

/// `--no-launch-options` leaves Steam's files untouched.
#[test]
fn launch_options_can_be_disabled() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let steam = SteamFixture::new(&host, &[]);
    SteamFixture::portable_game(&steam.root);
    let config = steam.account("1001", None);
    let before = std::fs::read_to_string(&config).unwrap();
    let mut settings = host.settings(&bundle, Vec::new());
    settings.configure_launch_options = false;

    let report = install_with_steam(&host, &settings, false, &RecordingLog::new());
    assert!(report.succeeded());
    assert_eq!(std::fs::read_to_string(&config).unwrap(), before);
}

/// While Steam runs, mods still install but `localconfig.vdf` is left
/// alone and the target reports why.
#[test]
fn running_steam_leaves_launch_options_alone() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let steam = SteamFixture::new(&host, &[]);
    let game = SteamFixture::portable_game(&steam.root);
    let config = steam.account("1001", Some("--fullscreen"));
    let before = std::fs::read_to_string(&config).unwrap();

    let report = install_with_steam(&host, &host.settings(&bundle, Vec::new()), true, &RecordingLog::new());

    assert_eq!(report.targets[0].status, InstallStatus::PartialFailure);
    assert!(matches!(
        report.targets[0].errors.as_slice(),
        [(InstallStep::LaunchOptions, InstallError::LaunchOptionUnavailable { reason })]
            if reason.contains("Steam is running")
    ));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), before);
    assert!(game.join("mods/A_1.0.0.zip").is_file());
}

/// A Steam install without any account configuration still gets its mods;
/// the missing launch-option store is a warning.
#[test]
fn steam_without_accounts_is_partial_failure() {
    let host = TestHost::new();
    let bundle = standard_bundle(&host);
    let steam = SteamFixture::new(&host, &[]);
    let game = SteamFixture::portable_game(&steam.root);

    let report = install_with_steam(&host, &host.settings(&bundle, Vec::new()), false, &RecordingLog::new());

    assert_eq!(report.targets[0].status, InstallStatus::PartialFailure);
    assert!(matches!(
        report.targets[0].errors.as_slice(),
        [(InstallStep::LaunchOptions, InstallError::LaunchOptionUnavailable { .. })]
    ));
    assert!(game.join("mods/A_1.0.0.zip").is_file());
}
