// Shared helpers for integration tests.
//
// Builds throwaway bundles, game data roots, and Steam installations inside
// a temporary directory, plus a `Log` implementation that records what the
// engine reported so tests can assert on it.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fa_release::config::InstallSettings;
use fa_release::logging::Log;
use fa_release::platform::{Os, Platform};
use fa_release::steam::process::ProcessProbe;
use zip::write::SimpleFileOptions;

/// Steam application ID used throughout the fixtures.
pub const APP_ID: &str = "427520";

/// A [`Log`] that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message logged at any level, in order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn push(&self, level: &str, msg: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(format!("{level}: {msg}"));
        }
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
}

/// A [`ProcessProbe`] with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedSteam {
    pub running: bool,
}

impl ProcessProbe for FixedSteam {
    fn steam_running(&self) -> bool {
        self.running
    }
}

/// An isolated host: a fake home directory plus room for bundles and
/// custom data roots, all inside one [`tempfile::TempDir`].
pub struct TestHost {
    /// Temporary directory holding everything.
    pub root: tempfile::TempDir,
}

impl TestHost {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn home(&self) -> PathBuf {
        self.path().join("home")
    }

    /// A Linux platform whose home is the fake home directory.
    pub fn platform(&self) -> Platform {
        Platform::new(Os::Linux).with_home(self.home())
    }

    /// Settings pointing at `bundle`, with the given custom paths.
    pub fn settings(&self, bundle: &Path, custom_paths: Vec<PathBuf>) -> InstallSettings {
        InstallSettings {
            bundle: bundle.to_path_buf(),
            custom_paths,
            ..InstallSettings::default()
        }
    }

    /// Create an empty data root (the directory a custom path points at).
    pub fn data_root(&self, name: &str) -> PathBuf {
        let dir = self.path().join(name);
        std::fs::create_dir_all(&dir).expect("create data root");
        dir
    }
}

/// Write a zip mod archive containing `<mod_name>/info.json`.
pub fn write_zip_mod(path: &Path, mod_name: &str, version: &str) {
    std::fs::create_dir_all(path.parent().expect("archive parent")).expect("create parent");
    let file = std::fs::File::create(path).expect("create archive");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    zip.start_file(format!("{mod_name}/info.json"), options)
        .expect("start info.json");
    zip.write_all(format!(r#"{{"name":"{mod_name}","version":"{version}"}}"#).as_bytes())
        .expect("write info.json");
    zip.start_file(format!("{mod_name}/control.lua"), options)
        .expect("start control.lua");
    zip.write_all(b"-- control").expect("write control.lua");
    zip.finish().expect("finish archive");
}

/// Write a raw mod folder with `info.json`.
pub fn write_raw_mod(dir: &Path, mod_name: &str, version: &str) {
    std::fs::create_dir_all(dir.join("locale/en")).expect("create mod dir");
    std::fs::write(
        dir.join("info.json"),
        format!(r#"{{"name":"{mod_name}","version":"{version}"}}"#),
    )
    .expect("write info.json");
    std::fs::write(dir.join("locale/en/strings.cfg"), "[mod-name]\n").expect("write locale");
}

/// Build the standard bundle: `A` as a zip (enabled) and `B` raw
/// (disabled), a launcher, a mod-list template, and a screen reader script.
pub fn standard_bundle(host: &TestHost) -> PathBuf {
    let dir = host.path().join("bundle");
    write_zip_mod(&dir.join("A_1.0.0.zip"), "A", "1.0.0");
    write_raw_mod(&dir.join("src/B"), "B", "0.3.0");
    std::fs::write(dir.join("launcher"), "#!/bin/sh\nexec \"$@\"\n").expect("write launcher");
    std::fs::write(
        dir.join("mod-list.json"),
        r#"{"mods":[{"name":"base","enabled":true}]}"#,
    )
    .expect("write template");
    std::fs::write(dir.join("Factorio.jkm"), "; jaws keymap\n").expect("write script");
    std::fs::write(
        dir.join("bundle.toml"),
        r#"
[[mods]]
name = "A"
mode = "zip"
path = "A_1.0.0.zip"

[[mods]]
name = "B"
mode = "raw"
path = "src/B"
enabled = false

[assets]
launcher = "launcher"
mod_list = "mod-list.json"
screen_reader_script = "Factorio.jkm"
"#,
    )
    .expect("write bundle.toml");
    dir
}

/// Escape a path for use inside a VDF string.
fn vdf_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

/// A Steam installation under the fake home with the given extra libraries.
pub struct SteamFixture {
    /// Steam root (`~/.local/share/Steam`).
    pub root: PathBuf,
}

impl SteamFixture {
    /// Create `~/.local/share/Steam` listing the root library and `extra`
    /// libraries, each holding Factorio.
    pub fn new(host: &TestHost, extra: &[PathBuf]) -> Self {
        let root = host.home().join(".local/share/Steam");
        let steamapps = root.join("steamapps");
        std::fs::create_dir_all(&steamapps).expect("create steamapps");

        let mut vdf = String::from("\"libraryfolders\"\n{\n");
        for (idx, library) in std::iter::once(&root).chain(extra).enumerate() {
            vdf.push_str(&format!(
                "\t\"{idx}\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t\t\"apps\"\n\t\t{{\n\t\t\t\"{APP_ID}\"\t\t\"2500000000\"\n\t\t}}\n\t}}\n",
                vdf_path(library)
            ));
        }
        vdf.push_str("}\n");
        std::fs::write(steamapps.join("libraryfolders.vdf"), vdf).expect("write libraryfolders");
        Self { root }
    }

    /// Create a portable Factorio install inside `library`; returns the
    /// install directory (which is also its data root).
    pub fn portable_game(library: &Path) -> PathBuf {
        let dir = library.join("steamapps/common/Factorio");
        for sub in ["bin/x64", "config", "mods", "saves"] {
            std::fs::create_dir_all(dir.join(sub)).expect("create game dir");
        }
        std::fs::write(dir.join("bin/x64/factorio"), "").expect("write executable");
        dir
    }

    /// Create a non-portable Factorio install inside `library`.
    pub fn shared_game(library: &Path) -> PathBuf {
        let dir = library.join("steamapps/common/Factorio");
        std::fs::create_dir_all(dir.join("bin/x64")).expect("create game dir");
        std::fs::write(dir.join("bin/x64/factorio"), "").expect("write executable");
        dir
    }

    /// Write `userdata/<account>/config/localconfig.vdf` with Factorio
    /// configured (optionally with existing launch options).
    pub fn account(&self, account: &str, launch_options: Option<&str>) -> PathBuf {
        let path = self
            .root
            .join("userdata")
            .join(account)
            .join("config/localconfig.vdf");
        std::fs::create_dir_all(path.parent().expect("config dir")).expect("create config dir");
        let options = launch_options.map_or_else(String::new, |o| {
            format!("\t\t\t\t\t\t\"LaunchOptions\"\t\t\"{o}\"\n")
        });
        let content = format!(
            "\"UserLocalConfigStore\"\n{{\n\t\"Software\"\n\t{{\n\t\t\"Valve\"\n\t\t{{\n\t\t\t\"Steam\"\n\t\t\t{{\n\t\t\t\t\"apps\"\n\t\t\t\t{{\n\t\t\t\t\t\"{APP_ID}\"\n\t\t\t\t\t{{\n\t\t\t\t\t\t\"LastPlayed\"\t\t\"1700000000\"\n{options}\t\t\t\t\t}}\n\t\t\t\t}}\n\t\t\t}}\n\t\t}}\n\t}}\n\t\"friends\"\n\t{{\n\t\t\"PersonaName\"\t\t\"player\"\n\t}}\n}}\n"
        );
        std::fs::write(&path, content).expect("write localconfig");
        path
    }
}

/// Read `mods/mod-list.json` under `root` as `(name, enabled)` pairs.
pub fn mod_list(root: &Path) -> Vec<(String, bool)> {
    let content =
        std::fs::read_to_string(root.join("mods/mod-list.json")).expect("read mod-list.json");
    let value: serde_json::Value = serde_json::from_str(&content).expect("parse mod-list.json");
    value["mods"]
        .as_array()
        .expect("mods array")
        .iter()
        .map(|m| {
            (
                m["name"].as_str().expect("name").to_string(),
                m["enabled"].as_bool().expect("enabled"),
            )
        })
        .collect()
}
