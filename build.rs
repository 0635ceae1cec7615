//! Build script: embeds the release version string.
use std::process::Command;

fn main() {
    // Prefer FA_RELEASE_VERSION if set (e.g., by the release workflow),
    // otherwise fall back to git describe for local builds.
    if let Ok(version) = std::env::var("FA_RELEASE_VERSION") {
        println!("cargo:rustc-env=FA_RELEASE_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=FA_RELEASE_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=FA_RELEASE_VERSION");
}
