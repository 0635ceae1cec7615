//! Running-Steam check.
//!
//! Steam rewrites `localconfig.vdf` from memory when it exits, so edits made
//! while it runs are lost.
use sysinfo::{ProcessRefreshKind, RefreshKind, System};

use crate::platform::{Os, Platform};

/// Reports whether the Steam client is running.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessProbe {
    /// Whether a Steam client process exists.
    fn steam_running(&self) -> bool;
}

/// [`ProcessProbe`] backed by the host's process table.
#[derive(Debug, Clone, Copy)]
pub struct SystemProcessProbe {
    names: &'static [&'static str],
}

impl SystemProcessProbe {
    /// Probe for the Steam client process names used on `platform`.
    #[must_use]
    pub const fn for_platform(platform: &Platform) -> Self {
        let names: &'static [&'static str] = match platform.os {
            Os::Windows => &["steam.exe"],
            Os::Linux => &["steam"],
            Os::MacOs => &["steam_osx"],
        };
        Self { names }
    }

    fn is_steam(&self, process_name: &str) -> bool {
        self.names
            .iter()
            .any(|name| process_name.eq_ignore_ascii_case(name))
    }
}

impl ProcessProbe for SystemProcessProbe {
    fn steam_running(&self) -> bool {
        let system =
            System::new_with_specifics(RefreshKind::new().with_processes(ProcessRefreshKind::new()));
        system
            .processes()
            .values()
            .any(|process| self.is_steam(&process.name().to_string_lossy()))
    }
}
