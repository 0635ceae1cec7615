//! Factorio's `mods/mod-list.json`.
//!
//! The file is owned by the game: users toggle mods in its UI and it may
//! carry fields this tool does not know about.  Only the `enabled` flags of
//! newly introduced mods are ever chosen here; everything else round-trips.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::InstallError;
use crate::resources::helpers::fs::write_atomic;

/// File name of the mod list inside `mods/`.
pub const MOD_LIST_FILE: &str = "mod-list.json";

/// One `{"name": ..., "enabled": ...}` record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModListEntry {
    /// Mod name.
    pub name: String,
    /// Whether the game loads the mod.
    pub enabled: bool,
    /// Fields such as `version`, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole mod list, in file order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModListState {
    /// Entries in file order.
    pub mods: Vec<ModListEntry>,
    /// Unknown top-level fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModListState {
    /// Read a mod list.  `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::ModListUnreadable`] if the file exists but
    /// cannot be read or is not a valid mod list.
    pub fn load(path: &Path) -> Result<Option<Self>, InstallError> {
        let unreadable = |reason: String| InstallError::ModListUnreadable {
            path: path.to_path_buf(),
            reason,
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unreadable(e.to_string())),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| unreadable(e.to_string()))
    }

    /// Look up a mod's entry.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModListEntry> {
        self.mods.iter().find(|m| m.name == name)
    }

    /// Whether the list has an entry for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Append `name` with `enabled` unless the list already has it.
    ///
    /// Returns `true` if an entry was added.  An existing entry is never
    /// modified.
    pub fn insert_default(&mut self, name: &str, enabled: bool) -> bool {
        if self.contains(name) {
            return false;
        }
        self.mods.push(ModListEntry {
            name: name.to_string(),
            enabled,
            extra: Map::new(),
        });
        true
    }

    /// Write the list atomically as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        write_atomic(path, json.as_bytes())
    }
}
