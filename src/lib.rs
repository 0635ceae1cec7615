//! Factorio Access release installer.
//!
//! Installs a prepared mod bundle into every Factorio installation found on
//! the host: Steam libraries, standalone installs, and user-supplied paths.
//! Alongside the mods it updates `mod-list.json` without touching the
//! player's own choices, wraps the game in the accessibility launcher via
//! Steam launch options, and drops the screen reader script into JAWS.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: `fa-release.toml` settings and the bundle manifest
//! - **[`steam`]**: Steam roots, libraries, and the VDF format
//! - **[`resources`]**: idempotent `check + apply` primitives
//! - **[`install`]**: discovery, merging, and the install orchestrator
//! - **[`commands`]**: top-level subcommands (`install`, `detect`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod install;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod steam;
