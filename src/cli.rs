//! Command-line interface definition.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI entry point for the Factorio Access installer.
#[derive(Parser, Debug)]
#[command(
    name = "fa-release",
    about = "Install the Factorio Access mod bundle into local Factorio installations",
    version
)]
pub struct Cli {
    #[allow(missing_docs)]
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Settings file (defaults to fa-release.toml in the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install the bundle into every detected Factorio installation
    Install(InstallOpts),
    /// List detected Factorio installations without changing anything
    Detect(DetectOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Detect(_) => "detect",
            Self::Version => "version",
        }
    }
}

/// Target selection shared by `install` and `detect`.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetOpts {
    /// Extra game install directory or data root (repeatable)
    #[arg(long = "custom-path", value_name = "PATH")]
    pub custom_paths: Vec<PathBuf>,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Bundle directory containing bundle.toml
    #[arg(long, value_name = "DIR")]
    pub bundle: Option<PathBuf>,

    #[allow(missing_docs)]
    #[command(flatten)]
    pub targets: TargetOpts,

    /// Do not edit Steam launch options
    #[arg(long)]
    pub no_launch_options: bool,

    /// Do not copy the screen reader script
    #[arg(long)]
    pub no_screen_reader_script: bool,
}

/// Options for the `detect` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DetectOpts {
    #[allow(missing_docs)]
    #[command(flatten)]
    pub targets: TargetOpts,
}
