//! `fa-release` command-line entry point.
use anyhow::Result;
use clap::Parser;

use fa_release::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    if matches!(args.command, cli::Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let command = args.command.name();
    let log_file = logging::log_file_path(command);
    logging::init_subscriber(args.verbose, log_file.as_deref());
    let log = logging::Logger::new(log_file);

    match args.command {
        cli::Command::Install(opts) => commands::install::run(&args.global, &opts, &log),
        cli::Command::Detect(opts) => commands::detect::run(&args.global, &opts, &log),
        cli::Command::Version => Ok(()),
    }
}
