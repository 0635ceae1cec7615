//! [`Log`] backed by `tracing`.
use std::path::{Path, PathBuf};

use super::Log;
use super::subscriber::STAGE_TARGET;

/// Emits every [`Log`] call as a `tracing` event.
#[derive(Debug, Default)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// A logger whose events land in `log_file` once
    /// [`init_subscriber`](super::init_subscriber) has opened it.
    #[must_use]
    pub const fn new(log_file: Option<PathBuf>) -> Self {
        Self { log_file }
    }

    /// Where this run's log is written, for the closing summary.
    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::isolated_logger;

    fn written(log: &Logger) -> String {
        std::fs::read_to_string(log.log_file().unwrap()).unwrap()
    }

    #[test]
    fn every_level_reaches_the_log_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.debug("removing stale archive FactorioAccess_0.13.0.zip");
        log.stage("Installing into /data (custom)");
        log.info("installed FactorioAccess");
        log.warn("Failed to install mod 'extras': source does not exist");
        log.error("No Factorio installation found");

        let lines: Vec<String> = written(&log)
            .lines()
            .skip(1)
            .map(|line| line.split_once(' ').unwrap().1.to_string())
            .collect();
        insta::assert_snapshot!(lines.join("\n"), @r"
        debug removing stale archive FactorioAccess_0.13.0.zip
          ==> Installing into /data (custom)
         info installed FactorioAccess
         warn Failed to install mod 'extras': source does not exist
        error No Factorio installation found
        ");
    }

    #[test]
    fn log_file_starts_with_run_header() {
        let (log, _tmp, _guard) = isolated_logger();
        let contents = written(&log);
        let header = contents.lines().next().unwrap();
        assert!(header.starts_with("fa-release "), "{header}");
        assert!(header.ends_with(" UTC"), "{header}");
    }

    #[test]
    fn logger_without_file() {
        assert_eq!(Logger::default().log_file(), None);
    }
}
