//! Console and log-file output for installer runs.
//!
//! Engine code reports progress through [`Log`].  [`Logger`] turns each call
//! into a `tracing` event; [`init_subscriber`] renders stage headers and
//! warnings on the terminal and appends every event, debug included, to the
//! run's log file.
mod logger;
mod subscriber;

pub use logger::Logger;
pub use subscriber::{init_subscriber, log_file_path};

/// Sink for installer progress.
///
/// Engine code takes `&dyn Log` so tests can record messages instead of
/// printing them.
pub trait Log: Send + Sync {
    /// A major section of the run (discovery, one target, the summary).
    fn stage(&self, msg: &str);
    /// Progress worth showing by default.
    fn info(&self, msg: &str);
    /// Detail shown on the console only with `--verbose`.
    fn debug(&self, msg: &str);
    /// A failure the run continues past.
    fn warn(&self, msg: &str);
    /// A failure that ends a target or the run.
    fn error(&self, msg: &str);
}

/// A [`Logger`] whose events go to a fresh log file in a temp directory
/// through a thread-local subscriber.
///
/// Keep the returned guard alive for the whole test; dropping it restores
/// the previous dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};

    let tmp = tempfile::tempdir().expect("create temp dir");
    let path = tmp.path().join("test.log");
    let layer = subscriber::FileLayer::create(&path).expect("create log file");
    let dispatch = tracing::Dispatch::new(
        tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG)),
    );
    let guard = tracing::dispatcher::set_default(&dispatch);
    (Logger::new(Some(path)), tmp, guard)
}
