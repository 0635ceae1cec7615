//! Subscriber setup: terminal rendering, the log file layer, and where the
//! log file lives.
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Tracing target of [`Log::stage`](super::Log::stage) events.
pub(super) const STAGE_TARGET: &str = "fa_release::stage";

/// `$XDG_CACHE_HOME/fa-release/<command>.log`, or under `~/.cache` when
/// `XDG_CACHE_HOME` is unset.  Creates the directory; `None` if that fails
/// or no home directory is known.
#[must_use]
pub fn log_file_path(command: &str) -> Option<PathBuf> {
    let cache = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(|home| PathBuf::from(home).join(".cache"))
        })?;
    log_file_under(&cache, command)
}

fn log_file_under(cache: &Path, command: &str) -> Option<PathBuf> {
    let dir = cache.join("fa-release");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// The formatted `message` field of an event.
fn message(event: &tracing::Event<'_>) -> String {
    let mut visitor = MessageVisitor(String::new());
    event.record(&mut visitor);
    visitor.0
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.0);
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

fn is_stage(event: &tracing::Event<'_>) -> bool {
    event.metadata().target() == STAGE_TARGET
}

/// One event as shown on the terminal.
fn console_line(level: Level, stage: bool, msg: &str) -> String {
    match level {
        Level::ERROR => format!("\x1b[31merror:\x1b[0m {msg}"),
        Level::WARN => format!("\x1b[33mwarning:\x1b[0m {msg}"),
        Level::INFO if stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        Level::INFO => format!("  {msg}"),
        _ => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// One event as written to the log file.
fn file_line(time: &str, level: Level, stage: bool, msg: &str) -> String {
    let tag = match level {
        Level::INFO if stage => "==>",
        Level::ERROR => "error",
        Level::WARN => "warn",
        Level::INFO => "info",
        _ => "debug",
    };
    format!("{time} {tag:>5} {msg}")
}

struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let line = console_line(*event.metadata().level(), is_stage(event), &message(event));
        writeln!(writer, "{line}")
    }
}

/// Appends every event to the run's log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate `path` and write the run header.
    pub(super) fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = fs::File::create(path)?;
        writeln!(
            file,
            "fa-release {} {}",
            crate::commands::version(),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let time = chrono::Utc::now().format("%H:%M:%S").to_string();
        let line = file_line(&time, *event.metadata().level(), is_stage(event), &message(event));
        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}

/// Install the global subscriber: warnings and errors to stderr, the rest
/// to stdout (debug only when `verbose`), and every event to `log_file`.
///
/// Call once, before anything logs.  A log file that cannot be created is
/// left out silently.
pub fn init_subscriber(verbose: bool, log_file: Option<&Path>) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));
    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(writer)
        .with_filter(console_level);
    let file = log_file
        .and_then(|path| FileLayer::create(path).ok())
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
