use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/mailbench.log";

/// Where and how verbosely to log, taken from `TRACING_LEVEL` and `LOG_FILE_PATH`.
struct LogSettings {
    filter: String,
    file: PathBuf,
}

impl LogSettings {
    fn from_env() -> Self {
        Self {
            filter: env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string()),
            file: env::var("LOG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    /// Split the log path into the appender's directory and file name.
    fn file_parts(&self) -> (&Path, &Path) {
        let dir = match self.file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = self
            .file
            .file_name()
            .map(Path::new)
            .unwrap_or_else(|| Path::new("mailbench.log"));
        (dir, name)
    }
}

/// Human-readable events on stderr, plain events in the log file.
///
/// Stdout is left to command output so `--json` stays machine-readable. The
/// returned guard flushes the file writer on drop.
pub fn init_logger() -> WorkerGuard {
    let settings = LogSettings::from_env();
    let (dir, name) = settings.file_parts();
    let appender = tracing_appender::rolling::never(dir, name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .pretty()
        .with_file(false);
    let file = fmt::layer().with_writer(file_writer).with_ansi(false);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(EnvFilter::new(&settings.filter))
        .init();

    debug!("Logging to stderr and {}", settings.file.display());
    guard
}
