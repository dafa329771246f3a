//! Logger handle passed through the build.
//!
//! The build never calls the global `log` macros. Instead the `Builder` owns a
//! [`Logger`] and hands clones of it to each component it constructs, so a test
//! can swap in a capturing sink without touching process-wide state.

use std::fmt;
use std::sync::Arc;

use log::{Level, Log, Metadata, Record};

/// A cloneable handle to a `log::Log` sink.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    /// Wrap an arbitrary sink.
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink,
            target: "likho",
        }
    }

    /// A handle that forwards to whatever logger `main` installed.
    pub fn global() -> Self {
        Self::new(Arc::new(GlobalLog))
    }

    /// Same sink, different record target (e.g. `likho::render`).
    pub fn scoped(&self, target: &'static str) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink
            .log(&Record::builder().metadata(metadata).args(args).build());
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Forwards to `log::logger()`, honouring the global max level.
struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            log::logger().log(record);
        }
    }

    fn flush(&self) {
        log::logger().flush();
    }
}

/// Install `env_logger` as the process logger.
///
/// `level` is the configured default filter; `LIKHO_LOG` overrides it.
pub fn init(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("LIKHO_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None);
    // A second init (e.g. from tests) is harmless.
    let _ = builder.try_init();
}

#[cfg(test)]
pub use capture::CaptureLog;
