use chrono::Utc;
use log::{error as log_error, info as log_info, warn as log_warn};
use std::sync::Arc;

/// Domain-level logging port (Hexagonal port).
/// Keep this API intentionally small and non-fallible from the domain perspective.
pub trait DomainLogger: Send + Sync + 'static {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

pub type DynLogger = Arc<dyn DomainLogger>;

/// Writes through the `log` facade into a `fast_log` file appender.
pub struct FileLogger;

impl FileLogger {
    /// Initialize fast_log once per process. File only: the console sink is
    /// attached separately by `init_combined_logger`.
    pub fn init(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        fast_log::init(Self::config(path))?;
        Ok(())
    }

    fn config(path: &str) -> fast_log::config::Config {
        fast_log::config::Config::new()
            .file(path)
            .level(log::LevelFilter::Info)
    }
}

impl DomainLogger for FileLogger {
    fn info(&self, msg: &str) {
        log_info!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn warn(&self, msg: &str) {
        log_warn!("{} - {}", Utc::now().to_rfc3339(), msg);
    }

    fn error(&self, msg: &str) {
        log_error!("{} - {}", Utc::now().to_rfc3339(), msg);
    }
}

/// Prefixes every line with the agent it comes from, e.g. `[circle] ...`.
pub struct ScopedLogger {
    scope: String,
    inner: DynLogger,
}

impl ScopedLogger {
    pub fn new(scope: impl Into<String>, inner: DynLogger) -> Self {
        Self {
            scope: scope.into(),
            inner,
        }
    }

    pub fn shared(scope: impl Into<String>, inner: DynLogger) -> DynLogger {
        Arc::new(Self::new(scope, inner))
    }
}

impl DomainLogger for ScopedLogger {
    fn info(&self, msg: &str) {
        self.inner.info(&format!("[{}] {}", self.scope, msg));
    }

    fn warn(&self, msg: &str) {
        self.inner.warn(&format!("[{}] {}", self.scope, msg));
    }

    fn error(&self, msg: &str) {
        self.inner.error(&format!("[{}] {}", self.scope, msg));
    }
}
