use crate::domains::logger::DomainLogger;
use std::sync::Arc;

/// Swallows everything; the default in tests.
pub struct NoopLogger;

impl DomainLogger for NoopLogger {
    fn info(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

pub fn init_noop_logger() -> Arc<dyn DomainLogger> {
    Arc::new(NoopLogger)
}
