use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::Arc;

/// Fans every line out to all attached loggers, in order.
pub struct MultiLogger {
    sinks: Vec<DynLogger>,
}

impl MultiLogger {
    pub fn new(sinks: Vec<DynLogger>) -> Self {
        Self { sinks }
    }

    pub fn with(mut self, sink: DynLogger) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DomainLogger for MultiLogger {
    fn info(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.info(msg));
    }

    fn warn(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.warn(msg));
    }

    fn error(&self, msg: &str) {
        self.sinks.iter().for_each(|sink| sink.error(msg));
    }
}

/// Console always; a fast_log file as well when `file` is given and can be
/// opened.
pub fn init_combined_logger(file: Option<&str>) -> DynLogger {
    let console = super::init_console_logger();
    let Some(path) = file else {
        return console;
    };
    match super::init_file_logger(path) {
        Ok(file_logger) => Arc::new(MultiLogger::new(vec![file_logger, console])),
        Err(e) => {
            console.warn(&format!("File logging disabled: {}", e));
            console
        }
    }
}
