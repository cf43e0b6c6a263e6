use crate::domains::logger::DomainLogger;
use chrono::Local;
use std::sync::Arc;

/// Plain stdout/stderr logger with a local wall-clock prefix.
pub struct ConsoleLogger;

impl DomainLogger for ConsoleLogger {
    fn info(&self, msg: &str) {
        println!("{} INFO  {}", Local::now().format("%H:%M:%S%.3f"), msg);
    }

    fn warn(&self, msg: &str) {
        eprintln!("{} WARN  {}", Local::now().format("%H:%M:%S%.3f"), msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{} ERROR {}", Local::now().format("%H:%M:%S%.3f"), msg);
    }
}

pub fn init_console_logger() -> Arc<dyn DomainLogger> {
    Arc::new(ConsoleLogger)
}
