use crate::domains::logger::{DomainLogger, FileLogger};
use std::sync::Arc;

/// Set up the process-wide fast_log appender at `path` and hand back a
/// logger that writes through it. Fails if a `log` backend is already set.
pub fn init_file_logger(path: &str) -> Result<Arc<dyn DomainLogger>, String> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create log directory {}: {}", parent.display(), e))?;
        }
    }
    FileLogger::init(path).map_err(|e| format!("Failed to initialize fast_log: {}", e))?;
    Ok(Arc::new(FileLogger))
}
