use crate::domains::logger::{DomainLogger, DynLogger};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

enum Level {
    Info,
    Warn,
    Error,
}

struct LogLine {
    level: Level,
    msg: String,
}

/// Hands lines to a background task so the decide tick never waits on I/O.
/// Lines are dropped, and counted, when the buffer is full.
pub struct BufferedLogger {
    sender: mpsc::Sender<LogLine>,
    dropped: Arc<AtomicU64>,
}

impl BufferedLogger {
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn offer(&self, level: Level, msg: &str) {
        let line = LogLine {
            level,
            msg: msg.to_string(),
        };
        if self.sender.try_send(line).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl DomainLogger for BufferedLogger {
    fn info(&self, msg: &str) {
        self.offer(Level::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.offer(Level::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.offer(Level::Error, msg);
    }
}

/// Must be called inside a tokio runtime.
pub fn init_buffered_logger(bridge: DynLogger, capacity: usize) -> Arc<BufferedLogger> {
    let (sender, mut receiver) = mpsc::channel::<LogLine>(capacity.max(1));
    tokio::spawn(async move {
        while let Some(line) = receiver.recv().await {
            match line.level {
                Level::Info => bridge.info(&line.msg),
                Level::Warn => bridge.warn(&line.msg),
                Level::Error => bridge.error(&line.msg),
            }
        }
    });
    Arc::new(BufferedLogger {
        sender,
        dropped: Arc::new(AtomicU64::new(0)),
    })
}
