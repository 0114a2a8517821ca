//! Audit logging facility
//!
//! Sessions record every significant event through a [`LogSink`]:
//! `enqueue(level, peer_ip, message)`. Enqueueing never blocks the session;
//! each sink owns its queue and worker(s). Which sinks are active comes from
//! the `loggingMethod` configuration key: `1` database, `2` database and
//! file, anything else file.
//!
//! This facility is the audit trail, distinct from the process diagnostics
//! emitted through `tracing`.

mod db;
mod file;

pub use db::DbSink;
pub use file::FileSink;

use crate::config::{LoggingConfig, LoggingMethod};
use crate::error::WardenError;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

/// Severity of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Fine-grained tracing
    Trace,
    /// Debugging detail
    Debug,
    /// Normal operation
    Info,
    /// Unexpected but non-fatal
    Warn,
    /// Session-terminating failure
    Error,
}

impl LogLevel {
    /// The level name as written into records.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit record consumer.
///
/// Implementations are internally thread-safe and non-blocking from the
/// caller's perspective; delivery and ordering are best-effort.
pub trait LogSink: Send + Sync {
    /// Queue one record.
    fn enqueue(&self, level: LogLevel, peer: IpAddr, message: &str);
}

/// Fans records out to several sinks (`loggingMethod = 2`).
pub struct MultiSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl MultiSink {
    /// Combine sinks into one.
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }
}

impl LogSink for MultiSink {
    fn enqueue(&self, level: LogLevel, peer: IpAddr, message: &str) {
        for sink in &self.sinks {
            sink.enqueue(level, peer, message);
        }
    }
}

/// Construct the sink selection for a logging configuration.
pub fn build_sink(config: &LoggingConfig) -> Result<Arc<dyn LogSink>, WardenError> {
    match config.method {
        LoggingMethod::Database => Ok(Arc::new(DbSink::open(
            &config.db_path,
            config.worker_threads,
        )?)),
        LoggingMethod::File => Ok(Arc::new(FileSink::create(&config.log_dir)?)),
        LoggingMethod::DatabaseAndFile => {
            let db: Arc<dyn LogSink> =
                Arc::new(DbSink::open(&config.db_path, config.worker_threads)?);
            let file: Arc<dyn LogSink> = Arc::new(FileSink::create(&config.log_dir)?);
            Ok(Arc::new(MultiSink::new(vec![db, file])))
        }
    }
}

/// Record timestamp, `YYYY-MM-DD HH:MM:SS` in local time.
pub(crate) fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}


#[cfg(test)]
mod tests {
    use super::test_util::MemorySink;
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_log_level_display() {
        assert_eq!(format!("{}", LogLevel::Info), "info");
        assert_eq!(format!("{}", LogLevel::Error), "error");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = timestamp();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(ts.len(), 19);
        assert_eq!(&ts[4..5], "-");
        assert_eq!(&ts[10..11], " ");
        assert_eq!(&ts[13..14], ":");
    }

    #[test]
    fn test_multi_sink_fans_out() {
        let first = Arc::new(MemorySink::new());
        let second = Arc::new(MemorySink::new());
        let multi = MultiSink::new(vec![first.clone(), second.clone()]);

        let peer = IpAddr::V4(Ipv4Addr::new(192, 168, 0, 7));
        multi.enqueue(LogLevel::Info, peer, "session opened");

        for sink in [&first, &second] {
            let records = sink.records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].0, LogLevel::Info);
            assert_eq!(records[0].1, peer);
            assert_eq!(records[0].2, "session opened");
        }
    }
}
