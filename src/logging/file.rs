//! File audit sink
//!
//! Writes one line per record, `[YYYY-MM-DD HH:MM:SS] [LEVEL] Client IP:
//! <ip>, <message>`, to a daily-rotated file. The writer is the
//! `tracing-appender` non-blocking construction: records go into a bounded
//! queue drained by a background worker thread, so `enqueue` never blocks
//! on disk.

use super::{timestamp, LogLevel, LogSink};
use crate::error::WardenError;
use std::io::Write;
use std::net::IpAddr;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Prefix of the rotated files; the appender adds the `.YYYY-MM-DD` suffix.
const FILE_PREFIX: &str = "proxy.log";

/// Daily-rotated audit log file.
pub struct FileSink {
    writer: NonBlocking,
    // Flushes the queue and stops the worker when the sink is dropped.
    _guard: WorkerGuard,
}

impl FileSink {
    /// Create the sink, creating the directory if needed.
    pub fn create(dir: &Path) -> Result<Self, WardenError> {
        std::fs::create_dir_all(dir)?;
        let appender = tracing_appender::rolling::daily(dir, FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        Ok(Self {
            writer,
            _guard: guard,
        })
    }
}

impl LogSink for FileSink {
    fn enqueue(&self, level: LogLevel, peer: IpAddr, message: &str) {
        let line = format!(
            "[{}] [{}] Client IP: {}, {}\n",
            timestamp(),
            level,
            peer,
            message
        );
        let mut writer = self.writer.clone();
        // A full queue drops the record; audit delivery is best-effort.
        let _ = writer.write_all(line.as_bytes());
    }
}
