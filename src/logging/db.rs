//! Database audit sink
//!
//! Inserts records into a SQLite `logs` table:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS logs (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     timestamp TEXT,
//!     log_level TEXT,
//!     IP TEXT,
//!     message TEXT
//! )
//! ```
//!
//! Records are timestamped when enqueued and drained by `numActiveThreads`
//! worker threads sharing one queue; the workers join when the sink drops.

use super::{timestamp, LogLevel, LogSink};
use crate::error::WardenError;
use rusqlite::{params, Connection};
use std::net::IpAddr;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS logs (\
     id INTEGER PRIMARY KEY AUTOINCREMENT,\
     timestamp TEXT,\
     log_level TEXT,\
     IP TEXT,\
     message TEXT)";

const INSERT: &str =
    "INSERT INTO logs (timestamp, log_level, IP, message) VALUES (?1, ?2, ?3, ?4)";

struct DbRecord {
    timestamp: String,
    level: &'static str,
    ip: String,
    message: String,
}

/// SQLite-backed audit log.
pub struct DbSink {
    // Taking the sender closes the queue and lets the workers drain and exit.
    tx: Mutex<Option<Sender<DbRecord>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl DbSink {
    /// Open (or create) the database and start the worker threads.
    pub fn open(path: &Path, worker_count: usize) -> Result<Self, WardenError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| WardenError::Logging(format!("cannot open {}: {}", path.display(), e)))?;
        conn.execute(CREATE_TABLE, [])
            .map_err(|e| WardenError::Logging(format!("cannot create logs table: {}", e)))?;

        let conn = Arc::new(Mutex::new(conn));
        let (tx, rx) = mpsc::channel();
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..worker_count)
            .map(|_| {
                let rx = Arc::clone(&rx);
                let conn = Arc::clone(&conn);
                std::thread::spawn(move || drain_queue(rx, conn))
            })
            .collect();

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
        })
    }
}

fn drain_queue(rx: Arc<Mutex<Receiver<DbRecord>>>, conn: Arc<Mutex<Connection>>) {
    loop {
        let received = match rx.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => return,
        };
        match received {
            Ok(record) => {
                if let Ok(conn) = conn.lock() {
                    // A failed insert drops the record; audit delivery is
                    // best-effort.
                    let _ = conn.execute(
                        INSERT,
                        params![record.timestamp, record.level, record.ip, record.message],
                    );
                }
            }
            Err(_) => return, // queue closed
        }
    }
}

impl LogSink for DbSink {
    fn enqueue(&self, level: LogLevel, peer: IpAddr, message: &str) {
        let record = DbRecord {
            timestamp: timestamp(),
            level: level.as_str(),
            ip: peer.to_string(),
            message: message.to_string(),
        };
        if let Ok(tx) = self.tx.lock() {
            if let Some(tx) = tx.as_ref() {
                let _ = tx.send(record);
            }
        }
    }
}

impl Drop for DbSink {
    fn drop(&mut self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }
        if let Ok(mut workers) = self.workers.lock() {
            for handle in workers.drain(..) {
                let _ = handle.join();
            }
        }
    }
}
