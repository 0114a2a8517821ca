//! Acceptor and server runtime
//!
//! Binds the listening socket, accepts clients, and spawns one [`Session`]
//! task per connection on the shared runtime. Live sessions are tracked in a
//! registry so [`ProxyServer::stop`] can close the listener and tear every
//! session down; a session removes its own registry entry when it finishes,
//! so completed sessions do not accumulate.

mod relay;
mod session;

pub use session::{Session, SessionState};

use crate::config::ProxyConfig;
use crate::error::WardenError;
use crate::logging::LogSink;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

struct SessionHandle {
    peer: SocketAddr,
    abort: AbortHandle,
}

/// The SOCKS5 proxy server.
pub struct ProxyServer {
    listener: TcpListener,
    config: Arc<ProxyConfig>,
    sink: Arc<dyn LogSink>,
    sessions: Arc<Mutex<HashMap<u64, SessionHandle>>>,
    next_id: AtomicU64,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl ProxyServer {
    /// Bind the configured listening address with address reuse enabled.
    ///
    /// Bind failures are fatal; there is no server to run without a
    /// listener.
    pub fn bind(config: Arc<ProxyConfig>, sink: Arc<dyn LogSink>) -> Result<Self, WardenError> {
        let addr = config.listen_addr();
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(1024)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            listener,
            config,
            sink,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of sessions currently registered.
    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Accept clients until [`stop`](Self::stop) is called.
    ///
    /// A failed accept is logged and the loop continues; only `stop` ends
    /// it. Sessions admitted before the stop keep running until `stop`
    /// aborts them.
    pub async fn run(&self) -> io::Result<()> {
        let mut shutdown = self.shutdown_rx.clone();
        if *shutdown.borrow_and_update() {
            return Ok(());
        }

        info!("listening on {}", self.local_addr()?);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow_and_update() {
                        break;
                    }
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => self.spawn_session(stream, peer),
                        Err(err) => warn!("accept error: {}", err),
                    }
                }
            }
        }
        info!("accept loop stopped");
        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, peer: SocketAddr) {
        // Admission happens under the registry lock: either this session
        // lands in the registry before stop() drains it, or the stop flag is
        // already visible here and the connection is dropped unspawned.
        let mut sessions = match self.sessions.lock() {
            Ok(sessions) => sessions,
            Err(_) => return,
        };
        if *self.shutdown_rx.borrow() {
            debug!(%peer, "refusing client accepted during shutdown");
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, %peer, "accepted client");

        let session = Session::new(stream, peer, Arc::clone(&self.config), Arc::clone(&self.sink));
        let registry = Arc::clone(&self.sessions);
        let task = tokio::spawn(async move {
            session.run().await;
            // Runs strictly after the insert below; the spawner still holds
            // the registry lock.
            if let Ok(mut registry) = registry.lock() {
                registry.remove(&id);
            }
        });

        sessions.insert(
            id,
            SessionHandle {
                peer,
                abort: task.abort_handle(),
            },
        );
    }

    /// Stop accepting and tear down every live session.
    ///
    /// Aborting a session task drops its sockets, which fails any in-flight
    /// I/O promptly. Calling `stop` again is a no-op.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        if let Ok(mut sessions) = self.sessions.lock() {
            for (id, handle) in sessions.drain() {
                debug!(id, peer = %handle.peer, "closing session");
                handle.abort.abort();
            }
        }
    }
}
