//! # sockswarden - Corporate SOCKS5 Intercepting Proxy
//!
//! Sockswarden accepts inbound TCP client sessions, performs SOCKS5 method
//! negotiation and authentication (RFC 1928 + RFC 1929), enforces host/port
//! allow- and block-lists, dials the requested target and relays bytes in
//! both directions until either side closes. Every significant event is
//! recorded through an audit logging facility (daily-rotated file, SQLite
//! database, or both).
//!
//! ## Features
//!
//! - **CONNECT only**: BIND and UDP ASSOCIATE answer reply code 7
//! - **Three authentication modes**: none, username/password, and a GSSAPI
//!   stub that advertises the method and refuses the session
//! - **Policy gate**: literal host and port allow/block lists with `all`
//!   and `-1` wildcards, block lists winning
//! - **Audit trail**: file and database sinks fed by non-blocking queues
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sockswarden::config::load_config;
//! use sockswarden::logging::build_sink;
//! use sockswarden::server::ProxyServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(load_config("config.ini")?);
//!     let sink = build_sink(&config.logging)?;
//!     let server = Arc::new(ProxyServer::bind(config, sink)?);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! One acceptor task owns the listener and spawns a session task per
//! client. A session walks a one-way state machine (greeting, method
//! selection, authentication, request, dial, relay, close) and owns its
//! sockets exclusively; the acceptor keeps only enough of a handle to tear
//! sessions down on [`ProxyServer::stop`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod policy;
pub mod server;
pub mod socks;

// Re-export commonly used items
pub use config::{load_config, ProxyConfig};
pub use error::{ReplyCode, SocksError, WardenError};
pub use server::ProxyServer;

/// Version of the sockswarden library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the application
pub const NAME: &str = env!("CARGO_PKG_NAME");
