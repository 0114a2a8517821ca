//! Per-connection session engine
//!
//! Drives one client connection through the SOCKS5 conversation:
//!
//! ```text
//! ReadingGreeting -> SelectingMethod -> Authenticating -> ReadingRequest
//!     -> Dialing -> Relaying -> Closing
//! ```
//!
//! States only move forward; `Closing` is reachable from everywhere and is
//! always the last state. Protocol failures answer the precise SOCKS reply
//! code before closing; transport failures after the relay starts close
//! silently. Nothing a single session does can take down the acceptor.

use crate::auth;
use crate::config::ProxyConfig;
use crate::error::{ReplyCode, SocksError};
use crate::logging::{LogLevel, LogSink};
use crate::policy::PolicyGate;
use crate::socks::consts::*;
use crate::socks::wire;
use crate::socks::TargetAddr;

use super::relay;
use anyhow::Result;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// Lifecycle states of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the client greeting
    ReadingGreeting,
    /// Choosing an authentication method for the offered list
    SelectingMethod,
    /// Running the chosen method's sub-negotiation
    Authenticating,
    /// Waiting for the CONNECT request
    ReadingRequest,
    /// Checking policy and connecting to the target
    Dialing,
    /// Forwarding bytes in both directions
    Relaying,
    /// Terminal state
    Closing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::ReadingGreeting => write!(f, "reading greeting"),
            SessionState::SelectingMethod => write!(f, "selecting method"),
            SessionState::Authenticating => write!(f, "authenticating"),
            SessionState::ReadingRequest => write!(f, "reading request"),
            SessionState::Dialing => write!(f, "dialing"),
            SessionState::Relaying => write!(f, "relaying"),
            SessionState::Closing => write!(f, "closing"),
        }
    }
}

/// One client connection and everything it owns.
pub struct Session<S> {
    stream: S,
    peer: SocketAddr,
    config: Arc<ProxyConfig>,
    gate: PolicyGate,
    sink: Arc<dyn LogSink>,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Create a session over an accepted stream.
    pub fn new(
        stream: S,
        peer: SocketAddr,
        config: Arc<ProxyConfig>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        let gate = PolicyGate::new(config.policy.clone());
        Self {
            stream,
            peer,
            config,
            gate,
            sink,
            state: SessionState::ReadingGreeting,
        }
    }

    /// Drive the session to completion. Always ends in `Closing`.
    pub async fn run(mut self) {
        if let Err(err) = self.drive().await {
            // Transport-level failure; protocol failures were already
            // answered inside drive().
            self.log(LogLevel::Error, &format!("Session error: {:#}", err));
            debug!(peer = %self.peer, "session error: {:#}", err);
        }
        self.transition(SessionState::Closing);
    }

    async fn drive(&mut self) -> Result<()> {
        let mut buf = [0u8; BUFFER_SIZE];

        // Greeting.
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            self.log(LogLevel::Warn, "Client closed before greeting.");
            return Ok(());
        }
        let methods = match wire::decode_greeting(&buf[..n]) {
            Ok(methods) => methods,
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    &format!("Error while reading greeting: {}", err),
                );
                // A greeting from another SOCKS version answers 5, not the
                // request-stage code 1; a greeting cut short answers
                // nothing.
                if let SocksError::UnsupportedVersion(_) = err {
                    self.send_reply(ReplyCode::ConnectionRefused).await?;
                }
                return Ok(());
            }
        };

        self.transition(SessionState::SelectingMethod);
        let outcome = auth::negotiate(&mut self.stream, &methods, &self.config.auth).await?;
        if outcome.method != AUTH_METHOD_NOT_ACCEPTABLE {
            self.transition(SessionState::Authenticating);
        }
        if !outcome.accepted {
            if outcome.diagnostic.is_empty() {
                self.log(LogLevel::Error, "Authentication failed.");
            } else {
                self.log(
                    LogLevel::Error,
                    &format!("Error while authenticating: {}", outcome.diagnostic),
                );
            }
            return Ok(());
        }
        self.log(
            LogLevel::Info,
            &format!("Authenticated successfully with method: {}", outcome.method),
        );

        // Request. One read into the session buffer, then a slice decode, so
        // a frame cut short by the client is observable and answered.
        self.transition(SessionState::ReadingRequest);
        let n = self.stream.read(&mut buf).await?;
        if n == 0 {
            self.log(LogLevel::Warn, "Client closed before request.");
            return Ok(());
        }
        let target = match wire::decode_request(&buf[..n]) {
            Ok(target) => target,
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    &format!("Error while reading request: {}", err),
                );
                if let Some(code) = err.reply_code() {
                    self.send_reply(code).await?;
                }
                return Ok(());
            }
        };
        self.log(LogLevel::Info, &format!("Resolved: {}.", target));

        self.transition(SessionState::Dialing);
        if let Err(err) = self.gate.check(&target.host(), target.port()) {
            self.log(LogLevel::Warn, &format!("{}", err));
            if let Some(code) = err.reply_code() {
                self.send_reply(code).await?;
            }
            return Ok(());
        }

        let target_stream = match self.dial(&target).await {
            Ok(stream) => stream,
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    &format!("Error while connecting to {}: {:#}", target, err),
                );
                self.send_reply(ReplyCode::ConnectionRefused).await?;
                return Ok(());
            }
        };
        self.log(LogLevel::Info, &format!("Connected to {}.", target));

        // The success reply must be flushed before any target bytes can
        // reach the client.
        self.send_reply(ReplyCode::Succeeded).await?;

        self.transition(SessionState::Relaying);
        relay::relay(&mut self.stream, target_stream).await;
        Ok(())
    }

    async fn dial(&self, target: &TargetAddr) -> Result<TcpStream> {
        let addr = target.resolve().await?;
        let stream = TcpStream::connect(addr).await?;
        Ok(stream)
    }

    async fn send_reply(&mut self, code: ReplyCode) -> std::io::Result<()> {
        self.log(
            LogLevel::Info,
            &format!("Sending SOCKS reply with status: {}", u8::from(code)),
        );
        self.stream.write_all(&wire::encode_reply(code)).await?;
        self.stream.flush().await
    }

    fn transition(&mut self, next: SessionState) {
        self.state = next;
        trace!(peer = %self.peer, state = %self.state, "session state");
        self.log(LogLevel::Debug, &format!("Session state: {}.", self.state));
    }

    fn log(&self, level: LogLevel, message: &str) {
        self.sink.enqueue(level, self.peer.ip(), message);
    }
}
