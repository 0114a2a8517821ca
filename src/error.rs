//! Error types for sockswarden
//!
//! Two layers: [`WardenError`] for fatal startup failures that surface to the
//! process (configuration, bind, sink construction), and [`SocksError`] for
//! per-session protocol failures. Session errors never cross the session
//! boundary; they are translated into SOCKS reply codes and the session
//! closes itself.

use std::io;
use thiserror::Error;

/// Fatal errors surfaced to the process at startup.
#[derive(Error, Debug)]
pub enum WardenError {
    /// IO error (listener bind, config file read)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging sink construction error
    #[error("Logging error: {0}")]
    Logging(String),
}

/// SOCKS5 protocol errors raised while driving a session.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SocksError {
    /// Client spoke a SOCKS version other than 5
    #[error("Unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    /// Frame ended before its declared addressing was complete
    #[error("Truncated frame")]
    TruncatedFrame,

    /// Command other than CONNECT
    #[error("Command not supported: {0}")]
    CommandNotSupported(u8),

    /// Address type outside {IPv4, domain, IPv6}
    #[error("Address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    /// Domain name bytes were not valid UTF-8
    #[error("Invalid domain name")]
    InvalidDomain,

    /// No offered authentication method matched the server preference
    #[error("Unsupported authentication method.")]
    NoAcceptableMethod,

    /// Sub-negotiation completed but the credentials were rejected
    #[error("Authentication failed.")]
    AuthFailed,

    /// Target is on the block list
    #[error("Connection to {host}:{port} not allowed by ruleset")]
    NotAllowed { host: String, port: u16 },

    /// Target is on neither list and there is no wildcard
    #[error("Connection to {host}:{port} not listed in ruleset")]
    NotListed { host: String, port: u16 },
}

impl SocksError {
    /// The reply code to send to the client before closing, if any.
    ///
    /// `None` means the session closes without a request-reply (the method
    /// negotiation or sub-negotiation already emitted its own status byte).
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            SocksError::UnsupportedVersion(_) => Some(ReplyCode::GeneralFailure),
            SocksError::TruncatedFrame => Some(ReplyCode::AddressTypeNotSupported),
            SocksError::CommandNotSupported(_) => Some(ReplyCode::CommandNotSupported),
            SocksError::AddressTypeNotSupported(_) => Some(ReplyCode::AddressTypeNotSupported),
            SocksError::InvalidDomain => Some(ReplyCode::AddressTypeNotSupported),
            SocksError::NoAcceptableMethod => None,
            SocksError::AuthFailed => None,
            // Both ruleset outcomes answer "not allowed by ruleset"; the
            // original emitted 7 and 5 here, which RFC 1928 reserves for
            // other conditions.
            SocksError::NotAllowed { .. } => Some(ReplyCode::ConnectionNotAllowed),
            SocksError::NotListed { .. } => Some(ReplyCode::ConnectionNotAllowed),
        }
    }
}

/// Reply codes for the SOCKS5 request-reply, RFC 1928 section 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyCode {
    /// Command succeeded
    Succeeded = 0x00,
    /// General SOCKS server failure
    GeneralFailure = 0x01,
    /// Connection not allowed by ruleset
    ConnectionNotAllowed = 0x02,
    /// Network unreachable
    NetworkUnreachable = 0x03,
    /// Host unreachable
    HostUnreachable = 0x04,
    /// Connection refused
    ConnectionRefused = 0x05,
    /// TTL expired
    TtlExpired = 0x06,
    /// Command not supported
    CommandNotSupported = 0x07,
    /// Address type not supported
    AddressTypeNotSupported = 0x08,
}

impl From<ReplyCode> for u8 {
    fn from(code: ReplyCode) -> Self {
        code as u8
    }
}
