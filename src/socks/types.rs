//! SOCKS5 type definitions
//!
//! Core types shared by the wire codec, the policy gate and the session
//! engine.

use super::consts::*;
use anyhow::{Context, Result};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// SOCKS5 command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocksCommand {
    /// TCP CONNECT - establish a TCP connection to target
    Connect,
    /// TCP BIND - wait for incoming connection (not supported)
    Bind,
    /// UDP ASSOCIATE - establish UDP relay (not supported)
    UdpAssociate,
}

impl SocksCommand {
    /// Parse a command byte into SocksCommand
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_CONNECT => Some(SocksCommand::Connect),
            CMD_BIND => Some(SocksCommand::Bind),
            CMD_UDP_ASSOCIATE => Some(SocksCommand::UdpAssociate),
            _ => None,
        }
    }
}

impl fmt::Display for SocksCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocksCommand::Connect => write!(f, "CONNECT"),
            SocksCommand::Bind => write!(f, "BIND"),
            SocksCommand::UdpAssociate => write!(f, "UDP ASSOCIATE"),
        }
    }
}

/// Target address of a SOCKS5 CONNECT request.
///
/// Domain targets stay as the literal string the client supplied; the policy
/// gate matches on that literal and resolution only happens when dialing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetAddr {
    /// IP address with port
    Ip(SocketAddr),
    /// Domain name with port
    Domain(String, u16),
}

impl TargetAddr {
    /// Create a new TargetAddr from an IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V4(ip), port))
    }

    /// Create a new TargetAddr from an IPv6 address and port
    pub fn ipv6(ip: Ipv6Addr, port: u16) -> Self {
        TargetAddr::Ip(SocketAddr::new(IpAddr::V6(ip), port))
    }

    /// Create a new TargetAddr from a domain name and port
    pub fn domain(domain: String, port: u16) -> Self {
        TargetAddr::Domain(domain, port)
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        match self {
            TargetAddr::Ip(addr) => addr.port(),
            TargetAddr::Domain(_, port) => *port,
        }
    }

    /// The host as the policy gate sees it: the domain literal, or the
    /// textual form of the IP.
    pub fn host(&self) -> String {
        match self {
            TargetAddr::Ip(addr) => addr.ip().to_string(),
            TargetAddr::Domain(domain, _) => domain.clone(),
        }
    }

    /// Resolve the address to a SocketAddr.
    ///
    /// For IP addresses this returns immediately; for domain names this
    /// performs DNS resolution.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        match self {
            TargetAddr::Ip(addr) => Ok(*addr),
            TargetAddr::Domain(domain, port) => {
                let addr_str = format!("{}:{}", domain, port);
                let resolved = tokio::net::lookup_host(&addr_str)
                    .await
                    .with_context(|| format!("Failed to resolve domain: {}", domain))?
                    .next()
                    .with_context(|| format!("No addresses found for domain: {}", domain))?;
                Ok(resolved)
            }
        }
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetAddr::Ip(addr) => write!(f, "{}", addr),
            TargetAddr::Domain(domain, port) => write!(f, "{}:{}", domain, port),
        }
    }
}

impl From<SocketAddr> for TargetAddr {
    fn from(addr: SocketAddr) -> Self {
        TargetAddr::Ip(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks_command_from_byte() {
        assert_eq!(SocksCommand::from_byte(1), Some(SocksCommand::Connect));
        assert_eq!(SocksCommand::from_byte(2), Some(SocksCommand::Bind));
        assert_eq!(SocksCommand::from_byte(3), Some(SocksCommand::UdpAssociate));
        assert_eq!(SocksCommand::from_byte(4), None);
    }

    #[test]
    fn test_socks_command_display() {
        assert_eq!(format!("{}", SocksCommand::Connect), "CONNECT");
        assert_eq!(format!("{}", SocksCommand::Bind), "BIND");
        assert_eq!(format!("{}", SocksCommand::UdpAssociate), "UDP ASSOCIATE");
    }

    #[test]
    fn test_target_addr_ipv4() {
        let addr = TargetAddr::ipv4(Ipv4Addr::new(192, 168, 1, 1), 8080);
        assert_eq!(addr.port(), 8080);
        assert_eq!(addr.host(), "192.168.1.1");
    }

    #[test]
    fn test_target_addr_ipv6() {
        let addr = TargetAddr::ipv6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 443);
        assert_eq!(addr.port(), 443);
        assert_eq!(addr.host(), "::1");
    }

    #[test]
    fn test_target_addr_domain_stays_literal() {
        let addr = TargetAddr::domain("example.com".to_string(), 80);
        assert_eq!(addr.port(), 80);
        assert_eq!(addr.host(), "example.com");
    }

    #[test]
    fn test_target_addr_display() {
        let addr = TargetAddr::ipv4(Ipv4Addr::new(127, 0, 0, 1), 8080);
        assert_eq!(format!("{}", addr), "127.0.0.1:8080");

        let addr = TargetAddr::domain("test.com".to_string(), 443);
        assert_eq!(format!("{}", addr), "test.com:443");
    }

    #[test]
    fn test_target_addr_from_socket_addr() {
        let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 1234);
        let target: TargetAddr = socket_addr.into();
        assert_eq!(target, TargetAddr::Ip(socket_addr));
    }

    #[tokio::test]
    async fn test_target_addr_resolve_ip() {
        let addr = TargetAddr::ipv4(Ipv4Addr::new(127, 0, 0, 1), 8080);
        let resolved = addr.resolve().await.unwrap();
        assert_eq!(resolved.ip(), IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)));
        assert_eq!(resolved.port(), 8080);
    }
}
