//! Target admission policy
//!
//! Applies the configured allow/block lists to a `(host, port)` pair before
//! the proxy dials out. Hosts are matched as literal strings: the domain
//! exactly as the client supplied it, or the textual form of the IP. No DNS
//! resolution happens here, so a blocked domain reached by its IP address is
//! not caught.

use crate::config::PolicyConfig;
use crate::error::SocksError;
use std::fmt;

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Target may be dialed
    Allowed,
    /// Target is on a block list
    Denied,
    /// Target is on neither list and no wildcard admits it
    NotListed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allowed => write!(f, "allowed"),
            Verdict::Denied => write!(f, "denied"),
            Verdict::NotListed => write!(f, "not listed"),
        }
    }
}

/// Policy gate evaluating targets against the configuration snapshot.
#[derive(Debug, Clone)]
pub struct PolicyGate {
    config: PolicyConfig,
}

impl PolicyGate {
    /// Build a gate over a policy configuration.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Evaluate a target.
    ///
    /// The block lists always win, including against the `all`/`-1`
    /// wildcards; a wildcard only widens the allow side. Both the host and
    /// the port must pass.
    pub fn evaluate(&self, host: &str, port: u16) -> Verdict {
        let p = &self.config;

        if p.blocked_hosts.contains(host) || p.blocked_ports.contains(&port) {
            return Verdict::Denied;
        }

        let host_allowed = p.allow_all_hosts || p.allowed_hosts.contains(host);
        let port_allowed = p.all_ports || p.allowed_ports.contains(&port);
        if host_allowed && port_allowed {
            Verdict::Allowed
        } else {
            Verdict::NotListed
        }
    }

    /// Evaluate a target, mapping refusals to their protocol error.
    pub fn check(&self, host: &str, port: u16) -> Result<(), SocksError> {
        match self.evaluate(host, port) {
            Verdict::Allowed => Ok(()),
            Verdict::Denied => Err(SocksError::NotAllowed {
                host: host.to_string(),
                port,
            }),
            Verdict::NotListed => Err(SocksError::NotListed {
                host: host.to_string(),
                port,
            }),
        }
    }
}
