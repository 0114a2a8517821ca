//! Configuration types
//!
//! The immutable configuration snapshot shared by every session, and the
//! enums the INI values map onto.

use crate::error::WardenError;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Server authentication preference, from the `authenticationMethod` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodPreference {
    /// `-1`: accept any known method the client offers
    Any,
    /// `0`: no authentication
    NoAuth,
    /// `1`: GSSAPI
    Gssapi,
    /// `2`: username/password
    UserPass,
}

impl MethodPreference {
    /// Map the configuration code to a preference.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(MethodPreference::Any),
            0 => Some(MethodPreference::NoAuth),
            1 => Some(MethodPreference::Gssapi),
            2 => Some(MethodPreference::UserPass),
            _ => None,
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Which method(s) the server will negotiate
    pub preference: MethodPreference,
    /// Username for the username/password method
    pub username: Option<String>,
    /// Password for the username/password method
    pub password: Option<String>,
}

impl AuthConfig {
    /// Check whether both credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            preference: MethodPreference::Any,
            username: None,
            password: None,
        }
    }
}

/// Host and port allow/block lists.
///
/// `allow_all_hosts` is the `all` sentinel under `[allowedIPs]`; `all_ports`
/// is the `-1` sentinel under `[allowedPorts]`.
#[derive(Debug, Clone, Default)]
pub struct PolicyConfig {
    /// Wildcard admitting every host
    pub allow_all_hosts: bool,
    /// Hosts admitted without the wildcard
    pub allowed_hosts: HashSet<String>,
    /// Hosts refused regardless of the allow side
    pub blocked_hosts: HashSet<String>,
    /// Wildcard admitting every port
    pub all_ports: bool,
    /// Ports admitted without the wildcard
    pub allowed_ports: HashSet<u16>,
    /// Ports refused regardless of the allow side
    pub blocked_ports: HashSet<u16>,
}

/// Which audit sinks receive session events, from the `loggingMethod` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMethod {
    /// `1`: database only
    Database,
    /// `2`: database and file
    DatabaseAndFile,
    /// any other value: file only
    File,
}

impl LoggingMethod {
    /// Map the configuration code to a sink selection.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => LoggingMethod::Database,
            2 => LoggingMethod::DatabaseAndFile,
            _ => LoggingMethod::File,
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Sink selection
    pub method: LoggingMethod,
    /// Worker count hint for the database sink
    pub worker_threads: usize,
    /// Directory receiving the daily-rotated log files
    pub log_dir: PathBuf,
    /// SQLite database file
    pub db_path: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            method: LoggingMethod::File,
            worker_threads: 2,
            log_dir: PathBuf::from("./logs"),
            db_path: PathBuf::from("./logs/proxy.db"),
        }
    }
}

/// The immutable configuration snapshot passed to every session.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Listening address
    pub listen_ip: IpAddr,
    /// Listening port
    pub listen_port: u16,
    /// Authentication settings
    pub auth: AuthConfig,
    /// Allow/block lists
    pub policy: PolicyConfig,
    /// Audit sink settings
    pub logging: LoggingConfig,
}

impl ProxyConfig {
    /// The socket address to bind.
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_ip, self.listen_port)
    }

    /// Validate cross-key constraints.
    pub fn validate(&self) -> Result<(), WardenError> {
        if self.auth.preference == MethodPreference::UserPass && !self.auth.has_credentials() {
            return Err(WardenError::Config(
                "authenticationMethod=2 requires username and password".to_string(),
            ));
        }
        if self.logging.worker_threads == 0 {
            return Err(WardenError::Config(
                "numActiveThreads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            listen_ip: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            listen_port: 1080,
            auth: AuthConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
