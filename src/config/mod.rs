//! Configuration loading
//!
//! Loads the proxy configuration once at startup from an INI file.
//! Recognized keys (all optional, with defaults):
//!
//! ```ini
//! proxyIP = 0.0.0.0
//! proxyPort = 1080
//! authenticationMethod = -1   ; -1 any, 0 none, 1 GSSAPI, 2 user/pass
//! username = u
//! password = p
//! loggingMethod = 2           ; 1 DB, 2 DB + file, other file
//! numActiveThreads = 2
//! logFilesDir = /var/log/sockswarden
//! dbFilesDir = /var/log/sockswarden/proxy.db
//!
//! [allowedIPs]
//! IP0 = all                   ; "all" is the wildcard
//! [blockedIPs]
//! IP0 = example.com
//! [allowedPorts]
//! Port0 = -1                  ; -1 is the wildcard
//! [blockedPorts]
//! Port0 = 25
//! ```

mod proxy;

pub use proxy::{
    AuthConfig, LoggingConfig, LoggingMethod, MethodPreference, PolicyConfig, ProxyConfig,
};

use crate::error::WardenError;
use ini::Ini;
use std::path::Path;

/// Load configuration from an INI file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ProxyConfig, WardenError> {
    let ini = Ini::load_from_file(path.as_ref()).map_err(|e| {
        WardenError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
    })?;
    parse_ini(&ini)
}

/// Parse configuration from an INI string.
pub fn parse_config(content: &str) -> Result<ProxyConfig, WardenError> {
    let ini =
        Ini::load_from_str(content).map_err(|e| WardenError::Config(format!("parse error: {}", e)))?;
    parse_ini(&ini)
}

fn parse_ini(ini: &Ini) -> Result<ProxyConfig, WardenError> {
    let mut config = ProxyConfig::default();

    // Top-level keys live in the section-less general area of the file.
    if let Some(general) = ini.section(None::<String>) {
        if let Some(ip) = general.get("proxyIP") {
            config.listen_ip = ip
                .parse()
                .map_err(|_| WardenError::Config(format!("invalid proxyIP: {}", ip)))?;
        }
        if let Some(port) = general.get("proxyPort") {
            config.listen_port = port
                .parse()
                .map_err(|_| WardenError::Config(format!("invalid proxyPort: {}", port)))?;
        }

        if let Some(method) = general.get("authenticationMethod") {
            let code: i32 = method.parse().map_err(|_| {
                WardenError::Config(format!("invalid authenticationMethod: {}", method))
            })?;
            config.auth.preference = MethodPreference::from_code(code).ok_or_else(|| {
                WardenError::Config(format!("unknown authenticationMethod: {}", code))
            })?;
        }
        if let Some(username) = general.get("username") {
            config.auth.username = Some(username.to_string());
        }
        if let Some(password) = general.get("password") {
            config.auth.password = Some(password.to_string());
        }

        if let Some(method) = general.get("loggingMethod") {
            let code: i32 = method
                .parse()
                .map_err(|_| WardenError::Config(format!("invalid loggingMethod: {}", method)))?;
            config.logging.method = LoggingMethod::from_code(code);
        }
        if let Some(threads) = general.get("numActiveThreads") {
            config.logging.worker_threads = threads.parse().map_err(|_| {
                WardenError::Config(format!("invalid numActiveThreads: {}", threads))
            })?;
        }
        if let Some(dir) = general.get("logFilesDir") {
            config.logging.log_dir = dir.into();
        }
        if let Some(path) = general.get("dbFilesDir") {
            config.logging.db_path = path.into();
        }
    }

    if let Some(section) = ini.section(Some("allowedIPs")) {
        for (_, host) in section.iter() {
            if host == "all" {
                config.policy.allow_all_hosts = true;
            } else {
                config.policy.allowed_hosts.insert(host.to_string());
            }
        }
    }
    if let Some(section) = ini.section(Some("blockedIPs")) {
        for (_, host) in section.iter() {
            config.policy.blocked_hosts.insert(host.to_string());
        }
    }
    if let Some(section) = ini.section(Some("allowedPorts")) {
        for (_, port) in section.iter() {
            if port == "-1" {
                config.policy.all_ports = true;
            } else {
                config.policy.allowed_ports.insert(parse_port(port)?);
            }
        }
    }
    if let Some(section) = ini.section(Some("blockedPorts")) {
        for (_, port) in section.iter() {
            config.policy.blocked_ports.insert(parse_port(port)?);
        }
    }

    config.validate()?;
    Ok(config)
}

fn parse_port(value: &str) -> Result<u16, WardenError> {
    value
        .parse()
        .map_err(|_| WardenError::Config(format!("invalid port: {}", value)))
}
