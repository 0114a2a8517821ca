//! SOCKS5 protocol constants
//!
//! Defines all constants used in the SOCKS5 protocol implementation.

/// SOCKS5 protocol version
pub const SOCKS5_VERSION: u8 = 0x05;

/// SOCKS5 username/password sub-negotiation version (RFC 1929)
pub const SOCKS5_AUTH_VERSION: u8 = 0x01;

// Authentication methods
/// No authentication required
pub const AUTH_METHOD_NONE: u8 = 0x00;
/// GSSAPI authentication
pub const AUTH_METHOD_GSSAPI: u8 = 0x01;
/// Username/password authentication
pub const AUTH_METHOD_PASSWORD: u8 = 0x02;
/// No acceptable methods
pub const AUTH_METHOD_NOT_ACCEPTABLE: u8 = 0xFF;

// Sub-negotiation status codes
/// Sub-negotiation succeeded
pub const AUTH_STATUS_SUCCESS: u8 = 0x00;
/// Sub-negotiation failed
pub const AUTH_STATUS_FAILURE: u8 = 0x01;

// Commands
/// TCP CONNECT command
pub const CMD_CONNECT: u8 = 0x01;
/// TCP BIND command (not supported)
pub const CMD_BIND: u8 = 0x02;
/// UDP ASSOCIATE command (not supported)
pub const CMD_UDP_ASSOCIATE: u8 = 0x03;

// Address types
/// IPv4 address
pub const ADDR_TYPE_IPV4: u8 = 0x01;
/// Domain name
pub const ADDR_TYPE_DOMAIN: u8 = 0x03;
/// IPv6 address
pub const ADDR_TYPE_IPV6: u8 = 0x04;

/// Reserved byte value (always 0x00)
pub const RESERVED: u8 = 0x00;

/// Per-direction relay buffer size; also the request read buffer size
pub const BUFFER_SIZE: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socks5_version() {
        assert_eq!(SOCKS5_VERSION, 5);
        assert_eq!(SOCKS5_AUTH_VERSION, 1);
    }

    #[test]
    fn test_auth_methods() {
        assert_eq!(AUTH_METHOD_NONE, 0);
        assert_eq!(AUTH_METHOD_GSSAPI, 1);
        assert_eq!(AUTH_METHOD_PASSWORD, 2);
        assert_eq!(AUTH_METHOD_NOT_ACCEPTABLE, 255);
    }

    #[test]
    fn test_address_types() {
        assert_eq!(ADDR_TYPE_IPV4, 1);
        assert_eq!(ADDR_TYPE_DOMAIN, 3);
        assert_eq!(ADDR_TYPE_IPV6, 4);
    }
}
