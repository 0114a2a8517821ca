//! SOCKS5 wire codec
//!
//! Pure encode/decode helpers over byte slices. The session engine reads a
//! stage's bytes into its buffer and decodes here; nothing in this module
//! touches a socket.

use super::consts::*;
use super::types::{SocksCommand, TargetAddr};
use crate::error::{ReplyCode, SocksError};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Decode the client greeting.
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// Returns the offered method list. Fails when the version is not 5 or when
/// the declared method count exceeds the supplied bytes.
pub fn decode_greeting(buf: &[u8]) -> Result<Vec<u8>, SocksError> {
    if buf.len() < 2 {
        return Err(SocksError::TruncatedFrame);
    }
    if buf[0] != SOCKS5_VERSION {
        return Err(SocksError::UnsupportedVersion(buf[0]));
    }
    let nmethods = buf[1] as usize;
    if buf.len() < 2 + nmethods {
        return Err(SocksError::TruncatedFrame);
    }
    Ok(buf[2..2 + nmethods].to_vec())
}

/// Encode the method-selection reply `[5, chosen]`.
///
/// `chosen` is a method id or `0xFF` when no offered method is acceptable.
pub fn encode_method_select(method: u8) -> [u8; 2] {
    [SOCKS5_VERSION, method]
}

/// Decode a CONNECT request.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   | Variable |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// Addressing is variable-length: IPv4 is 4 bytes, a domain is a length
/// prefix plus that many bytes, IPv6 is 16 bytes; the port is big-endian.
/// Bytes past the end of the frame are ignored.
pub fn decode_request(buf: &[u8]) -> Result<TargetAddr, SocksError> {
    if buf.len() < 4 {
        return Err(SocksError::TruncatedFrame);
    }
    let version = buf[0];
    let command = buf[1];
    let addr_type = buf[3];

    if version != SOCKS5_VERSION {
        return Err(SocksError::UnsupportedVersion(version));
    }
    match SocksCommand::from_byte(command) {
        Some(SocksCommand::Connect) => {}
        _ => return Err(SocksError::CommandNotSupported(command)),
    }

    match addr_type {
        ADDR_TYPE_IPV4 => {
            if buf.len() < 10 {
                return Err(SocksError::TruncatedFrame);
            }
            let ip = Ipv4Addr::new(buf[4], buf[5], buf[6], buf[7]);
            let port = u16::from_be_bytes([buf[8], buf[9]]);
            Ok(TargetAddr::ipv4(ip, port))
        }
        ADDR_TYPE_DOMAIN => {
            if buf.len() < 5 {
                return Err(SocksError::TruncatedFrame);
            }
            let len = buf[4] as usize;
            if len == 0 {
                return Err(SocksError::InvalidDomain);
            }
            if buf.len() < 5 + len + 2 {
                return Err(SocksError::TruncatedFrame);
            }
            let domain = std::str::from_utf8(&buf[5..5 + len])
                .map_err(|_| SocksError::InvalidDomain)?
                .to_string();
            let port = u16::from_be_bytes([buf[5 + len], buf[5 + len + 1]]);
            Ok(TargetAddr::domain(domain, port))
        }
        ADDR_TYPE_IPV6 => {
            if buf.len() < 22 {
                return Err(SocksError::TruncatedFrame);
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&buf[4..20]);
            let port = u16::from_be_bytes([buf[20], buf[21]]);
            Ok(TargetAddr::ipv6(Ipv6Addr::from(octets), port))
        }
        other => Err(SocksError::AddressTypeNotSupported(other)),
    }
}

/// Encode a request-reply.
///
/// ```text
/// +----+-----+-------+------+----------+----------+
/// |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
/// +----+-----+-------+------+----------+----------+
/// | 1  |  1  | X'00' |  1   |    4     |    2     |
/// +----+-----+-------+------+----------+----------+
/// ```
///
/// The bound endpoint is always reported as `0.0.0.0:0`; the fixed 10-byte
/// reply is sufficient for CONNECT-only operation.
pub fn encode_reply(code: ReplyCode) -> [u8; 10] {
    [
        SOCKS5_VERSION,
        code.into(),
        RESERVED,
        ADDR_TYPE_IPV4,
        0,
        0,
        0,
        0,
        0,
        0,
    ]
}

/// Encode an RFC 1929 username/password request frame.
///
/// This is the client side of the sub-negotiation; the server side reads it
/// incrementally in the UserPass strategy.
pub fn encode_userpass_request(username: &str, password: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(3 + username.len() + password.len());
    frame.push(SOCKS5_AUTH_VERSION);
    frame.push(username.len() as u8);
    frame.extend_from_slice(username.as_bytes());
    frame.push(password.len() as u8);
    frame.extend_from_slice(password.as_bytes());
    frame
}

/// Encode the RFC 1929 status reply `[1, status]`.
pub fn encode_userpass_status(status: u8) -> [u8; 2] {
    [SOCKS5_AUTH_VERSION, status]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect_request_ipv4(ip: [u8; 4], port: u16) -> Vec<u8> {
        let mut request = vec![SOCKS5_VERSION, CMD_CONNECT, RESERVED, ADDR_TYPE_IPV4];
        request.extend_from_slice(&ip);
        request.extend_from_slice(&port.to_be_bytes());
        request
    }

    fn connect_request_domain(domain: &str, port: u16) -> Vec<u8> {
        let mut request = vec![
            SOCKS5_VERSION,
            CMD_CONNECT,
            RESERVED,
            ADDR_TYPE_DOMAIN,
            domain.len() as u8,
        ];
        request.extend_from_slice(domain.as_bytes());
        request.extend_from_slice(&port.to_be_bytes());
        request
    }

    #[test]
    fn test_decode_greeting() {
        assert_eq!(decode_greeting(&[5, 1, 0]).unwrap(), vec![0]);
        assert_eq!(decode_greeting(&[5, 2, 0, 2]).unwrap(), vec![0, 2]);
        assert_eq!(decode_greeting(&[5, 0]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_greeting_wrong_version() {
        assert_eq!(
            decode_greeting(&[4, 1, 0]).unwrap_err(),
            SocksError::UnsupportedVersion(4)
        );
    }

    #[test]
    fn test_decode_greeting_declared_length_exceeds_buffer() {
        assert_eq!(
            decode_greeting(&[5, 3, 0, 2]).unwrap_err(),
            SocksError::TruncatedFrame
        );
        assert_eq!(decode_greeting(&[5]).unwrap_err(), SocksError::TruncatedFrame);
    }

    #[test]
    fn test_encode_method_select() {
        assert_eq!(encode_method_select(AUTH_METHOD_NONE), [5, 0]);
        assert_eq!(encode_method_select(AUTH_METHOD_NOT_ACCEPTABLE), [5, 0xFF]);
    }

    #[test]
    fn test_decode_request_ipv4() {
        let request = connect_request_ipv4([127, 0, 0, 1], 80);
        let target = decode_request(&request).unwrap();
        assert_eq!(target.host(), "127.0.0.1");
        assert_eq!(target.port(), 80);
    }

    #[test]
    fn test_decode_request_domain() {
        let request = connect_request_domain("example.com", 443);
        let target = decode_request(&request).unwrap();
        assert_eq!(target, TargetAddr::domain("example.com".to_string(), 443));
    }

    #[test]
    fn test_decode_request_ipv6() {
        let mut request = vec![SOCKS5_VERSION, CMD_CONNECT, RESERVED, ADDR_TYPE_IPV6];
        request.extend_from_slice(&[0u8; 15]);
        request.push(1); // ::1
        request.extend_from_slice(&80u16.to_be_bytes());
        let target = decode_request(&request).unwrap();
        assert_eq!(target.host(), "::1");
        assert_eq!(target.port(), 80);
    }

    #[test]
    fn test_decode_request_wrong_version() {
        let mut request = connect_request_ipv4([127, 0, 0, 1], 80);
        request[0] = 4;
        assert_eq!(
            decode_request(&request).unwrap_err(),
            SocksError::UnsupportedVersion(4)
        );
    }

    #[test]
    fn test_decode_request_command_not_supported() {
        for cmd in [CMD_BIND, CMD_UDP_ASSOCIATE, 0x99] {
            let mut request = connect_request_ipv4([127, 0, 0, 1], 80);
            request[1] = cmd;
            assert_eq!(
                decode_request(&request).unwrap_err(),
                SocksError::CommandNotSupported(cmd)
            );
        }
    }

    #[test]
    fn test_decode_request_address_type_not_supported() {
        let mut request = connect_request_ipv4([127, 0, 0, 1], 80);
        request[3] = 0x99;
        assert_eq!(
            decode_request(&request).unwrap_err(),
            SocksError::AddressTypeNotSupported(0x99)
        );
    }

    #[test]
    fn test_decode_request_short_ipv4_frame() {
        // 9 of the 10 required bytes
        let request = &connect_request_ipv4([127, 0, 0, 1], 80)[..9];
        let err = decode_request(request).unwrap_err();
        assert_eq!(err, SocksError::TruncatedFrame);
        assert_eq!(err.reply_code(), Some(ReplyCode::AddressTypeNotSupported));
    }

    #[test]
    fn test_decode_request_short_domain_frame() {
        let request = connect_request_domain("example.com", 443);
        // drop the port bytes
        assert_eq!(
            decode_request(&request[..request.len() - 2]).unwrap_err(),
            SocksError::TruncatedFrame
        );
        // header only
        assert_eq!(
            decode_request(&request[..4]).unwrap_err(),
            SocksError::TruncatedFrame
        );
    }

    #[test]
    fn test_decode_request_ignores_trailing_bytes() {
        let mut request = connect_request_ipv4([10, 0, 0, 1], 8080);
        request.extend_from_slice(b"extra");
        let target = decode_request(&request).unwrap();
        assert_eq!(target.port(), 8080);
    }

    #[test]
    fn test_encode_reply_is_fixed_ten_bytes() {
        assert_eq!(
            encode_reply(ReplyCode::Succeeded),
            [5, 0, 0, 1, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            encode_reply(ReplyCode::ConnectionNotAllowed),
            [5, 2, 0, 1, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_userpass_request() {
        let frame = encode_userpass_request("u", "p");
        assert_eq!(frame, vec![1, 1, b'u', 1, b'p']);

        let frame = encode_userpass_request("admin", "secret123");
        assert_eq!(frame[0], SOCKS5_AUTH_VERSION);
        assert_eq!(frame[1], 5);
        assert_eq!(&frame[2..7], b"admin");
        assert_eq!(frame[7], 9);
        assert_eq!(&frame[8..17], b"secret123");
    }

    #[test]
    fn test_encode_userpass_status() {
        assert_eq!(encode_userpass_status(AUTH_STATUS_SUCCESS), [1, 0]);
        assert_eq!(encode_userpass_status(AUTH_STATUS_FAILURE), [1, 1]);
    }
}
