//! Username/password strategy (RFC 1929)

use super::AuthOutcome;
use crate::socks::consts::*;
use crate::socks::wire;
use anyhow::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Strategy checking the RFC 1929 sub-negotiation against configured
/// credentials.
pub struct UserPassAuth {
    username: String,
    password: String,
}

impl UserPassAuth {
    /// Create a strategy bound to the configured credentials.
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Confirm the method selection and run the sub-negotiation.
    ///
    /// Client sends:
    /// ```text
    /// +----+------+----------+------+----------+
    /// |VER | ULEN |  UNAME   | PLEN |  PASSWD  |
    /// +----+------+----------+------+----------+
    /// | 1  |  1   | 1 to 255 |  1   | 1 to 255 |
    /// +----+------+----------+------+----------+
    /// ```
    ///
    /// Server responds `[1, STATUS]` with status `0` on success. A header
    /// whose version byte is not `1` rejects the session without a status
    /// byte.
    pub async fn authenticate<S>(&self, stream: &mut S) -> Result<AuthOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        stream
            .write_all(&wire::encode_method_select(AUTH_METHOD_PASSWORD))
            .await?;
        stream.flush().await?;

        let mut header = [0u8; 2];
        stream.read_exact(&mut header).await?;
        if header[0] != SOCKS5_AUTH_VERSION {
            return Ok(AuthOutcome::rejected(
                AUTH_METHOD_PASSWORD,
                "Invalid authentication request header.",
            ));
        }

        let mut username = vec![0u8; header[1] as usize];
        stream.read_exact(&mut username).await?;

        let mut plen = [0u8; 1];
        stream.read_exact(&mut plen).await?;
        let mut password = vec![0u8; plen[0] as usize];
        stream.read_exact(&mut password).await?;

        let username_matches = constant_time_compare(&username, self.username.as_bytes());
        let password_matches = constant_time_compare(&password, self.password.as_bytes());
        let authenticated = username_matches && password_matches;

        let status = if authenticated {
            AUTH_STATUS_SUCCESS
        } else {
            AUTH_STATUS_FAILURE
        };
        stream
            .write_all(&wire::encode_userpass_status(status))
            .await?;
        stream.flush().await?;

        if authenticated {
            Ok(AuthOutcome::accepted(AUTH_METHOD_PASSWORD))
        } else {
            Ok(AuthOutcome::rejected(AUTH_METHOD_PASSWORD, ""))
        }
    }
}

/// Constant-time comparison of two byte slices.
///
/// The comparison takes the same amount of time regardless of where the
/// mismatch occurs.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
