//! GSSAPI strategy stub
//!
//! Advertises method `0x01` when selected and then refuses the session.

use super::AuthOutcome;
use crate::socks::consts::*;
use crate::socks::wire;
use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Strategy that confirms GSSAPI selection but never authenticates anyone.
pub struct GssapiAuth;

impl GssapiAuth {
    /// Confirm the method selection, then refuse.
    ///
    /// TODO: implement the RFC 1961 token exchange; until then clients that
    /// negotiate GSSAPI receive the method confirmation byte and the session
    /// ends.
    pub async fn authenticate<S>(&self, stream: &mut S) -> Result<AuthOutcome>
    where
        S: AsyncWrite + Unpin,
    {
        stream
            .write_all(&wire::encode_method_select(AUTH_METHOD_GSSAPI))
            .await?;
        stream.flush().await?;
        Ok(AuthOutcome::rejected(AUTH_METHOD_GSSAPI, ""))
    }
}
