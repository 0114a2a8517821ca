//! No-authentication strategy
//!
//! Confirms method `0x00` and accepts the client without any checks.

use super::AuthOutcome;
use crate::socks::consts::*;
use crate::socks::wire;
use anyhow::Result;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Strategy accepting every client.
pub struct NoAuth;

impl NoAuth {
    /// Confirm the method selection and accept.
    pub async fn authenticate<S>(&self, stream: &mut S) -> Result<AuthOutcome>
    where
        S: AsyncWrite + Unpin,
    {
        stream
            .write_all(&wire::encode_method_select(AUTH_METHOD_NONE))
            .await?;
        stream.flush().await?;
        Ok(AuthOutcome::accepted(AUTH_METHOD_NONE))
    }
}
