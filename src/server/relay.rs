//! Bidirectional byte relay
//!
//! Two half-duplex pipes driven independently: client to target and target
//! to client. Each pipe reads at most one buffer and writes that exact slice
//! before reading again, so backpressure falls out of the serial
//! read-then-write sequencing. The first EOF or error in either direction
//! ends the relay; dropping the halves closes both sockets.

use crate::socks::consts::BUFFER_SIZE;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Copy one direction until EOF or error. Returns the byte count on EOF.
async fn pipe<R, W>(mut reader: R, mut writer: W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(total);
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }
}

/// Relay bytes between the client and the target until either side closes.
///
/// Transport errors here are silent closures; the protocol conversation is
/// over and there is nobody left to reply to.
pub async fn relay<C, T>(client: C, target: T)
where
    C: AsyncRead + AsyncWrite + Unpin,
    T: AsyncRead + AsyncWrite + Unpin,
{
    let (mut client_read, mut client_write) = tokio::io::split(client);
    let (mut target_read, mut target_write) = tokio::io::split(target);

    tokio::select! {
        result = pipe(&mut client_read, &mut target_write) => match result {
            Ok(bytes) => debug!("client->target closed after {} bytes", bytes),
            Err(err) => debug!("client->target error: {}", err),
        },
        result = pipe(&mut target_read, &mut client_write) => match result {
            Ok(bytes) => debug!("target->client closed after {} bytes", bytes),
            Err(err) => debug!("target->client error: {}", err),
        },
    }
}
