//! Async TCP transceiver.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpSocket, TcpStream};
use tokio::time::timeout;
use tracing::debug;

use crate::codec_async::read_frame_async;
use crate::error::{Result, SomeIpError};
use crate::transport::DEFAULT_MAX_REPLY_SIZE;

/// Async counterpart of [`TcpTransceiver`](crate::transport::TcpTransceiver).
///
/// `timeout` bounds the whole exchange: connect, write and reply.
#[derive(Debug, Clone)]
pub struct AsyncTcpTransceiver {
    max_reply_size: usize,
}

impl AsyncTcpTransceiver {
    pub fn new() -> Self {
        Self {
            max_reply_size: DEFAULT_MAX_REPLY_SIZE,
        }
    }

    /// Set the largest reply frame accepted.
    pub fn with_max_reply_size(mut self, size: usize) -> Self {
        self.max_reply_size = size;
        self
    }

    async fn connect(local: SocketAddr, remote: SocketAddr) -> Result<TcpStream> {
        let socket = if remote.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(local)?;
        let stream = socket.connect(remote).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    async fn exchange(&self, local: SocketAddr, remote: SocketAddr, data: &[u8]) -> Result<Bytes> {
        let mut stream = Self::connect(local, remote).await?;
        debug!(%local, %remote, len = data.len(), "tcp send");
        stream.write_all(data).await?;
        stream.flush().await?;

        let reply = read_frame_async(&mut stream, self.max_reply_size).await?;
        debug!(%local, %remote, len = reply.len(), "tcp reply");
        Ok(Bytes::from(reply))
    }

    /// Send `data` from `local` to `remote` and wait up to `timeout` for the reply.
    pub async fn send(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        data: &[u8],
        timeout_after: Duration,
    ) -> Result<Bytes> {
        match timeout(timeout_after, self.exchange(local, remote, data)).await {
            Ok(result) => result.map_err(crate::transport::map_err),
            Err(_) => Err(SomeIpError::Timeout),
        }
    }
}

impl Default for AsyncTcpTransceiver {
    fn default() -> Self {
        Self::new()
    }
}
