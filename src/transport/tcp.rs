//! TCP transceiver.

use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use bytes::Bytes;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::debug;

use crate::codec::read_frame;
use crate::error::Result;

use super::{map_err, map_io, Transceiver, DEFAULT_MAX_REPLY_SIZE};

/// Sends over a fresh TCP connection per exchange.
///
/// The socket is bound to the local address before connecting, so the peer
/// sees a stable source port. The reply is one length-delimited SOME/IP frame.
#[derive(Debug, Clone)]
pub struct TcpTransceiver {
    max_reply_size: usize,
}

impl TcpTransceiver {
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

    fn connect(local: SocketAddr, remote: SocketAddr, timeout: Duration) -> Result<TcpStream> {
        let socket = Socket::new(Domain::for_address(remote), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&SockAddr::from(local))?;
        socket
            .connect_timeout(&SockAddr::from(remote), timeout)
            .map_err(map_io)?;

        let stream: TcpStream = socket.into();
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

impl Default for TcpTransceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Transceiver for TcpTransceiver {
    fn send(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        let mut stream = Self::connect(local, remote, timeout)?;
        debug!(%local, %remote, len = data.len(), "tcp send");
        stream.write_all(data).map_err(map_io)?;
        stream.flush().map_err(map_io)?;

        let reply = read_frame(&mut stream, self.max_reply_size).map_err(map_err)?;
        debug!(%local, %remote, len = reply.len(), "tcp reply");
        Ok(Bytes::from(reply))
    }
}
