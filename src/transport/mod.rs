//! Socket transport for SOME/IP test exchanges.
//!
//! A [`Transceiver`] sends one request from a fixed local address and returns
//! the single reply it gets back. The local address matters: the
//! [`Allocator`](crate::allocator::Allocator) keys client IDs by it.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Result, SomeIpError};

pub mod tcp;
pub mod udp;

pub use tcp::TcpTransceiver;
pub use udp::UdpTransceiver;

/// Default SOME/IP port.
pub const DEFAULT_PORT: u16 = 30490;

/// Largest reply accepted by default.
pub const DEFAULT_MAX_REPLY_SIZE: usize = crate::codec::DEFAULT_MAX_FRAME_SIZE;

/// One request, one reply.
pub trait Transceiver {
    /// Send `data` from `local` to `remote` and wait up to `timeout` for the reply.
    fn send(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Bytes>;
}

/// Map socket timeouts to [`SomeIpError::Timeout`] and EOF to
/// [`SomeIpError::ConnectionClosed`].
pub(crate) fn map_io(err: io::Error) -> SomeIpError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SomeIpError::Timeout,
        io::ErrorKind::UnexpectedEof => SomeIpError::ConnectionClosed,
        _ => SomeIpError::Io(err),
    }
}

pub(crate) fn map_err(err: SomeIpError) -> SomeIpError {
    match err {
        SomeIpError::Io(io) => map_io(io),
        other => other,
    }
}
