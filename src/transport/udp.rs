//! UDP transceiver.

use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::{Result, SomeIpError};

use super::{map_io, Transceiver};

/// Default maximum UDP datagram size for SOME/IP.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 1400;

/// Sends one datagram and returns the first datagram that comes back from the
/// remote address. Datagrams from other senders are dropped.
#[derive(Debug, Clone)]
pub struct UdpTransceiver {
    max_datagram_size: usize,
}

impl UdpTransceiver {
    pub fn new() -> Self {
        Self {
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
        }
    }

    /// Set the receive buffer size. Longer datagrams are truncated by the OS.
    pub fn with_max_datagram_size(mut self, size: usize) -> Self {
        self.max_datagram_size = size;
        self
    }
}

impl Default for UdpTransceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Transceiver for UdpTransceiver {
    fn send(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
        data: &[u8],
        timeout: Duration,
    ) -> Result<Bytes> {
        let socket = UdpSocket::bind(local)?;
        socket.send_to(data, remote).map_err(map_io)?;
        debug!(%local, %remote, len = data.len(), "udp send");

        let deadline = Instant::now() + timeout;
        let mut buffer = vec![0u8; self.max_datagram_size];
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(SomeIpError::Timeout);
            }
            socket.set_read_timeout(Some(left))?;

            let (len, from) = socket.recv_from(&mut buffer).map_err(map_io)?;
            if from == remote {
                debug!(%local, %remote, len, "udp reply");
                return Ok(Bytes::copy_from_slice(&buffer[..len]));
            }
            trace!(%from, len, "dropping datagram from unexpected sender");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_reply() {
        let server = UdpSocket::bind("127.0.0.1:0").unwrap();
        let remote = server.local_addr().unwrap();

        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (len, peer) = server.recv_from(&mut buf).unwrap();
            let mut reply = buf[..len].to_vec();
            reply.reverse();
            server.send_to(&reply, peer).unwrap();
        });

        let reply = UdpTransceiver::new()
            .send(
                "127.0.0.1:0".parse().unwrap(),
                remote,
                &[1, 2, 3],
                Duration::from_secs(5),
            )
            .unwrap();
        assert_eq!(reply.as_ref(), &[3, 2, 1]);
        handle.join().unwrap();
    }

    #[test]
    fn test_timeout() {
        let silent = UdpSocket::bind("127.0.0.1:0").unwrap();
        let err = UdpTransceiver::new()
            .send(
                "127.0.0.1:0".parse().unwrap(),
                silent.local_addr().unwrap(),
                &[0],
                Duration::from_millis(100),
            )
            .unwrap_err();
        assert!(matches!(err, SomeIpError::Timeout));
    }
}
