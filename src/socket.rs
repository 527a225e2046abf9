//! Thin synchronous UDP socket wrapper.
//!
//! No framing, no timeouts, no non-blocking mode: the dispatch loop's sole
//! blocking call is `recv_from` (spec.md §5), so this wrapper stays a plain
//! pass-through over `std::net::UdpSocket`.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};

use crate::error::StartupError;
use crate::wire::MAX_DATAGRAM_SIZE;

/// A bound IPv4 UDP endpoint.
pub struct UdpEndpoint {
    socket: UdpSocket,
}

impl UdpEndpoint {
    /// Bind on `INADDR_ANY:port`.
    ///
    /// # Errors
    ///
    /// Returns [`StartupError::SocketBind`] if the bind fails.
    pub fn bind(port: u16) -> Result<Self, StartupError> {
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        let socket = UdpSocket::bind(addr).map_err(|source| StartupError::SocketBind { port, source })?;
        Ok(Self { socket })
    }

    /// Block until one datagram arrives, writing it into `buf`.
    ///
    /// Returns the number of bytes received and the sender's address. `buf`
    /// should be sized at least [`MAX_DATAGRAM_SIZE`] so no datagram is ever
    /// truncated on read.
    pub fn recv_from(&self, buf: &mut [u8; MAX_DATAGRAM_SIZE]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf)
    }

    /// Send `buf` to `addr`.
    pub fn send_to(&self, buf: &[u8], addr: SocketAddr) -> std::io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    /// The address this endpoint is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
