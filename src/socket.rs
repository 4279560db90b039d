//! Async UDP socket abstraction.
//!
//! [`Socket`] is a thin wrapper around `tokio::net::UdpSocket`.  The server
//! binds it, learns its one peer from the first datagram, then associates
//! with that peer; the client associates with the server right away.  Once
//! associated the socket is a [`Channel`] to that peer.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::channel::Channel;
use crate::error::SessionError;

/// An async, datagram-oriented UDP socket.
#[derive(Debug)]
pub struct Socket {
    /// Address this socket is bound to (filled in after OS assigns ephemeral port).
    pub local_addr: SocketAddr,
    inner: UdpSocket,
}

impl Socket {
    /// Bind a new socket to `local_addr`.
    ///
    /// Passing port `0` lets the OS choose an ephemeral port.
    pub async fn bind(local_addr: SocketAddr) -> Result<Self, SessionError> {
        let bind_err = |source| SessionError::Bind {
            addr: local_addr,
            source,
        };
        let inner = UdpSocket::bind(local_addr).await.map_err(bind_err)?;
        let local_addr = inner.local_addr().map_err(bind_err)?;
        Ok(Self { local_addr, inner })
    }

    /// Restrict sends and receives to `peer`.
    pub async fn connect(&self, peer: SocketAddr) -> Result<(), SessionError> {
        self.inner
            .connect(peer)
            .await
            .map_err(|source| SessionError::Connect { addr: peer, source })
    }

    /// Receive the next datagram from anyone.
    ///
    /// Returns `(len, sender_address)`.
    pub async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf).await
    }

    /// The associated peer, if any.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.inner.peer_addr()
    }
}

impl Channel for Socket {
    async fn send(&self, datagram: &[u8]) -> io::Result<()> {
        self.inner.send(datagram).await.map(|_| ())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.recv(buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    #[tokio::test]
    async fn bind_reports_ephemeral_port() {
        let socket = Socket::bind(loopback()).await.unwrap();
        assert_ne!(socket.local_addr.port(), 0);
        assert!(socket.peer_addr().is_err());
    }

    #[tokio::test]
    async fn connected_pair_exchanges_datagrams() {
        let a = Socket::bind(loopback()).await.unwrap();
        let b = Socket::bind(loopback()).await.unwrap();
        a.connect(b.local_addr).await.unwrap();
        b.connect(a.local_addr).await.unwrap();

        a.send(&[0, 1]).await.unwrap();
        let mut buf = [0u8; 8];
        let n = b.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0, 1]);
        assert_eq!(b.peer_addr().unwrap(), a.local_addr);
    }

    #[tokio::test]
    async fn recv_from_reports_sender() {
        let a = Socket::bind(loopback()).await.unwrap();
        let b = Socket::bind(loopback()).await.unwrap();
        a.connect(b.local_addr).await.unwrap();
        a.send(b"hi").await.unwrap();

        let mut buf = [0u8; 8];
        let (n, from) = b.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hi");
        assert_eq!(from, a.local_addr);
    }

    #[tokio::test]
    async fn binding_a_taken_port_fails() {
        let a = Socket::bind(loopback()).await.unwrap();
        let err = Socket::bind(a.local_addr).await.unwrap_err();
        assert!(matches!(err, SessionError::Bind { .. }));
    }
}
