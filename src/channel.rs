//! Datagram channel abstraction.
//!
//! Both state machines talk to their peer through a [`Channel`]: an
//! unreliable, message-oriented pipe to exactly one peer.  In production this
//! is a connected [`crate::socket::Socket`]; tests use [`MemoryChannel`]
//! pairs so loss and timing can be scripted without touching the network.

use std::future::Future;
use std::io;

use tokio::sync::{mpsc, Mutex};

/// A connected datagram pipe.
pub trait Channel {
    /// Send one datagram to the peer.
    fn send(&self, datagram: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Receive one datagram into `buf`, returning the number of bytes copied.
    ///
    /// Datagrams longer than `buf` are truncated.
    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

impl<C: Channel + Sync + ?Sized> Channel for &C {
    fn send(&self, datagram: &[u8]) -> impl Future<Output = io::Result<()>> + Send {
        (**self).send(datagram)
    }

    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send {
        (**self).recv(buf)
    }
}

// ---------------------------------------------------------------------------
// MemoryChannel
// ---------------------------------------------------------------------------

/// One end of an in-process datagram pipe.
///
/// Delivery is reliable and ordered; loss is the state machines' business.
#[derive(Debug)]
pub struct MemoryChannel {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryChannel {
    /// Two connected ends.
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            MemoryChannel {
                tx: a_tx,
                rx: Mutex::new(a_rx),
            },
            MemoryChannel {
                tx: b_tx,
                rx: Mutex::new(b_rx),
            },
        )
    }
}

impl Channel for MemoryChannel {
    async fn send(&self, datagram: &[u8]) -> io::Result<()> {
        self.tx
            .send(datagram.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer end dropped"))
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let datagram = self.rx.lock().await.recv().await.ok_or_else(|| {
            io::Error::new(io::ErrorKind::ConnectionAborted, "peer end dropped")
        })?;
        let n = datagram.len().min(buf.len());
        buf[..n].copy_from_slice(&datagram[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pair_is_bidirectional() {
        let (a, b) = MemoryChannel::pair();
        a.send(b"ping").await.unwrap();
        b.send(b"pong").await.unwrap();

        let mut buf = [0u8; 16];
        let n = b.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"ping");
        let n = a.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"pong");
    }

    #[tokio::test]
    async fn long_datagram_is_truncated() {
        let (a, b) = MemoryChannel::pair();
        a.send(b"abcdef").await.unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(b.recv(&mut buf).await.unwrap(), 3);
        assert_eq!(&buf, b"abc");
    }

    #[tokio::test]
    async fn dropped_peer_is_an_error() {
        let (a, b) = MemoryChannel::pair();
        drop(b);
        assert!(a.send(b"x").await.is_err());
        let mut buf = [0u8; 4];
        assert!(a.recv(&mut buf).await.is_err());
    }

    async fn send_via<C: Channel>(chan: C, datagram: &[u8]) {
        chan.send(datagram).await.unwrap();
    }

    #[tokio::test]
    async fn reference_is_a_channel() {
        let (a, b) = MemoryChannel::pair();
        send_via(&a, b"r").await;
        let mut buf = [0u8; 1];
        assert_eq!(b.recv(&mut buf).await.unwrap(), 1);
        assert_eq!(&buf, b"r");
    }
}
