//! Fatal session failures.
//!
//! Anything that surfaces as a [`SessionError`] aborts the exchange.
//! Recoverable conditions (ACK timeouts, a missing or unreadable source
//! file, sink write failures) are handled inside the state machines and
//! only show up in the counters and the log.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::packet::PacketError;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("cannot resolve server address {addr:?}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot associate with peer {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    #[error("receive failed: {0}")]
    Recv(#[source] io::Error),

    #[error("EOT already sent; the session is over")]
    Finished,

    #[error("requested name is {0} bytes; it must fit in one frame")]
    RequestTooLong(usize),

    #[error(transparent)]
    Packet(#[from] PacketError),
}
