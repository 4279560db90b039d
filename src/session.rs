//! Wiring for one client/server exchange.
//!
//! ```text
//!  client                                  server
//!    │ ── request frame (seq 0, name) ──▶    │  learn peer, open file
//!    │ ◀──────── data seq b ───────────      │
//!    │ ───────── ACK b ────────────────▶     │  (repeat per chunk)
//!    │ ◀──────── EOT ──────────────────      │
//! ```
//!
//! The server handles exactly one session per call; the client makes exactly
//! one request.

use std::io;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};

use crate::channel::Channel;
use crate::config::{ReceiverConfig, SenderConfig};
use crate::error::SessionError;
use crate::packet::{self, SeqBit, MAX_FRAME_LEN, MAX_PAYLOAD};
use crate::receiver::Receiver;
use crate::sender::Sender;
use crate::simulator::{LossSource, RandomLoss};
use crate::sink::{ByteSink, OutputFile};
use crate::socket::Socket;
use crate::source::ChunkReader;
use crate::stats::{ReceiverStats, SenderStats};

// ---------------------------------------------------------------------------
// Server side
// ---------------------------------------------------------------------------

/// Bind `bind`, serve one request for files under `root`, and return.
pub async fn serve(
    bind: SocketAddr,
    root: &Path,
    config: &SenderConfig,
) -> Result<SenderStats, SessionError> {
    let socket = Socket::bind(bind).await?;
    log::info!("[server] listening on {}", socket.local_addr);
    serve_on(&socket, root, config, RandomLoss::from_clock()).await
}

/// Serve one request on an already bound socket.
pub async fn serve_on<L: LossSource>(
    socket: &Socket,
    root: &Path,
    config: &SenderConfig,
    loss: L,
) -> Result<SenderStats, SessionError> {
    let (name, peer) = await_request(socket).await?;
    log::info!("[server] requested file name: {name} (from {peer})");
    socket.connect(peer).await?;

    let mut sender = Sender::new(socket, loss, config);
    let opened = match resolve_request_path(root, &name) {
        Some(path) => ChunkReader::open(&path, config.chunking),
        None => Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "name escapes the served directory",
        )),
    };
    match opened {
        Ok(source) => sender.run(source).await,
        Err(e) => {
            log::error!("[server] error opening {name}: {e}");
            sender.run_not_found().await
        }
    }
}

/// Wait for the client's request frame; returns the name and its sender.
async fn await_request(socket: &Socket) -> Result<(String, SocketAddr), SessionError> {
    let mut buf = [0u8; MAX_FRAME_LEN];
    let (n, peer) = socket
        .recv_from(&mut buf)
        .await
        .map_err(SessionError::Recv)?;
    let frame = packet::decode(&buf[..n])?;
    Ok((String::from_utf8_lossy(&frame.payload).into_owned(), peer))
}

/// Map a requested name onto a path under `root`.
///
/// Absolute names and names with `..` components are refused.
pub fn resolve_request_path(root: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    (plain && !name.is_empty()).then(|| root.join(relative))
}

// ---------------------------------------------------------------------------
// Client side
// ---------------------------------------------------------------------------

/// Resolve `server`, request `config.file_name`, and write it to `output`.
pub async fn request(
    server: &str,
    config: &ReceiverConfig,
    output: &Path,
) -> Result<ReceiverStats, SessionError> {
    let addr = resolve(server).await?;
    let local: SocketAddr = if addr.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = Socket::bind(local).await?;
    socket.connect(addr).await?;
    log::info!(
        "[client] connecting to {addr} to retrieve {:?}, with ACK loss ratio {}",
        config.file_name,
        config.ack_loss
    );

    let (stats, _sink) =
        request_on(&socket, config, OutputFile::create(output), RandomLoss::from_clock()).await?;
    Ok(stats)
}

/// Send the request on `channel` and receive the reply into `sink`.
pub async fn request_on<C, L, K>(
    channel: C,
    config: &ReceiverConfig,
    sink: K,
    loss: L,
) -> Result<(ReceiverStats, K), SessionError>
where
    C: Channel,
    L: LossSource,
    K: ByteSink,
{
    send_request(&channel, &config.file_name).await?;
    let mut receiver = Receiver::new(channel, loss, config.ack_loss, sink);
    let stats = receiver.run().await?;
    Ok((stats, receiver.into_sink()))
}

/// Send the single request frame naming the wanted resource.
pub async fn send_request<C: Channel>(channel: &C, name: &str) -> Result<(), SessionError> {
    if name.len() > MAX_PAYLOAD {
        return Err(SessionError::RequestTooLong(name.len()));
    }
    let frame = packet::encode(SeqBit::Zero, name.as_bytes())?;
    channel.send(&frame).await.map_err(SessionError::Send)
}

async fn resolve(server: &str) -> Result<SocketAddr, SessionError> {
    let resolve_err = |source| SessionError::Resolve {
        addr: server.to_string(),
        source,
    };
    tokio::net::lookup_host(server)
        .await
        .map_err(resolve_err)?
        .next()
        .ok_or_else(|| {
            resolve_err(io::Error::new(
                io::ErrorKind::NotFound,
                "no addresses returned",
            ))
        })
}
