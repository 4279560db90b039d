//! `stop-and-wait` — reliable, ordered file transfer over UDP using a
//! one-packet-in-flight ARQ with a single alternating sequence bit.
//!
//! # Architecture
//!
//! ```text
//!  ┌────────────┐  data frames  ┌────────────┐
//!  │   Sender   │──────────────▶│  Receiver  │──▶ ByteSink
//!  │ (server)   │               │  (client)  │
//!  └──┬─────▲───┘     ACKs      └─────┬──────┘
//!     │     └─────────────────────────┘
//!     │ ByteSource        each side consults its own LossSource
//!     │                   before every data frame / ACK
//!  ┌──▼────────────────────────────────┐
//!  │     Channel (Socket or Memory)     │
//!  └───────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`packet`]     — wire format for frames and ACKs
//! - [`sender`]     — sending-role state machine
//! - [`receiver`]   — receiving-role state machine
//! - [`state`]      — finite-state-machine types
//! - [`stats`]      — per-session counters
//! - [`timer`]      — ACK timeout derivation and bounded wait
//! - [`simulator`]  — injectable loss decisions
//! - [`source`]     — byte sources (file chunking)
//! - [`sink`]       — byte sinks (output file)
//! - [`channel`]    — datagram channel trait and in-memory pair
//! - [`socket`]     — async UDP socket
//! - [`config`]     — validated session parameters
//! - [`session`]    — one client/server exchange
//! - [`error`]      — fatal session errors

pub mod channel;
pub mod config;
pub mod error;
pub mod packet;
pub mod receiver;
pub mod sender;
pub mod session;
pub mod simulator;
pub mod sink;
pub mod socket;
pub mod source;
pub mod state;
pub mod stats;
pub mod timer;

pub use config::{LossRatio, ReceiverConfig, SenderConfig};
pub use error::SessionError;
pub use receiver::Receiver;
pub use sender::Sender;
pub use stats::{ReceiverStats, SenderStats};
