//! Session parameters for both roles.
//!
//! Values arrive as strings from the CLI and are validated here, before any
//! socket is opened.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::source::Chunking;
use crate::timer::AckTimeout;

/// Well-known UDP port the server listens on.
pub const DEFAULT_PORT: u16 = 6680;

/// Host the client contacts when none is given.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// File the client writes delivered bytes into when none is given.
pub const DEFAULT_OUTPUT: &str = "out.txt";

/// Default server bind address: every interface on [`DEFAULT_PORT`].
pub fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("loss ratio must be a real number in [0, 1], got {0:?}")]
    LossRatio(String),
    #[error("timeout exponent {0} is too large")]
    TimeoutExponent(u32),
    #[error("unknown chunking mode {0:?} (expected \"lines\" or \"fixed\")")]
    Chunking(String),
}

// ---------------------------------------------------------------------------
// LossRatio
// ---------------------------------------------------------------------------

/// Probability in `[0, 1]` that an outbound datagram is dropped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct LossRatio(f64);

impl LossRatio {
    pub const NONE: LossRatio = LossRatio(0.0);

    pub fn new(ratio: f64) -> Result<Self, ConfigError> {
        if (0.0..=1.0).contains(&ratio) {
            Ok(Self(ratio))
        } else {
            Err(ConfigError::LossRatio(ratio.to_string()))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl FromStr for LossRatio {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratio: f64 = s
            .trim()
            .parse()
            .map_err(|_| ConfigError::LossRatio(s.to_string()))?;
        Self::new(ratio)
    }
}

impl fmt::Display for LossRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role configs
// ---------------------------------------------------------------------------

/// Parameters for the serving (sending) role.
#[derive(Debug, Clone, Copy)]
pub struct SenderConfig {
    pub timeout: AckTimeout,
    pub packet_loss: LossRatio,
    pub chunking: Chunking,
}

impl SenderConfig {
    pub fn new(timeout_exponent: u32, packet_loss: LossRatio) -> Result<Self, ConfigError> {
        Ok(Self {
            timeout: AckTimeout::from_exponent(timeout_exponent)?,
            packet_loss,
            chunking: Chunking::default(),
        })
    }

    pub fn with_chunking(mut self, chunking: Chunking) -> Self {
        self.chunking = chunking;
        self
    }
}

/// Parameters for the requesting (receiving) role.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Name of the resource to ask the server for.
    pub file_name: String,
    pub ack_loss: LossRatio,
}

impl ReceiverConfig {
    pub fn new(file_name: impl Into<String>, ack_loss: LossRatio) -> Self {
        Self {
            file_name: file_name.into(),
            ack_loss,
        }
    }
}
