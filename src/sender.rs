//! Sending-role state machine for stop-and-wait delivery.
//!
//! [`Sender`] owns the sequence bit, the counters, and a [`Channel`] to the
//! receiver.  It streams a [`ByteSource`] one chunk at a time:
//!
//! - Frame the chunk under the current bit.
//! - Until a matching ACK arrives: attempt a transmission (the loss simulator
//!   may swallow it), then wait for an ACK under the [`AckTimeout`].
//! - On a matching ACK flip the bit and move on; once the source is
//!   exhausted send a single EOT frame.
//!
//! # Stop-and-Wait contract
//! - At most **one** data frame is in flight at any moment.
//! - A timeout retransmits the identical frame and is counted.
//! - An ACK that does not match the current bit is discarded and the frame
//!   is retransmitted straight away.  That path is not a timeout and is not
//!   counted as one.
//! - EOT and the not-found notice bypass loss simulation and are never
//!   retransmitted.

use crate::channel::Channel;
use crate::config::{LossRatio, SenderConfig};
use crate::error::SessionError;
use crate::packet::{self, SeqBit, MAX_FRAME_LEN};
use crate::simulator::LossSource;
use crate::source::ByteSource;
use crate::state::SenderState;
use crate::stats::SenderStats;
use crate::timer::{AckTimeout, Wait};

/// Payload sent in place of file contents when the requested source is missing.
///
/// Sent as exactly these 15 bytes; no C-string NUL terminator follows.
pub const NOT_FOUND_MESSAGE: &[u8] = b"FILE NOT FOUND\n";

/// Stop-and-wait send-side state for one session.
#[derive(Debug)]
pub struct Sender<C, L> {
    channel: C,
    loss: L,
    packet_loss: LossRatio,
    timeout: AckTimeout,
    seq: SeqBit,
    state: SenderState,
    stats: SenderStats,
}

impl<C: Channel, L: LossSource> Sender<C, L> {
    pub fn new(channel: C, loss: L, config: &SenderConfig) -> Self {
        Self {
            channel,
            loss,
            packet_loss: config.packet_loss,
            timeout: config.timeout,
            seq: SeqBit::Zero,
            state: SenderState::ReadingChunk,
            stats: SenderStats::default(),
        }
    }

    /// Current sequence bit.
    pub fn seq(&self) -> SeqBit {
        self.seq
    }

    pub fn state(&self) -> SenderState {
        self.state
    }

    /// Snapshot of the counters so far.
    pub fn stats(&self) -> SenderStats {
        self.stats
    }

    /// Stream `source` to the peer, then send EOT.
    ///
    /// A read error ends the source early; EOT still goes out so the peer
    /// is never left waiting.
    pub async fn run<S: ByteSource>(&mut self, mut source: S) -> Result<SenderStats, SessionError> {
        loop {
            match source.next_chunk() {
                Ok(Some(chunk)) => self.send_chunk(&chunk).await?,
                Ok(None) => break,
                Err(e) => {
                    log::error!("[sender] error reading source, ending transfer: {e}");
                    break;
                }
            }
        }
        self.finish().await?;
        Ok(self.stats)
    }

    /// Deliver one chunk: frame it, then transmit until a matching ACK.
    ///
    /// Fails with [`SessionError::Finished`] once EOT has been sent. A call
    /// after an earlier failed one starts the chunk over under the current
    /// bit.
    pub async fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        if self.state == SenderState::Done {
            return Err(SessionError::Finished);
        }
        let frame = packet::encode(self.seq, chunk)?;

        self.stats.packets_generated += 1;
        self.stats.bytes_generated += chunk.len() as u64;
        log::info!(
            "[sender] packet {} generated for transmission with {} data bytes",
            self.seq,
            chunk.len()
        );

        self.enter(SenderState::AwaitingAck);
        while self.state == SenderState::AwaitingAck {
            self.transmit(&frame, chunk.len()).await?;
            self.await_ack(chunk.len()).await?;
        }
        Ok(())
    }

    /// Send the EOT frame under the current bit and stop.
    pub async fn finish(&mut self) -> Result<(), SessionError> {
        self.channel
            .send(&packet::encode_eot(self.seq))
            .await
            .map_err(SessionError::Send)?;
        self.enter(SenderState::Done);
        log::info!(
            "[sender] end of transmission packet with sequence number {} transmitted",
            self.seq
        );
        log::info!("[sender] session finished\n{}", self.stats);
        Ok(())
    }

    /// Missing-source path: one unacknowledged notice frame, then EOT.
    pub async fn run_not_found(&mut self) -> Result<SenderStats, SessionError> {
        let frame = packet::encode(self.seq, NOT_FOUND_MESSAGE)?;
        self.channel.send(&frame).await.map_err(SessionError::Send)?;
        log::info!(
            "[sender] packet {} transmitted with {} data bytes",
            self.seq,
            NOT_FOUND_MESSAGE.len()
        );
        self.seq.flip();
        self.finish().await?;
        Ok(self.stats)
    }

    fn enter(&mut self, next: SenderState) {
        log::debug!("[sender] {} -> {next}", self.state);
        self.state = next;
    }

    /// One transmission attempt of `frame`, subject to loss simulation.
    async fn transmit(&mut self, frame: &[u8], payload_len: usize) -> Result<(), SessionError> {
        self.stats.transmissions += 1;
        if self.loss.should_drop(self.packet_loss.get()) {
            self.stats.packets_dropped += 1;
            log::info!("[sender] packet {} lost", self.seq);
            return Ok(());
        }
        self.channel.send(frame).await.map_err(SessionError::Send)?;
        self.stats.packets_transmitted += 1;
        log::info!(
            "[sender] packet {} successfully transmitted with {} data bytes",
            self.seq,
            payload_len
        );
        Ok(())
    }

    /// One bounded wait for an ACK.  Leaves `AwaitingAck` only on a match.
    async fn await_ack(&mut self, payload_len: usize) -> Result<(), SessionError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        match self.timeout.wait(self.channel.recv(&mut buf)).await {
            Wait::TimedOut => {
                self.stats.timeouts += 1;
                log::info!("[sender] timeout expired for packet numbered {}", self.seq);
                log::info!(
                    "[sender] packet {} generated for re-transmission with {} data bytes",
                    self.seq,
                    payload_len
                );
            }
            Wait::Ready(Err(e)) => return Err(SessionError::Recv(e)),
            Wait::Ready(Ok(n)) => {
                let ack = packet::decode_ack(&buf[..n])?;
                if ack == self.seq.as_u16() {
                    self.stats.acks_received += 1;
                    log::info!("[sender] ACK {ack} received");
                    self.seq.flip();
                    self.enter(SenderState::ReadingChunk);
                } else {
                    log::debug!("[sender] ignoring ACK {ack} while waiting for {}", self.seq);
                }
            }
        }
        Ok(())
    }
}
