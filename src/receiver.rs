//! Receiving-role state machine for stop-and-wait delivery.
//!
//! [`Receiver`] waits (without a timeout) for frames from the sender and, for
//! each data frame:
//! - Delivers the payload to the [`ByteSink`] if its bit matches the expected
//!   one, then flips the expected bit.  Otherwise counts a duplicate.
//! - Acknowledges by echoing the frame's own sequence field, whether or not
//!   the frame was new.  The ACK may be swallowed by the loss simulator.
//!
//! An EOT frame ends the loop regardless of its sequence field; EOT is never
//! acknowledged.

use crate::channel::Channel;
use crate::config::LossRatio;
use crate::error::SessionError;
use crate::packet::{self, Frame, SeqBit, MAX_FRAME_LEN};
use crate::simulator::LossSource;
use crate::sink::ByteSink;
use crate::state::ReceiverState;
use crate::stats::ReceiverStats;

/// Stop-and-wait receive-side state for one session.
#[derive(Debug)]
pub struct Receiver<C, L, K> {
    channel: C,
    loss: L,
    ack_loss: LossRatio,
    sink: K,
    expected: SeqBit,
    state: ReceiverState,
    stats: ReceiverStats,
}

impl<C: Channel, L: LossSource, K: ByteSink> Receiver<C, L, K> {
    pub fn new(channel: C, loss: L, ack_loss: LossRatio, sink: K) -> Self {
        Self {
            channel,
            loss,
            ack_loss,
            sink,
            expected: SeqBit::Zero,
            state: ReceiverState::AwaitingFrame,
            stats: ReceiverStats::default(),
        }
    }

    /// The bit the next new frame must carry.
    pub fn expected(&self) -> SeqBit {
        self.expected
    }

    pub fn state(&self) -> ReceiverState {
        self.state
    }

    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Receive frames until EOT.
    pub async fn run(&mut self) -> Result<ReceiverStats, SessionError> {
        let mut buf = [0u8; MAX_FRAME_LEN];
        while self.state == ReceiverState::AwaitingFrame {
            let n = self
                .channel
                .recv(&mut buf)
                .await
                .map_err(SessionError::Recv)?;
            let frame = packet::decode(&buf[..n]).inspect_err(|e| {
                log::error!("[receiver] undecodable datagram of {n} bytes: {e}");
            })?;
            self.on_frame(frame).await?;
        }
        Ok(self.stats)
    }

    /// Process one decoded frame and return the state it leaves us in.
    pub async fn on_frame(&mut self, frame: Frame) -> Result<ReceiverState, SessionError> {
        if frame.is_eot() {
            log::info!(
                "[receiver] end of transmission packet with sequence number {} received",
                frame.seq
            );
            if let Err(e) = self.sink.finish() {
                log::error!("[receiver] error flushing output: {e}");
            }
            log::debug!("[receiver] {} -> {}", self.state, ReceiverState::Done);
            self.state = ReceiverState::Done;
            log::info!("[receiver] session finished\n{}", self.stats);
            return Ok(self.state);
        }

        self.stats.packets_received += 1;
        let len = frame.payload.len();
        if frame.seq_bit() == self.expected {
            log::info!("[receiver] packet {} received with {len} data bytes", frame.seq);
            self.stats.packets_accepted += 1;
            // Counted as delivered even if the sink rejects the write.
            self.stats.bytes_delivered += len as u64;
            match self.sink.deliver(&frame.payload) {
                Ok(()) => log::info!("[receiver] packet {} delivered to user", frame.seq),
                Err(e) => log::error!("[receiver] error writing to output: {e}"),
            }
            self.expected.flip();
        } else {
            self.stats.duplicates += 1;
            log::info!(
                "[receiver] duplicate packet {} received with {len} data bytes",
                frame.seq
            );
        }

        self.acknowledge(frame.seq).await?;
        Ok(self.state)
    }

    async fn acknowledge(&mut self, seq: u16) -> Result<(), SessionError> {
        self.stats.acks_generated += 1;
        log::info!("[receiver] ACK {seq} generated for transmission");
        if self.loss.should_drop(self.ack_loss.get()) {
            self.stats.acks_dropped += 1;
            log::info!("[receiver] ACK {seq} lost");
            return Ok(());
        }
        self.channel
            .send(&packet::encode_ack(seq))
            .await
            .map_err(SessionError::Send)?;
        self.stats.acks_transmitted += 1;
        log::info!("[receiver] ACK {seq} successfully transmitted");
        Ok(())
    }
}
