//! Per-session counters for both roles.
//!
//! Each role owns one stats value for the lifetime of a session.  Counters
//! only ever grow; the machines bump them at the points listed on each field
//! and hand back a snapshot when the session ends.

use std::fmt;

/// Counters kept by the sending role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    /// Chunks read from the source and framed (first transmissions only).
    pub packets_generated: u64,
    /// Payload bytes in those chunks.
    pub bytes_generated: u64,
    /// Every transmission attempt, first sends and retransmissions alike.
    pub transmissions: u64,
    /// Attempts swallowed by the loss simulator.
    pub packets_dropped: u64,
    /// Attempts actually handed to the channel.
    pub packets_transmitted: u64,
    /// ACKs matching the in-flight sequence bit.
    pub acks_received: u64,
    /// Bounded waits that expired.
    pub timeouts: u64,
}

/// Counters kept by the receiving role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Data frames received, duplicates included (EOT excluded).
    pub packets_received: u64,
    /// Data frames whose bit did not match the expected one.
    pub duplicates: u64,
    /// Data frames accepted and delivered.
    pub packets_accepted: u64,
    /// Payload bytes delivered to the sink.
    pub bytes_delivered: u64,
    pub acks_generated: u64,
    pub acks_transmitted: u64,
    pub acks_dropped: u64,
}

impl fmt::Display for SenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---Server Statistics---")?;
        writeln!(
            f,
            "Number of data packets generated for transmission: {}",
            self.packets_generated
        )?;
        writeln!(
            f,
            "Number of data bytes generated for transmission: {}",
            self.bytes_generated
        )?;
        writeln!(
            f,
            "Number of packets generated for retransmission: {}",
            self.transmissions
        )?;
        writeln!(
            f,
            "Number of data packets dropped due to loss: {}",
            self.packets_dropped
        )?;
        writeln!(
            f,
            "Number of data packets transmitted successfully: {}",
            self.packets_transmitted
        )?;
        writeln!(f, "Number of ACKs received: {}", self.acks_received)?;
        write!(f, "Number of timeouts expired: {}", self.timeouts)
    }
}

impl fmt::Display for ReceiverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---Client Statistics---")?;
        writeln!(
            f,
            "Number of data packets received successfully: {}",
            self.packets_received
        )?;
        writeln!(
            f,
            "Number of duplicate data packets received: {}",
            self.duplicates
        )?;
        writeln!(
            f,
            "Number of data packets received successfully (w/o duplicates): {}",
            self.packets_accepted
        )?;
        writeln!(
            f,
            "Number of data bytes delivered to user: {}",
            self.bytes_delivered
        )?;
        writeln!(
            f,
            "Number of ACKs transmitted successfully: {}",
            self.acks_transmitted
        )?;
        writeln!(
            f,
            "Number of ACKs generated, but dropped due to loss: {}",
            self.acks_dropped
        )?;
        write!(f, "Number of ACKs generated: {}", self.acks_generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counters_are_zero() {
        assert_eq!(SenderStats::default().transmissions, 0);
        assert_eq!(ReceiverStats::default().bytes_delivered, 0);
    }

    #[test]
    fn sender_report_lists_every_counter() {
        let stats = SenderStats {
            packets_generated: 3,
            bytes_generated: 120,
            transmissions: 5,
            packets_dropped: 2,
            packets_transmitted: 3,
            acks_received: 3,
            timeouts: 2,
        };
        let report = stats.to_string();
        assert_eq!(report.lines().count(), 8);
        assert!(report.contains("generated for transmission: 3"));
        assert!(report.contains("bytes generated for transmission: 120"));
        assert!(report.contains("timeouts expired: 2"));
    }

    #[test]
    fn receiver_report_lists_every_counter() {
        let stats = ReceiverStats {
            packets_received: 4,
            duplicates: 1,
            packets_accepted: 3,
            bytes_delivered: 42,
            acks_generated: 4,
            acks_transmitted: 3,
            acks_dropped: 1,
        };
        let report = stats.to_string();
        assert_eq!(report.lines().count(), 8);
        assert!(report.contains("duplicate data packets received: 1"));
        assert!(report.contains("delivered to user: 42"));
        assert!(report.contains("ACKs generated: 4"));
    }
}
