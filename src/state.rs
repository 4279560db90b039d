//! Finite-state-machine types for both roles.
//!
//! Transitions live in [`crate::sender`] and [`crate::receiver`]; this module
//! only names the states so the machines, their logs, and their tests share
//! one vocabulary.

/// Sender FSM.
///
/// ```text
///  ReadingChunk ──chunk──▶ AwaitingAck ──matching ACK──▶ ReadingChunk
///       │                    │    ▲
///       │ exhausted          └────┘ timeout / mismatched ACK
///       ▼
///     Done  (EOT sent)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderState {
    /// Pulling the next chunk from the byte source.
    #[default]
    ReadingChunk,
    /// One framed chunk is in flight; (re)transmitting until it is ACKed.
    AwaitingAck,
    /// EOT has been sent.
    Done,
}

/// Receiver FSM.
///
/// ```text
///  AwaitingFrame ──data──▶ AwaitingFrame
///       │
///       │ EOT
///       ▼
///     Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverState {
    #[default]
    AwaitingFrame,
    Done,
}

impl std::fmt::Display for SenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_display_by_name() {
        assert_eq!(SenderState::default().to_string(), "ReadingChunk");
        assert_eq!(SenderState::AwaitingAck.to_string(), "AwaitingAck");
        assert_eq!(ReceiverState::Done.to_string(), "Done");
    }
}
