//! Wire-format definitions for data frames and acknowledgements.
//!
//! Two kinds of datagram cross the wire:
//! - [`Frame`] — a 4-byte header followed by up to [`MAX_PAYLOAD`] payload
//!   bytes, sent by the serving side (and once by the client as its request).
//! - ACK — a bare 16-bit integer echoing the acknowledged frame's sequence
//!   field.
//!
//! No I/O happens here — this is pure data transformation.
//!
//! # Wire format
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            Length             |           Sequence            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                    Payload (0..=80 bytes) ...                 |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! A frame with `length == 0` is the end-of-transmission (EOT) marker.

use thiserror::Error;

/// Byte length of the fixed-size frame header.
pub const HEADER_LEN: usize = 4;

/// Largest payload a single frame may carry.
pub const MAX_PAYLOAD: usize = 80;

/// Largest datagram a well-formed frame can occupy.
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD;

/// Byte length of an encoded acknowledgement.
pub const ACK_LEN: usize = 2;

const OFF_LEN: usize = 0;
const OFF_SEQ: usize = 2;

// ---------------------------------------------------------------------------
// SeqBit
// ---------------------------------------------------------------------------

/// The alternating one-bit sequence counter.
///
/// Both roles start at [`SeqBit::Zero`] and flip only on a successful,
/// matched round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SeqBit {
    #[default]
    Zero,
    One,
}

impl SeqBit {
    /// The other bit.
    pub fn flipped(self) -> Self {
        match self {
            SeqBit::Zero => SeqBit::One,
            SeqBit::One => SeqBit::Zero,
        }
    }

    /// Flip in place.
    pub fn flip(&mut self) {
        *self = self.flipped();
    }

    /// Value written into the 16-bit sequence field.
    pub fn as_u16(self) -> u16 {
        match self {
            SeqBit::Zero => 0,
            SeqBit::One => 1,
        }
    }

    /// Interpret a raw sequence field; only bit 0 is significant.
    pub fn from_wire(seq: u16) -> Self {
        if seq & 1 == 0 {
            SeqBit::Zero
        } else {
            SeqBit::One
        }
    }
}

impl std::fmt::Display for SeqBit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// A decoded data (or EOT) frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw sequence field, echoed verbatim in the ACK.
    pub seq: u16,
    /// Payload bytes; empty for EOT.
    pub payload: Vec<u8>,
}

impl Frame {
    /// `true` for the end-of-transmission marker (`length == 0`).
    pub fn is_eot(&self) -> bool {
        self.payload.is_empty()
    }

    /// The frame's alternating bit.
    pub fn seq_bit(&self) -> SeqBit {
        SeqBit::from_wire(self.seq)
    }
}

/// Serialise a frame carrying `payload` under sequence bit `seq`.
///
/// Fails with [`PacketError::PayloadTooLarge`] when `payload` exceeds
/// [`MAX_PAYLOAD`].
pub fn encode(seq: SeqBit, payload: &[u8]) -> Result<Vec<u8>, PacketError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(PacketError::PayloadTooLarge(payload.len()));
    }
    let mut buf = vec![0u8; HEADER_LEN + payload.len()];
    buf[OFF_LEN..OFF_LEN + 2].copy_from_slice(&(payload.len() as u16).to_be_bytes());
    buf[OFF_SEQ..OFF_SEQ + 2].copy_from_slice(&seq.as_u16().to_be_bytes());
    buf[HEADER_LEN..].copy_from_slice(payload);
    Ok(buf)
}

/// Serialise the end-of-transmission frame: a bare header with `length = 0`.
pub fn encode_eot(seq: SeqBit) -> Vec<u8> {
    let mut buf = vec![0u8; HEADER_LEN];
    buf[OFF_SEQ..OFF_SEQ + 2].copy_from_slice(&seq.as_u16().to_be_bytes());
    buf
}

/// Parse a [`Frame`] from a raw datagram.
///
/// Returns [`PacketError::MalformedFrame`] if the buffer is shorter than the
/// header, or the declared length is over [`MAX_PAYLOAD`] or runs past the
/// end of the buffer. Bytes beyond the declared length are ignored, so an
/// EOT header followed by garbage still decodes with an empty payload.
pub fn decode(buf: &[u8]) -> Result<Frame, PacketError> {
    if buf.len() < HEADER_LEN {
        return Err(PacketError::MalformedFrame(format!(
            "{} bytes is shorter than the {HEADER_LEN}-byte header",
            buf.len()
        )));
    }
    let len = u16::from_be_bytes([buf[OFF_LEN], buf[OFF_LEN + 1]]) as usize;
    let seq = u16::from_be_bytes([buf[OFF_SEQ], buf[OFF_SEQ + 1]]);

    let available = buf.len() - HEADER_LEN;
    if len > MAX_PAYLOAD || len > available {
        return Err(PacketError::MalformedFrame(format!(
            "declared length {len} with {available} payload bytes present"
        )));
    }

    Ok(Frame {
        seq,
        payload: buf[HEADER_LEN..HEADER_LEN + len].to_vec(),
    })
}

// ---------------------------------------------------------------------------
// ACK
// ---------------------------------------------------------------------------

/// Serialise an acknowledgement for sequence field `seq`.
pub fn encode_ack(seq: u16) -> [u8; ACK_LEN] {
    seq.to_be_bytes()
}

/// Parse an acknowledgement; it must be exactly [`ACK_LEN`] bytes.
pub fn decode_ack(buf: &[u8]) -> Result<u16, PacketError> {
    match buf {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(PacketError::MalformedAck(buf.len())),
    }
}

/// Errors that can arise when building or parsing a datagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    /// Payload longer than [`MAX_PAYLOAD`].
    #[error("payload of {0} bytes exceeds the 80-byte frame limit")]
    PayloadTooLarge(usize),
    /// Datagram could not be parsed as a frame.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    /// Datagram was not exactly [`ACK_LEN`] bytes.
    #[error("malformed ACK: expected 2 bytes, got {0}")]
    MalformedAck(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_writes_header_then_payload() {
        let bytes = encode(SeqBit::One, b"hello\n").unwrap();
        assert_eq!(bytes.len(), HEADER_LEN + 6);
        assert_eq!(&bytes[OFF_LEN..OFF_LEN + 2], &[0x00, 0x06]);
        assert_eq!(&bytes[OFF_SEQ..OFF_SEQ + 2], &[0x00, 0x01]);
        assert_eq!(&bytes[HEADER_LEN..], b"hello\n");
    }

    #[test]
    fn encode_decode_roundtrip() {
        let frame = decode(&encode(SeqBit::Zero, b"abc").unwrap()).unwrap();
        assert_eq!(frame.seq, 0);
        assert_eq!(frame.payload, b"abc");
        assert!(!frame.is_eot());
    }

    #[test]
    fn full_payload_is_accepted() {
        let payload = [0x5au8; MAX_PAYLOAD];
        let bytes = encode(SeqBit::Zero, &payload).unwrap();
        assert_eq!(bytes.len(), MAX_FRAME_LEN);
        assert_eq!(decode(&bytes).unwrap().payload, payload);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(
            encode(SeqBit::Zero, &payload),
            Err(PacketError::PayloadTooLarge(MAX_PAYLOAD + 1))
        );
    }

    #[test]
    fn decode_short_header_returns_error() {
        assert!(matches!(decode(&[]), Err(PacketError::MalformedFrame(_))));
        assert!(matches!(
            decode(&[0u8; HEADER_LEN - 1]),
            Err(PacketError::MalformedFrame(_))
        ));
    }

    #[test]
    fn decode_truncated_payload_returns_error() {
        let mut bytes = encode(SeqBit::Zero, b"data").unwrap();
        bytes.pop();
        assert!(matches!(decode(&bytes), Err(PacketError::MalformedFrame(_))));
    }

    #[test]
    fn decode_length_over_limit_returns_error() {
        let mut bytes = vec![0u8; HEADER_LEN + 100];
        bytes[OFF_LEN..OFF_LEN + 2].copy_from_slice(&100u16.to_be_bytes());
        assert!(matches!(decode(&bytes), Err(PacketError::MalformedFrame(_))));
    }

    #[test]
    fn eot_ignores_trailing_garbage() {
        let mut bytes = encode_eot(SeqBit::One);
        bytes.extend_from_slice(b"junk");
        let frame = decode(&bytes).unwrap();
        assert!(frame.is_eot());
        assert_eq!(frame.seq, 1);
    }

    #[test]
    fn eot_is_header_only() {
        assert_eq!(encode_eot(SeqBit::Zero), vec![0, 0, 0, 0]);
        assert_eq!(encode(SeqBit::Zero, b"").unwrap(), encode_eot(SeqBit::Zero));
    }

    #[test]
    fn ack_is_two_big_endian_bytes() {
        assert_eq!(encode_ack(1), [0x00, 0x01]);
        assert_eq!(decode_ack(&[0x01, 0x02]), Ok(0x0102));
    }

    #[test]
    fn ack_of_wrong_size_is_rejected() {
        assert_eq!(decode_ack(&[0x00]), Err(PacketError::MalformedAck(1)));
        assert_eq!(decode_ack(&[0, 0, 0]), Err(PacketError::MalformedAck(3)));
    }

    #[test]
    fn seq_bit_uses_low_bit_only() {
        assert_eq!(SeqBit::from_wire(0), SeqBit::Zero);
        assert_eq!(SeqBit::from_wire(3), SeqBit::One);
        assert_eq!(SeqBit::from_wire(0x8000), SeqBit::Zero);
    }

    #[test]
    fn seq_bit_alternates() {
        let mut bit = SeqBit::default();
        assert_eq!(bit, SeqBit::Zero);
        bit.flip();
        assert_eq!(bit, SeqBit::One);
        assert_eq!(bit.flipped(), SeqBit::Zero);
    }
}
