//! Byte sources feeding the sender.
//!
//! A [`ByteSource`] yields a finite, lazy sequence of chunks, each at most
//! [`MAX_PAYLOAD`] bytes.  Sources are single-pass; to replay, build a new one.

use std::collections::VecDeque;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use crate::config::ConfigError;
use crate::packet::MAX_PAYLOAD;

/// Longest chunk produced in [`Chunking::Lines`] mode: one byte of an
/// 80-byte line buffer is reserved for the terminator.
pub const LINE_CHUNK: usize = MAX_PAYLOAD - 1;

/// Producer of payload chunks.
pub trait ByteSource {
    /// The next chunk, or `None` once the source is exhausted.
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        (**self).next_chunk()
    }
}

// ---------------------------------------------------------------------------
// Chunking
// ---------------------------------------------------------------------------

/// How a reader is cut into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chunking {
    /// One line per chunk, split further when a line exceeds [`LINE_CHUNK`].
    #[default]
    Lines,
    /// Exact [`MAX_PAYLOAD`]-byte chunks; the last one may be shorter.
    Fixed,
}

impl FromStr for Chunking {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" => Ok(Chunking::Lines),
            "fixed" => Ok(Chunking::Fixed),
            _ => Err(ConfigError::Chunking(s.to_string())),
        }
    }
}

impl fmt::Display for Chunking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunking::Lines => f.write_str("lines"),
            Chunking::Fixed => f.write_str("fixed"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Cuts any [`Read`] into chunks according to a [`Chunking`] mode.
pub struct ChunkReader<R> {
    reader: BufReader<R>,
    chunking: Chunking,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, chunking: Chunking) -> Self {
        Self {
            reader: BufReader::new(reader),
            chunking,
        }
    }

    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::with_capacity(LINE_CHUNK);
        while chunk.len() < LINE_CHUNK {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let room = LINE_CHUNK - chunk.len();
            let window = &available[..available.len().min(room)];
            let (take, line_done) = match window.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (window.len(), false),
            };
            chunk.extend_from_slice(&window[..take]);
            self.reader.consume(take);
            if line_done {
                break;
            }
        }
        Ok((!chunk.is_empty()).then_some(chunk))
    }

    fn next_fixed(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = Vec::with_capacity(MAX_PAYLOAD);
        (&mut self.reader)
            .take(MAX_PAYLOAD as u64)
            .read_to_end(&mut chunk)?;
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}

impl ChunkReader<File> {
    /// Open `path` for chunked reading.
    pub fn open(path: impl AsRef<Path>, chunking: Chunking) -> io::Result<Self> {
        Ok(Self::new(File::open(path)?, chunking))
    }
}

impl<R: Read> ByteSource for ChunkReader<R> {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        match self.chunking {
            Chunking::Lines => self.next_line(),
            Chunking::Fixed => self.next_fixed(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChunkList
// ---------------------------------------------------------------------------

/// A source over chunks that are already split.
#[derive(Debug, Clone, Default)]
pub struct ChunkList {
    chunks: VecDeque<Vec<u8>>,
}

impl ChunkList {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }
}

impl ByteSource for ChunkList {
    fn next_chunk(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.chunks.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(mut src: impl ByteSource) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(chunk) = src.next_chunk().unwrap() {
            out.push(chunk);
        }
        out
    }

    #[test]
    fn lines_mode_splits_after_newline() {
        let src = ChunkReader::new(Cursor::new(b"one\ntwo\nthree".to_vec()), Chunking::Lines);
        assert_eq!(
            drain(src),
            vec![b"one\n".to_vec(), b"two\n".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn lines_mode_caps_long_lines() {
        let mut text = vec![b'x'; 200];
        text.push(b'\n');
        let chunks = drain(ChunkReader::new(Cursor::new(text.clone()), Chunking::Lines));
        assert_eq!(
            chunks.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![79, 79, 43]
        );
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn lines_mode_keeps_blank_lines() {
        let src = ChunkReader::new(Cursor::new(b"\n\na\n".to_vec()), Chunking::Lines);
        assert_eq!(drain(src), vec![b"\n".to_vec(), b"\n".to_vec(), b"a\n".to_vec()]);
    }

    #[test]
    fn fixed_mode_cuts_full_payloads() {
        let data: Vec<u8> = (0..=200u8).collect();
        let chunks = drain(ChunkReader::new(Cursor::new(data.clone()), Chunking::Fixed));
        assert_eq!(
            chunks.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![80, 80, 41]
        );
        assert_eq!(chunks.concat(), data);
    }

    #[test]
    fn empty_reader_is_immediately_exhausted() {
        for mode in [Chunking::Lines, Chunking::Fixed] {
            let mut src = ChunkReader::new(Cursor::new(Vec::new()), mode);
            assert_eq!(src.next_chunk().unwrap(), None);
        }
    }

    #[test]
    fn chunk_list_yields_in_order() {
        let src = ChunkList::new(["a", "bc"]);
        assert_eq!(drain(src), vec![b"a".to_vec(), b"bc".to_vec()]);
    }

    #[test]
    fn chunking_parses_from_cli_text() {
        assert_eq!("lines".parse::<Chunking>().unwrap(), Chunking::Lines);
        assert_eq!("FIXED".parse::<Chunking>().unwrap(), Chunking::Fixed);
        assert!("words".parse::<Chunking>().is_err());
    }

    #[test]
    fn opening_missing_file_fails() {
        let err = ChunkReader::open("/definitely/not/here.txt", Chunking::Lines)
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
