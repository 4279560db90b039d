//! Byte sinks consuming the receiver's delivered payloads.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Consumer of in-order payload bytes.
pub trait ByteSink {
    /// Append one accepted payload.
    fn deliver(&mut self, payload: &[u8]) -> io::Result<()>;

    /// Flush anything buffered once the stream has ended.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> ByteSink for W {
    fn deliver(&mut self, payload: &[u8]) -> io::Result<()> {
        self.write_all(payload)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// The client's output file.
///
/// If the file cannot be created the sink stays usable but every write
/// fails, so the transfer still runs to completion.
#[derive(Debug)]
pub enum OutputFile {
    Open(BufWriter<File>),
    Unavailable { path: PathBuf, reason: String },
}

impl OutputFile {
    pub fn create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match File::create(path) {
            Ok(file) => OutputFile::Open(BufWriter::new(file)),
            Err(e) => {
                log::error!("cannot open {} for writing: {e}", path.display());
                OutputFile::Unavailable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, OutputFile::Open(_))
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            OutputFile::Open(w) => w.write(buf),
            OutputFile::Unavailable { path, reason } => Err(io::Error::other(format!(
                "{} is unavailable: {reason}",
                path.display()
            ))),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            OutputFile::Open(w) => w.flush(),
            OutputFile::Unavailable { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_appends() {
        let mut sink: Vec<u8> = Vec::new();
        sink.deliver(b"ab").unwrap();
        sink.deliver(b"c").unwrap();
        sink.finish().unwrap();
        assert_eq!(sink, b"abc");
    }

    #[test]
    fn output_file_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut out = OutputFile::create(&path);
        assert!(out.is_open());
        out.deliver(b"hello\n").unwrap();
        out.finish().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello\n");
    }

    #[test]
    fn unavailable_output_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = OutputFile::create(dir.path().join("missing").join("out.txt"));
        assert!(!out.is_open());
        assert!(out.deliver(b"x").is_err());
        assert!(out.finish().is_ok());
    }
}
