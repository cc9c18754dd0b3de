//! Sized sequential/random access over a file or an in-memory buffer, with
//! big-endian integer reads/writes (C1).
//!
//! Grounded in `mp4iter::Mp4Reader` (`reader.rs`), which already wraps a
//! `BufReader<File>` plus a `Cursor<Vec<u8>>` for the in-memory `moov` and
//! dispatches between the two via a `TargetReader` enum. `ByteStream`
//! generalizes that split into a single type usable for any box's payload,
//! and adds the write half the read-only teacher never needed.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};

use crate::errors::SalvageError;

/// Backing storage for a `ByteStream`.
enum Backing {
    File(BufReader<File>),
    FileWrite(BufWriter<File>),
    Memory(Cursor<Vec<u8>>),
}

/// A scoped, sized byte stream over a file or an in-memory buffer.
///
/// All integer reads/writes are big-endian and unaligned, matching the
/// ISO BMFF wire format. The stream is scoped: it owns its handle and the
/// handle is closed (and, for writers, flushed) on drop, the same
/// guarantee `mp4iter::Mp4` gives by owning its `BufReader<File>` for its
/// entire lifetime.
pub struct ByteStream {
    backing: Backing,
    len: u64,
}

impl ByteStream {
    /// Opens `path` for sequential/random reads.
    pub fn open(path: &std::path::Path) -> Result<Self, SalvageError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            backing: Backing::File(BufReader::new(file)),
            len,
        })
    }

    /// Creates (or truncates) `path` for writes.
    pub fn create(path: &std::path::Path) -> Result<Self, SalvageError> {
        let file = OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        Ok(Self {
            backing: Backing::FileWrite(BufWriter::new(file)),
            len: 0,
        })
    }

    /// Wraps an in-memory buffer (used for the always-small `moov` tree).
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len = data.len() as u64;
        Self {
            backing: Backing::Memory(Cursor::new(data)),
            len,
        }
    }

    /// Unwraps a memory-backed stream back into its buffer. Used by tests
    /// that write a box tree in memory and inspect the result.
    #[cfg(test)]
    pub fn into_vec(self) -> Vec<u8> {
        match self.backing {
            Backing::Memory(cursor) => cursor.into_inner(),
            _ => panic!("into_vec called on a non-memory-backed ByteStream"),
        }
    }

    /// Total size in bytes of the underlying resource.
    pub fn size(&self) -> u64 {
        self.len
    }

    /// Current read/write position.
    pub fn position(&mut self) -> Result<u64, SalvageError> {
        Ok(match &mut self.backing {
            Backing::File(r) => r.stream_position()?,
            Backing::FileWrite(w) => w.stream_position()?,
            Backing::Memory(c) => c.position(),
        })
    }

    pub fn seek(&mut self, offset: u64) -> Result<u64, SalvageError> {
        Ok(match &mut self.backing {
            Backing::File(r) => r.seek(SeekFrom::Start(offset))?,
            Backing::FileWrite(w) => w.seek(SeekFrom::Start(offset))?,
            Backing::Memory(c) => c.seek(SeekFrom::Start(offset))?,
        })
    }

    fn read_exact_checked(&mut self, buf: &mut [u8]) -> Result<(), SalvageError> {
        match &mut self.backing {
            Backing::File(r) => r.read_exact(buf).map_err(|e| self.eof_or_io(e)),
            Backing::Memory(c) => c.read_exact(buf).map_err(|e| self.eof_or_io(e)),
            Backing::FileWrite(_) => Err(SalvageError::Unsupported("stream opened for writing only".into())),
        }
    }

    fn eof_or_io(&self, err: std::io::Error) -> SalvageError {
        SalvageError::Io(err)
    }

    /// Reads exactly `n` bytes, erroring with `Truncated`-shaped `Io` on
    /// short read.
    pub fn read_exact_n(&mut self, n: usize) -> Result<Vec<u8>, SalvageError> {
        let mut buf = vec![0u8; n];
        self.read_exact_checked(&mut buf)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> Result<u8, SalvageError> {
        let mut buf = [0u8; 1];
        self.read_exact_checked(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_u32_be(&mut self) -> Result<u32, SalvageError> {
        let mut buf = [0u8; 4];
        self.read_exact_checked(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    pub fn read_u64_be(&mut self) -> Result<u64, SalvageError> {
        let mut buf = [0u8; 8];
        self.read_exact_checked(&mut buf)?;
        Ok(u64::from_be_bytes(buf))
    }

    pub fn write_u32_be(&mut self, value: u32) -> Result<(), SalvageError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_u64_be(&mut self, value: u64) -> Result<(), SalvageError> {
        self.write_all(&value.to_be_bytes())
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), SalvageError> {
        match &mut self.backing {
            Backing::FileWrite(w) => {
                w.write_all(bytes)?;
                self.len += bytes.len() as u64;
                Ok(())
            }
            Backing::Memory(c) => {
                c.write_all(bytes)?;
                self.len = self.len.max(c.position());
                Ok(())
            }
            Backing::File(_) => Err(SalvageError::Unsupported("stream opened for reading only".into())),
        }
    }

    /// Flushes any pending buffered writes without dropping the stream.
    pub fn flush(&mut self) -> Result<(), SalvageError> {
        match &mut self.backing {
            Backing::FileWrite(w) => Ok(w.flush()?),
            Backing::Memory(_) | Backing::File(_) => Ok(()),
        }
    }

    /// Bounds-check helper: errors unless `offset + len <= size()`.
    pub fn bounds(&self, offset: u64, len: u64) -> Result<(), SalvageError> {
        if offset.saturating_add(len) > self.len {
            return Err(SalvageError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("read of {len} bytes at {offset} exceeds stream size {}", self.len),
            )));
        }
        Ok(())
    }
}

impl Drop for ByteStream {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl Write for ByteStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        ByteStream::write_all(self, buf).map_err(std::io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        ByteStream::flush(self).map_err(std::io::Error::from)
    }
}
