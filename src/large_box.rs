//! `mdat` variant that does not materialize its payload in memory (C3).
//!
//! Every other box in a tree is small enough to live as a `Vec<u8>` (this
//! mirrors `mp4iter::Mp4Reader`, which buffers the whole `moov` subtree into
//! a `Cursor<Vec<u8>>` via `moov_reader`). `mdat` is the one box that can be
//! gigabytes, so it keeps its payload on disk and exposes a windowed view
//! instead, backed by a sliding in-memory buffer refilled lazily.
//!
//! The source this crate is grounded on (`BufferedAtom::getFragment`) has an
//! off-by-one in its cached-range comparison that can force an unnecessary
//! reallocation even when the requested window is a strict subset of the
//! buffer already held. This implementation uses the corrected inequality
//! `buffer_begin <= offset && offset + size <= buffer_end` throughout and
//! does not reproduce the bug (§9 open question).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::consts::{DEFAULT_SLIDING_BUFFER, DEFAULT_WRITE_WINDOW};
use crate::errors::SalvageError;

/// A file-backed window `[file_begin, file_end)` over a source file, with a
/// sliding in-memory read buffer.
pub struct LargeBox {
    source: PathBuf,
    file_begin: u64,
    file_end: u64,
    buffer_capacity: usize,
    write_window: usize,
    buffer: Vec<u8>,
    buffer_begin: u64,
    buffer_end: u64,
}

impl LargeBox {
    /// Anchors a window at `[file_begin, file_end)` within `source`.
    pub fn new(source: &Path, file_begin: u64, file_end: u64) -> Self {
        Self {
            source: source.to_path_buf(),
            file_begin,
            file_end,
            buffer_capacity: DEFAULT_SLIDING_BUFFER,
            write_window: DEFAULT_WRITE_WINDOW,
            buffer: Vec::new(),
            buffer_begin: 0,
            buffer_end: 0,
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_write_window(mut self, window: usize) -> Self {
        self.write_window = window;
        self
    }

    /// Size of the window in bytes, i.e. the `mdat` payload length.
    pub fn len(&self) -> u64 {
        self.file_end.saturating_sub(self.file_begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_begin(&self) -> u64 {
        self.file_begin
    }

    pub fn file_end(&self) -> u64 {
        self.file_end
    }

    /// Shrinks the window's end. Valid only when `new <= len()`; growing
    /// past the originally anchored window is `Unsupported` since there is
    /// no guarantee the source file has more bytes to offer past it.
    pub fn content_resize(&mut self, new_len: u64) -> Result<(), SalvageError> {
        if new_len > self.len() {
            return Err(SalvageError::Unsupported(format!(
                "content_resize({new_len}) exceeds current window length {}",
                self.len()
            )));
        }
        self.file_end = self.file_begin + new_len;
        if self.buffer_end > self.file_end {
            // Invalidate rather than truncate in place; next read refills.
            self.buffer.clear();
            self.buffer_begin = 0;
            self.buffer_end = 0;
        }
        Ok(())
    }

    /// Ensures the sliding buffer covers `[offset, offset+len)` relative to
    /// the start of the file (absolute offsets), refilling if necessary.
    /// Uses the corrected bounds check, not the source's off-by-one.
    fn ensure_covers(&mut self, offset: u64, len: u64) -> Result<(), SalvageError> {
        let covers = self.buffer_begin <= offset && offset + len <= self.buffer_end;
        if covers {
            return Ok(());
        }

        let window = (len as usize).max(self.buffer_capacity) as u64;
        let fill_begin = offset;
        let fill_end = (offset + window).min(self.file_end);
        if fill_end < offset + len {
            return Err(SalvageError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("read of {len} bytes at {offset} exceeds mdat window end {}", self.file_end),
            )));
        }

        let mut file = File::open(&self.source)?;
        file.seek(SeekFrom::Start(fill_begin))?;
        let mut buf = vec![0u8; (fill_end - fill_begin) as usize];
        file.read_exact(&mut buf)?;

        self.buffer = buf;
        self.buffer_begin = fill_begin;
        self.buffer_end = fill_end;
        Ok(())
    }

    /// Reads `len` bytes at absolute file offset `offset` (must lie within
    /// `[file_begin, file_end)`).
    pub fn read_at(&mut self, offset: u64, len: u64) -> Result<Vec<u8>, SalvageError> {
        if offset < self.file_begin || offset + len > self.file_end {
            return Err(SalvageError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("read of {len} bytes at {offset} outside mdat window [{}, {})", self.file_begin, self.file_end),
            )));
        }
        self.ensure_covers(offset, len)?;
        let start = (offset - self.buffer_begin) as usize;
        Ok(self.buffer[start..start + len as usize].to_vec())
    }

    pub fn read_u32_be(&mut self, offset: u64) -> Result<u32, SalvageError> {
        let bytes = self.read_at(offset, 4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_u64_be(&mut self, offset: u64) -> Result<u64, SalvageError> {
        let bytes = self.read_at(offset, 8)?;
        Ok(u64::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Streams the window to `out` in chunks of at most `write_window`
    /// bytes, without ever materializing the whole payload in memory.
    pub fn write_to(&self, out: &mut impl Write) -> Result<(), SalvageError> {
        let mut file = File::open(&self.source)?;
        file.seek(SeekFrom::Start(self.file_begin))?;
        let mut remaining = self.len();
        let mut chunk = vec![0u8; self.write_window];
        while remaining > 0 {
            let take = (remaining as usize).min(chunk.len());
            file.read_exact(&mut chunk[..take])?;
            out.write_all(&chunk[..take])?;
            remaining -= take as u64;
        }
        Ok(())
    }
}

impl std::fmt::Debug for LargeBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LargeBox")
            .field("source", &self.source)
            .field("file_begin", &self.file_begin)
            .field("file_end", &self.file_end)
            .finish()
    }
}
