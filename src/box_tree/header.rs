//! Box header parsing: `[length:u32][type:u32]`, with the 64-bit extended
//! length branch when `length == 1`.
//!
//! Grounded in `mp4iter::reader::Mp4Reader::header()`, which already
//! detects the `atom_size == 1` 64-bit-extension case and rejects zero-size
//! ("extends to end of file" is only meaningful for a top-level box and is
//! handled by the repairer's stage 1 fallback, not by this parser).

use crate::byte_stream::ByteStream;
use crate::errors::SalvageError;
use crate::fourcc::FourCC;

/// A parsed box header: where it starts, how many header bytes it
/// consumed, its declared total length (including the header), and its
/// FourCC.
#[derive(Debug, Clone)]
pub struct BoxHeader {
    pub start: u64,
    pub header_size: u8,
    pub length: u64,
    pub name: FourCC,
}

impl BoxHeader {
    pub fn payload_len(&self) -> u64 {
        self.length.saturating_sub(self.header_size as u64)
    }

    pub fn payload_start(&self) -> u64 {
        self.start + self.header_size as u64
    }

    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    pub fn is_container(&self) -> bool {
        crate::box_tree::catalog::BoxCatalog::is_container(self.name.to_str())
    }
}

/// Parses one box header at the stream's current position. Fails with
/// `Truncated` if fewer bytes than the header requires remain, and with
/// `ZeroSizeBox` if the declared length is 0 (top-level "extends to EOF"
/// is handled by the caller, not here, since interpreting it correctly
/// requires knowing the enclosing stream's total size).
pub fn parse_header(stream: &mut ByteStream) -> Result<BoxHeader, SalvageError> {
    let start = stream.position()?;
    let remaining = stream.size().saturating_sub(start);
    if remaining < 8 {
        return Err(SalvageError::Truncated{offset: start, declared_len: 8, remaining});
    }

    let declared = stream.read_u32_be()?;
    let type_bytes = stream.read_exact_n(4)?;
    let name = FourCC::from_slice(&type_bytes);

    if declared == 0 {
        return Err(SalvageError::ZeroSizeBox(start));
    }

    if declared == 1 {
        let remaining_ext = stream.size().saturating_sub(stream.position()?);
        if remaining_ext < 8 {
            return Err(SalvageError::Truncated{offset: start, declared_len: 16, remaining});
        }
        let length = stream.read_u64_be()?;
        if length < 16 {
            return Err(SalvageError::BadBox{offset: start, reason: format!("64-bit extended length {length} shorter than header")});
        }
        if start + length > stream.size() {
            return Err(SalvageError::Truncated{offset: start, declared_len: length, remaining: stream.size() - start});
        }
        return Ok(BoxHeader{start, header_size: 16, length, name});
    }

    if (declared as u64) < 8 {
        return Err(SalvageError::BadBox{offset: start, reason: format!("declared length {declared} shorter than header")});
    }
    if start + declared as u64 > stream.size() {
        return Err(SalvageError::Truncated{offset: start, declared_len: declared as u64, remaining});
    }

    Ok(BoxHeader{start, header_size: 8, length: declared as u64, name})
}
