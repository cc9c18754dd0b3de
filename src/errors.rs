//! Errors raised while parsing, recognizing, or repairing an ISO BMFF file.

use std::fmt;

/// Errors raised by box parsing, track reconstruction, and repair.
#[derive(Debug)]
pub enum SalvageError {
    /// Converted `BinResult` error.
    BinReadError(binrw::Error),
    /// Converted `Utf8Error`.
    Utf8Error(std::string::FromUtf8Error),
    /// Underlying stream read/write failed.
    Io(std::io::Error),
    /// Declared box length exceeds remaining bytes while parsing.
    Truncated{offset: u64, declared_len: u64, remaining: u64},
    /// Header length < 8 or four-character type is not ASCII.
    BadBox{offset: u64, reason: String},
    /// A required box (`mvhd`, `mdat`, `mdhd`, `stsd`, `stsz`, `stts`, `stsc`, `hdlr`) is absent.
    MissingHeader(String),
    /// `stsd.entries != 1` in a track; multiplexed sample descriptions are unsupported.
    MultiplexedUnsupported{track_id: u32, entries: u32},
    /// Codec id not present in the recognizer dispatch table.
    UnsupportedCodec(String),
    /// Required oracle call returned an error for AVC1/MP4A/MP4V/ALAC.
    OracleUnavailable(String),
    /// Computed absolute offset lies outside the output `mdat`.
    OffsetOutOfRange{offset: u64, mdat_start: u64, mdat_end: u64},
    /// No such box.
    NoSuchBox(String),
    /// Box declared a zero length outside of the "extends to EOF" top-level case.
    ZeroSizeBox(u64),
    /// Operation unsupported in the current state, e.g. `LargeBox::content_resize`
    /// growing past the original file-backed window.
    Unsupported(String),
    /// Recursive box parsing exceeded the configured depth cap.
    RecurseDepthExceeded{depth: usize, max: usize},
}

impl std::error::Error for SalvageError {}

impl fmt::Display for SalvageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SalvageError::BinReadError(err) => write!(f, "{err}"),
            SalvageError::Utf8Error(err) => write!(f, "{err}"),
            SalvageError::Io(err) => write!(f, "IO error: {err}"),
            SalvageError::Truncated{offset, declared_len, remaining} => write!(
                f,
                "Truncated box at offset {offset}: declared length {declared_len} exceeds {remaining} remaining bytes."
            ),
            SalvageError::BadBox{offset, reason} => write!(f, "Bad box header at offset {offset}: {reason}"),
            SalvageError::MissingHeader(name) => write!(f, "Missing required box '{name}'."),
            SalvageError::MultiplexedUnsupported{track_id, entries} => write!(
                f,
                "Track {track_id} has {entries} sample description entries; only single-entry stsd is supported."
            ),
            SalvageError::UnsupportedCodec(codec) => write!(f, "No recognizer registered for codec '{codec}'."),
            SalvageError::OracleUnavailable(codec) => write!(f, "Decoder oracle unavailable or errored for codec '{codec}'."),
            SalvageError::OffsetOutOfRange{offset, mdat_start, mdat_end} => write!(
                f,
                "Offset {offset} lies outside mdat range [{mdat_start}, {mdat_end})."
            ),
            SalvageError::NoSuchBox(name) => write!(f, "No such box '{name}'."),
            SalvageError::ZeroSizeBox(offset) => write!(f, "Zero-size box at offset {offset}."),
            SalvageError::Unsupported(reason) => write!(f, "Unsupported: {reason}"),
            SalvageError::RecurseDepthExceeded{depth, max} => write!(f, "Recurse depth {depth} exceeds max {max}."),
        }
    }
}

impl From<std::io::Error> for SalvageError {
    fn from(err: std::io::Error) -> Self {
        SalvageError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for SalvageError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        SalvageError::Utf8Error(err)
    }
}

impl From<binrw::Error> for SalvageError {
    fn from(err: binrw::Error) -> Self {
        SalvageError::BinReadError(err)
    }
}

impl From<std::num::TryFromIntError> for SalvageError {
    fn from(err: std::num::TryFromIntError) -> Self {
        SalvageError::Unsupported(err.to_string())
    }
}

impl From<SalvageError> for std::io::Error {
    fn from(err: SalvageError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
