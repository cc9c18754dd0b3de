//! GoPro Metadata (`gpmd`, GPMF format). Each sample is itself a single
//! top-level GPMF KLV entry: 4-byte FourCC type tag, then a packed
//! type/size/repeat field at bytes 4..8 whose low 16 bits give the
//! payload length in bytes (already rounded to a 4-byte boundary by the
//! encoder), plus an 8-byte KLV header.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < 8 {
        return None;
    }

    let packed = u32::from_be_bytes(start[4..8].try_into().ok()?);
    let payload_len = packed & 0xFFFF;
    let length = payload_len + 8;
    if length > max_len {
        return None;
    }

    Some(Match{length, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_klv_header_plus_payload() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 8];
        bytes[0..4].copy_from_slice(b"STRM");
        bytes[4..8].copy_from_slice(&0x0001_0010u32.to_be_bytes()); // payload_len = 0x0010 = 16
        bytes.extend_from_slice(&[0u8; 16]);
        let m = recognize(&stats, &bytes, bytes.len() as u32).unwrap();
        assert_eq!(m.length, 16 + 8);
    }

    #[test]
    fn rejects_when_declared_length_exceeds_window() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 8];
        bytes[4..8].copy_from_slice(&0xFFFFu32.to_be_bytes());
        assert!(recognize(&stats, &bytes, 8).is_none());
    }
}
