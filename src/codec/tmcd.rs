//! Timecode (`tmcd`) sample data: a fixed 22-byte header, checked for
//! the reserved fields' expected values, followed by a trailing count.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

const HEADER_LEN: u32 = 22;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < HEADER_LEN as usize {
        return None;
    }
    let reserved = u32::from_be_bytes(start[0..4].try_into().ok()?);
    if reserved != 0 {
        return None;
    }
    let flags = u32::from_be_bytes(start[4..8].try_into().ok()?);
    if flags > 15 {
        return None;
    }
    let trailing_reserved = start[21];
    if trailing_reserved != 0 {
        return None;
    }

    let tail_count = u32::from_be_bytes(start[8..12].try_into().ok()?);
    let length = HEADER_LEN + tail_count;
    if length > max_len {
        return None;
    }

    Some(Match{length, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(tail_count: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 22];
        bytes[8..12].copy_from_slice(&tail_count.to_be_bytes());
        bytes
    }

    #[test]
    fn accepts_well_formed_header() {
        let stats = CodecStats::default();
        let bytes = header(0);
        let m = recognize(&stats, &bytes, bytes.len() as u32).unwrap();
        assert_eq!(m.length, 22);
    }

    #[test]
    fn rejects_nonzero_reserved_field() {
        let stats = CodecStats::default();
        let mut bytes = header(0);
        bytes[0] = 1;
        assert!(recognize(&stats, &bytes, bytes.len() as u32).is_none());
    }

    #[test]
    fn rejects_when_too_short() {
        let stats = CodecStats::default();
        let bytes = vec![0u8; 10];
        assert!(recognize(&stats, &bytes, 10).is_none());
    }
}
