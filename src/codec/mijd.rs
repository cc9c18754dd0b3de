//! Insta360 `mijd` metadata track. Samples carry the ASCII prefix
//! `mijd` followed by two length fields; the sample's total length is
//! read from offset 48, with the field at offset 44 used only as a
//! cross-check.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < 52 || &start[0..4] != b"mijd" {
        return None;
    }

    let check_len = u32::from_be_bytes(start[44..48].try_into().ok()?);
    let length = u32::from_be_bytes(start[48..52].try_into().ok()?);
    if length == 0 || length > max_len {
        return None;
    }
    if check_len != 0 && check_len != length {
        return None;
    }

    Some(Match{length, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(length: u32, check_len: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 52];
        bytes[0..4].copy_from_slice(b"mijd");
        bytes[44..48].copy_from_slice(&check_len.to_be_bytes());
        bytes[48..52].copy_from_slice(&length.to_be_bytes());
        bytes
    }

    #[test]
    fn accepts_matching_cross_check() {
        let stats = CodecStats::default();
        let bytes = sample(64, 64);
        let m = recognize(&stats, &bytes, 200).unwrap();
        assert_eq!(m.length, 64);
    }

    #[test]
    fn accepts_zero_cross_check_as_unset() {
        let stats = CodecStats::default();
        let bytes = sample(64, 0);
        assert!(recognize(&stats, &bytes, 200).is_some());
    }

    #[test]
    fn rejects_mismatched_cross_check() {
        let stats = CodecStats::default();
        let bytes = sample(64, 32);
        assert!(recognize(&stats, &bytes, 200).is_none());
    }
}
