//! Fallback matcher for codecs with no dedicated structural recognizer.
//! Falls back to the reference file's empirical statistics alone: a
//! fixed sample size if one was observed, otherwise the strongest
//! 4-byte/8-byte prefix prior, otherwise no match at all.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

pub fn recognize(stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if stats.fixed_size != 0 && stats.fixed_size <= max_len {
        return Some(Match{length: stats.fixed_size, duration: None, keyframe: true, chances: 1.0});
    }

    if start.len() >= 8 {
        let prefix64 = u64::from_be_bytes(start[0..8].try_into().ok()?);
        let chances = stats.prior64(prefix64);
        if chances > 0.0 {
            return Some(Match{length: 8, duration: None, keyframe: false, chances});
        }
    }
    if start.len() >= 4 {
        let prefix32 = u32::from_be_bytes(start[0..4].try_into().ok()?);
        let chances = stats.prior32(prefix32);
        if chances > 0.0 {
            return Some(Match{length: 4, duration: None, keyframe: false, chances});
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_fixed_size_over_priors() {
        let stats = CodecStats{fixed_size: 5, ..Default::default()};
        let m = recognize(&stats, &[0u8; 16], 100).unwrap();
        assert_eq!(m.length, 5);
    }

    #[test]
    fn falls_back_to_prior64_when_no_fixed_size() {
        let mut beginnings64 = std::collections::HashMap::new();
        beginnings64.insert(0x1122_3344_5566_7788u64, 7.0);
        let stats = CodecStats{beginnings64, ..Default::default()};
        let bytes = 0x1122_3344_5566_7788u64.to_be_bytes();
        let m = recognize(&stats, &bytes, 100).unwrap();
        assert_eq!(m.length, 8);
        assert_eq!(m.chances, 7.0);
    }

    #[test]
    fn returns_none_when_nothing_matches() {
        let stats = CodecStats::default();
        assert!(recognize(&stats, &[0u8; 16], 100).is_none());
    }
}
