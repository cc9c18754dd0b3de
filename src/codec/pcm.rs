//! Fixed-rate PCM variants (`lpcm`, `in24`, `sowt`, `twos`). No framing
//! of their own; every sample is `stats.fixed_size` bytes, as measured
//! from the reference file.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

pub fn recognize(stats: &CodecStats, _start: &[u8], max_len: u32) -> Option<Match> {
    if stats.fixed_size == 0 || stats.fixed_size > max_len {
        return None;
    }

    Some(Match{length: stats.fixed_size, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_observed_fixed_size() {
        let stats = CodecStats{fixed_size: 4, ..Default::default()};
        let m = recognize(&stats, &[], 100).unwrap();
        assert_eq!(m.length, 4);
    }

    #[test]
    fn rejects_when_no_fixed_size_was_observed() {
        let stats = CodecStats::default();
        assert!(recognize(&stats, &[], 100).is_none());
    }

    #[test]
    fn rejects_when_fixed_size_exceeds_remaining_window() {
        let stats = CodecStats{fixed_size: 200, ..Default::default()};
        assert!(recognize(&stats, &[], 10).is_none());
    }
}
