//! Sony `mbex` (broadcast extension) metadata track. Each sample opens
//! with a u32 packet length; confidence is boosted when the following
//! `crec` FourCC is found at the expected sub-record offset.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

const MAX_PACKET_LEN: u32 = 200;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < 4 {
        return None;
    }
    let length = u32::from_be_bytes(start[0..4].try_into().ok()?);
    if length == 0 || length > MAX_PACKET_LEN || length > max_len {
        return None;
    }

    let chances = if start.len() >= 12 && &start[8..12] == b"crec" {
        1.0
    } else {
        0.5
    };

    Some(Match{length, duration: None, keyframe: true, chances})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boosts_confidence_when_crec_present() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 12];
        bytes[0..4].copy_from_slice(&20u32.to_be_bytes());
        bytes[8..12].copy_from_slice(b"crec");
        let m = recognize(&stats, &bytes, 100).unwrap();
        assert_eq!(m.chances, 1.0);
    }

    #[test]
    fn half_confidence_without_crec() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 12];
        bytes[0..4].copy_from_slice(&20u32.to_be_bytes());
        let m = recognize(&stats, &bytes, 100).unwrap();
        assert_eq!(m.chances, 0.5);
    }

    #[test]
    fn rejects_packet_length_above_cap() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 4];
        bytes[0..4].copy_from_slice(&(MAX_PACKET_LEN + 1).to_be_bytes());
        assert!(recognize(&stats, &bytes, 1000).is_none());
    }
}
