//! Camera Motion Metadata (`camm`, Google's CAMM format). The first two
//! bytes are a reserved field followed by a type code; the type selects
//! a fixed payload length from a small table (angle axis, orientation
//! quaternion, position, gyro, etc).

use crate::codec::Match;
use crate::codec_stats::CodecStats;

const TYPE_LENGTHS: [u32; 8] = [12, 8, 12, 12, 12, 24, 56, 12];

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < 4 {
        return None;
    }
    let reserved = u16::from_be_bytes(start[0..2].try_into().ok()?);
    if reserved != 0 {
        return None;
    }
    let camm_type = u16::from_be_bytes(start[2..4].try_into().ok()?);
    let payload_len = *TYPE_LENGTHS.get(camm_type as usize)?;

    let length = 4 + payload_len;
    if length > max_len {
        return None;
    }

    Some(Match{length, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_5_maps_to_24_byte_payload() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 4];
        bytes[2..4].copy_from_slice(&5u16.to_be_bytes());
        let m = recognize(&stats, &bytes, 100).unwrap();
        assert_eq!(m.length, 4 + 24);
    }

    #[test]
    fn rejects_nonzero_reserved_field() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 4];
        bytes[0..2].copy_from_slice(&1u16.to_be_bytes());
        assert!(recognize(&stats, &bytes, 100).is_none());
    }

    #[test]
    fn rejects_out_of_range_type() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 4];
        bytes[2..4].copy_from_slice(&99u16.to_be_bytes());
        assert!(recognize(&stats, &bytes, 100).is_none());
    }
}
