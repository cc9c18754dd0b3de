//! AMR-NB (`samr`). The first byte's top nibble (bits 3-6) is the frame
//! type/mode; a 16-entry lookup maps mode to packed frame size including
//! the 1-byte header. Mode > 9 or a missing framing bit is rejected.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

/// Packed frame size in bytes (header included) for AMR-NB modes 0-15.
/// Modes 10-15 include SID/NO_DATA and reserved codes; only 0-9 are
/// accepted speech modes, but the table covers the full range for the
/// reject check below.
const MODE_SIZES: [u32; 16] = [13, 14, 16, 18, 20, 21, 27, 32, 6, 6, 6, 6, 1, 1, 1, 1];

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    let header = *start.first()?;
    let framing_bit = (header >> 2) & 0x1;
    if framing_bit == 0 {
        return None;
    }
    let mode = (header >> 3) & 0xF;
    if mode > 9 {
        return None;
    }

    let length = MODE_SIZES[mode as usize];
    if length > max_len {
        return None;
    }

    Some(Match{length, duration: Some(160), keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_2_maps_to_16_byte_frame() {
        let stats = CodecStats::default();
        let header = (2u8 << 3) | 0b100; // mode 2, framing bit set
        let m = recognize(&stats, &[header], 100).unwrap();
        assert_eq!(m.length, 16);
        assert_eq!(m.duration, Some(160));
    }

    #[test]
    fn rejects_missing_framing_bit() {
        let stats = CodecStats::default();
        let header = 2u8 << 3;
        assert!(recognize(&stats, &[header], 100).is_none());
    }

    #[test]
    fn rejects_mode_above_9() {
        let stats = CodecStats::default();
        let header = (10u8 << 3) | 0b100;
        assert!(recognize(&stats, &[header], 100).is_none());
    }
}
