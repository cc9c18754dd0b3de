//! QuickTime text track samples: a leading big-endian u16 text length,
//! optionally followed by a chain of sub-atoms (`encd`, style boxes) that
//! extend past the text itself.

use crate::codec::Match;
use crate::codec_stats::CodecStats;

const MAX_TEXT_LEN: u16 = 4096;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32) -> Option<Match> {
    if start.len() < 2 {
        return None;
    }
    let text_len = u16::from_be_bytes(start[0..2].try_into().ok()?);
    if text_len > MAX_TEXT_LEN {
        return None;
    }

    let mut length = 2u32 + text_len as u32;
    if length > max_len {
        return None;
    }

    while (length as usize) + 8 <= start.len() && (length as usize) + 8 <= max_len as usize {
        let sub_size = u32::from_be_bytes(start[length as usize..length as usize + 4].try_into().ok()?);
        if sub_size < 8 {
            break;
        }
        let next = length + sub_size;
        if next > max_len {
            break;
        }
        length = next;
    }

    Some(Match{length, duration: None, keyframe: true, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_text_sample_has_no_trailing_atoms() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 2];
        bytes[0..2].copy_from_slice(&5u16.to_be_bytes());
        bytes.extend_from_slice(&[b'h', b'e', b'l', b'l', b'o']);
        let m = recognize(&stats, &bytes, bytes.len() as u32).unwrap();
        assert_eq!(m.length, 2 + 5);
    }

    #[test]
    fn includes_trailing_sub_atom_in_length() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 2];
        bytes[0..2].copy_from_slice(&3u16.to_be_bytes());
        bytes.extend_from_slice(b"abc");
        // a trailing 'encd' sub-atom of declared size 12
        bytes.extend_from_slice(&12u32.to_be_bytes());
        bytes.extend_from_slice(b"encd");
        bytes.extend_from_slice(&[0u8; 4]);
        let m = recognize(&stats, &bytes, bytes.len() as u32).unwrap();
        assert_eq!(m.length, bytes.len() as u32);
    }

    #[test]
    fn rejects_text_length_above_cap() {
        let stats = CodecStats::default();
        let mut bytes = vec![0u8; 2];
        bytes[0..2].copy_from_slice(&(MAX_TEXT_LEN + 1).to_be_bytes());
        assert!(recognize(&stats, &bytes, 100).is_none());
    }
}
