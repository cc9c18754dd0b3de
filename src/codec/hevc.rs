//! HEV1/HVC1 (H.265) NAL-unit walker. Same length-prefix framing as
//! AVC1, but a two-byte NAL header and a different picture-boundary
//! rule: a picture ends when a subsequent slice's
//! `first_slice_segment_in_pic_flag` is set, `nuh_layer_id` changes, or
//! a non-slice/non-filler unit appears.

use crate::codec::{Match, Oracle};
use crate::codec_stats::CodecStats;

const SANITY_CAP: u32 = 8 * 1024 * 1024;
const EOB_NUT: u8 = 37;

fn is_slice_type(nal_type: u8) -> bool {
    nal_type <= 31
}

fn is_idr(nal_type: u8) -> bool {
    nal_type == 19 || nal_type == 20 // IDR_W_RADL, IDR_N_LP
}

/// First bit of a slice segment's RBSP: `first_slice_segment_in_pic_flag`.
fn first_slice_segment_flag(rbsp_first_byte: u8) -> bool {
    rbsp_first_byte & 0x80 != 0
}

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32, _oracle: &dyn Oracle) -> Option<Match> {
    let mut consumed = 0u32;
    let mut keyframe = false;
    let mut layer_id: Option<u8> = None;
    let mut seen_slice = false;

    loop {
        let remaining = &start[consumed as usize..];
        if remaining.len() < 6 {
            break;
        }
        if remaining[0] != 0 {
            if consumed == 0 {
                return None;
            }
            break;
        }

        let length = u32::from_be_bytes(remaining[0..4].try_into().ok()?);
        if length > SANITY_CAP || consumed + length + 4 > max_len || length < 2 {
            if consumed == 0 {
                return None;
            }
            break;
        }

        let nal_unit = remaining.get(4..4 + length as usize)?;
        let forbidden_zero_bit = nal_unit[0] & 0x80 != 0;
        if forbidden_zero_bit {
            if consumed == 0 {
                return None;
            }
            break;
        }
        let nal_type = (nal_unit[0] >> 1) & 0x3F;
        let nuh_layer_id = ((nal_unit[0] & 0x1) << 5) | (nal_unit[1] >> 3);
        let temporal_id_plus1 = nal_unit[1] & 0x7;

        if (nal_type == EOB_NUT) != (temporal_id_plus1 == 0) {
            if consumed == 0 {
                return None;
            }
            break;
        }

        if is_slice_type(nal_type) {
            let rbsp_first = *nal_unit.get(2)?;
            let starts_new_picture = first_slice_segment_flag(rbsp_first);
            if seen_slice && (starts_new_picture || Some(nuh_layer_id) != layer_id) {
                break;
            }
            if is_idr(nal_type) {
                keyframe = true;
            }
            seen_slice = true;
            layer_id = Some(nuh_layer_id);
        } else if seen_slice {
            break;
        }

        consumed += 4 + length;
    }

    if consumed == 0 {
        return None;
    }

    Some(Match{length: consumed, duration: None, keyframe, chances: 1.0})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OracleProbe;
    use crate::errors::SalvageError;

    struct NullOracle;
    impl Oracle for NullOracle {
        fn probe(&self, _: &str, _: &[u8], _: usize) -> Result<OracleProbe, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused".into()))
        }
        fn sps_params(&self, _: &str) -> Result<crate::codec::SpsParams, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused".into()))
        }
        fn is_mp3(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn recognizes_single_idr_slice_segment() {
        // nal_type=19 (IDR_W_RADL), layer_id=0, temporal_id_plus1=1,
        // first_slice_segment_in_pic_flag=1
        let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x03, 0x26, 0x01, 0x80];
        let m = recognize(&CodecStats::default(), bytes, bytes.len() as u32, &NullOracle).unwrap();
        assert_eq!(m.length, 7);
        assert!(m.keyframe);
    }

    #[test]
    fn rejects_forbidden_zero_bit_set() {
        let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x03, 0xA6, 0x01, 0x80];
        assert!(recognize(&CodecStats::default(), bytes, bytes.len() as u32, &NullOracle).is_none());
    }
}
