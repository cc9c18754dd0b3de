//! AVC1 (H.264) NAL-unit walker.
//!
//! Samples are sequences of length-prefixed NAL units. A picture is the
//! run of NAL units sharing `(frame_num, pic_parameter_set_id,
//! nal_ref_idc, idr_pic_flag)`; the sample ends at the first unit that
//! doesn't belong to the current picture.

use crate::codec::{Match, Oracle, SpsParams};
use crate::codec_stats::CodecStats;
use crate::config::RepairConfig;

const SANITY_CAP: u32 = 8 * 1024 * 1024;

struct SliceInfo {
    frame_num: u32,
    pps_id: u64,
    nal_ref_idc: u8,
    idr: bool,
}

/// Un-escapes `00 00 03` emulation-prevention sequences into `00 00`.
fn strip_emulation_prevention(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut zeros = 0;
    for &b in data {
        if zeros >= 2 && b == 0x03 {
            zeros = 0;
            continue;
        }
        out.push(b);
        zeros = if b == 0 { zeros + 1 } else { 0 };
    }
    out
}

struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self{data, bit_pos: 0}
    }

    fn read_bit(&mut self) -> Option<u8> {
        let byte = *self.data.get(self.bit_pos / 8)?;
        let bit = (byte >> (7 - self.bit_pos % 8)) & 1;
        self.bit_pos += 1;
        Some(bit)
    }

    fn read_bits(&mut self, n: u8) -> Option<u64> {
        let mut value = 0u64;
        for _ in 0..n {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Some(value)
    }

    /// Unsigned exp-Golomb.
    fn read_ue(&mut self) -> Option<u64> {
        let mut leading_zeros = 0;
        while self.read_bit()? == 0 {
            leading_zeros += 1;
            if leading_zeros > 32 {
                return None;
            }
        }
        if leading_zeros == 0 {
            return Some(0);
        }
        let suffix = self.read_bits(leading_zeros)?;
        Some((1u64 << leading_zeros) - 1 + suffix)
    }
}

/// Parses a coded-slice NAL unit's header fields (§4.5.1 step 5) given an
/// oracle-confirmed SPS. Returns `None` on any structural inconsistency.
fn parse_slice(rbsp: &[u8], nal_type: u8, nal_ref_idc: u8, sps: &SpsParams) -> Option<SliceInfo> {
    let mut bits = BitReader::new(rbsp);
    let _first_mb_in_slice = bits.read_ue()?;
    let slice_type = bits.read_ue()?;
    if slice_type > 9 {
        return None;
    }
    let pps_id = bits.read_ue()?;
    let frame_num = bits.read_bits(sps.log2_max_frame_num)? as u32;

    if !sps.frame_mbs_only_flag {
        let field_pic_flag = bits.read_bit()?;
        if field_pic_flag == 1 {
            let _bottom_field_flag = bits.read_bit()?;
        }
    }

    let idr = nal_type == 5;
    if idr {
        let _idr_pic_id = bits.read_ue()?;
    }
    if sps.poc_type == 0 {
        let _poc_lsb = bits.read_bits(sps.log2_max_poc_lsb)?;
    }

    Some(SliceInfo{frame_num, pps_id, nal_ref_idc, idr})
}

fn same_picture(a: &SliceInfo, b: &SliceInfo) -> bool {
    a.frame_num == b.frame_num && a.pps_id == b.pps_id && a.nal_ref_idc == b.nal_ref_idc && a.idr == b.idr
}

pub fn recognize(
    _stats: &CodecStats,
    start: &[u8],
    max_len: u32,
    oracle: &dyn Oracle,
    config: &RepairConfig,
) -> Option<Match> {
    let _ = &config.avc1_strict_checks; // laxness reproduced: no strict checks applied by default

    let sps = oracle.sps_params("avc1").ok()?;

    let mut consumed = 0u32;
    let mut keyframe = false;
    let mut picture: Option<SliceInfo> = None;

    loop {
        let remaining = &start[consumed as usize..];
        if remaining.is_empty() {
            break;
        }
        if remaining.len() < 5 {
            break;
        }
        if remaining[0] != 0 {
            if consumed == 0 {
                return None;
            }
            break;
        }

        let length = u32::from_be_bytes(remaining[0..4].try_into().ok()?);
        if length > SANITY_CAP || consumed + length + 4 > max_len {
            if consumed == 0 {
                return None;
            }
            break;
        }

        let nal_unit = remaining.get(4..4 + length as usize)?;
        let header = *nal_unit.first()?;
        if header & 0x80 != 0 {
            // forbidden_zero_bit set
            if consumed == 0 {
                return None;
            }
            break;
        }
        let nal_ref_idc = (header >> 5) & 0x3;
        let nal_type = header & 0x1F;

        if nal_type == 1 || nal_type == 5 {
            let rbsp = strip_emulation_prevention(&nal_unit[1..]);
            let slice = parse_slice(&rbsp, nal_type, nal_ref_idc, &sps)?;
            match &picture {
                Some(prev) if !same_picture(prev, &slice) => break,
                _ => {}
            }
            if slice.idr {
                keyframe = true;
            }
            picture = Some(slice);
        } else if picture.is_some() {
            // non-slice unit after a slice has been seen starts a new access unit
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

    struct FixedSpsOracle(SpsParams);

    impl Oracle for FixedSpsOracle {
        fn probe(&self, _codec_id: &str, _start: &[u8], _max_bytes: usize) -> Result<OracleProbe, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused in this test".into()))
        }
        fn sps_params(&self, _codec_id: &str) -> Result<SpsParams, SalvageError> {
            Ok(self.0)
        }
        fn is_mp3(&self, _codec_id: &str) -> bool {
            false
        }
    }

    struct NoSpsOracle;

    impl Oracle for NoSpsOracle {
        fn probe(&self, _codec_id: &str, _start: &[u8], _max_bytes: usize) -> Result<OracleProbe, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused in this test".into()))
        }
        fn sps_params(&self, _codec_id: &str) -> Result<SpsParams, SalvageError> {
            Err(SalvageError::OracleUnavailable("no sequence parameter set yet".into()))
        }
        fn is_mp3(&self, _codec_id: &str) -> bool {
            false
        }
    }

    #[test]
    fn recognizes_single_nal_idr_picture() {
        let sps = SpsParams{log2_max_frame_num: 4, frame_mbs_only_flag: true, poc_type: 1, log2_max_poc_lsb: 0};
        let oracle = FixedSpsOracle(sps);
        let config = RepairConfig::default();

        // length-prefixed NAL unit: 4-byte length (2), header 0x65 (nal_ref_idc=3, type=5/IDR),
        // one RBSP byte 0xE1 encoding first_mb(ue=0) slice_type(ue=0) pps_id(ue=0) frame_num(0000) idr_pic_id(ue=0)
        let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x02, 0x65, 0xE1];

        let m = recognize(&CodecStats::default(), bytes, bytes.len() as u32, &oracle, &config).unwrap();
        assert_eq!(m.length, 6);
        assert!(m.keyframe);
    }

    #[test]
    fn rejects_when_oracle_has_no_sps_yet() {
        let config = RepairConfig::default();
        let bytes: &[u8] = &[0x00, 0x00, 0x00, 0x02, 0x65, 0xE1];
        assert!(recognize(&CodecStats::default(), bytes, bytes.len() as u32, &NoSpsOracle, &config).is_none());
    }

    #[test]
    fn rejects_when_first_byte_is_not_a_nal_length_prefix() {
        let sps = SpsParams{log2_max_frame_num: 4, frame_mbs_only_flag: true, poc_type: 1, log2_max_poc_lsb: 0};
        let oracle = FixedSpsOracle(sps);
        let config = RepairConfig::default();
        let bytes: &[u8] = &[0xFF, 0x00, 0x00, 0x02, 0x65, 0xE1];
        assert!(recognize(&CodecStats::default(), bytes, bytes.len() as u32, &oracle, &config).is_none());
    }
}
