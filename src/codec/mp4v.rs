//! MP4V (MPEG-4 Part 2). Samples begin with a start code identifying a
//! VOP (Video Object Plane); the oracle supplies the actual frame
//! length since MPEG-4 Part 2 bitstreams have no length prefix.

use crate::codec::{Match, Oracle};
use crate::codec_stats::CodecStats;

const VOP_I_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB3];
const VOP_P_START_CODE: [u8; 4] = [0x00, 0x00, 0x01, 0xB6];

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32, oracle: &dyn Oracle) -> Option<Match> {
    if start.len() < 4 {
        return None;
    }
    let prefix: [u8; 4] = start[0..4].try_into().ok()?;
    let keyframe = match prefix {
        p if p == VOP_I_START_CODE => true,
        p if p == VOP_P_START_CODE => false,
        _ => return None,
    };

    let probe = oracle.probe("mp4v", start, max_len as usize).ok()?;
    if probe.consumed == 0 || probe.consumed as u32 > max_len {
        return None;
    }

    Some(Match{
        length: probe.consumed as u32,
        duration: probe.duration_samples,
        keyframe: probe.keyframe.unwrap_or(keyframe),
        chances: 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{OracleProbe, SpsParams};
    use crate::errors::SalvageError;

    struct FixedProbeOracle(OracleProbe);
    impl Oracle for FixedProbeOracle {
        fn probe(&self, _: &str, _: &[u8], _: usize) -> Result<OracleProbe, SalvageError> {
            Ok(self.0)
        }
        fn sps_params(&self, _: &str) -> Result<SpsParams, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused".into()))
        }
        fn is_mp3(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn i_vop_start_code_is_a_keyframe() {
        let oracle = FixedProbeOracle(OracleProbe{consumed: 20, duration_samples: Some(1), keyframe: None});
        let mut bytes = vec![0x00, 0x00, 0x01, 0xB3];
        bytes.extend_from_slice(&[0u8; 16]);
        let m = recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle).unwrap();
        assert!(m.keyframe);
        assert_eq!(m.length, 20);
    }

    #[test]
    fn p_vop_start_code_is_not_a_keyframe() {
        let oracle = FixedProbeOracle(OracleProbe{consumed: 10, duration_samples: None, keyframe: None});
        let mut bytes = vec![0x00, 0x00, 0x01, 0xB6];
        bytes.extend_from_slice(&[0u8; 6]);
        let m = recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle).unwrap();
        assert!(!m.keyframe);
    }

    #[test]
    fn rejects_unrecognized_start_code() {
        let oracle = FixedProbeOracle(OracleProbe{consumed: 10, duration_samples: None, keyframe: None});
        let bytes = vec![0x00, 0x00, 0x01, 0x00, 0, 0, 0, 0, 0, 0];
        assert!(recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle).is_none());
    }
}
