//! ALAC (Apple Lossless). The oracle decodes a single compressed frame
//! and reports how many bits of the input it consumed; the sample
//! length is that bit index rounded up to the next byte. Frames shorter
//! than 12 bytes are rejected as implausible.

use crate::codec::{Match, Oracle};
use crate::codec_stats::CodecStats;

const MIN_FRAME_LEN: u32 = 12;

pub fn recognize(_stats: &CodecStats, start: &[u8], max_len: u32, oracle: &dyn Oracle) -> Option<Match> {
    let probe = oracle.probe("alac", start, max_len as usize).ok()?;
    let length = probe.consumed as u32;
    if length < MIN_FRAME_LEN || length > max_len {
        return None;
    }

    Some(Match{length, duration: probe.duration_samples, keyframe: true, chances: 1.0})
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
    fn uses_oracle_reported_consumed_bytes() {
        let oracle = FixedProbeOracle(OracleProbe{consumed: 64, duration_samples: Some(4096), keyframe: None});
        let m = recognize(&CodecStats::default(), &[0u8; 64], 64, &oracle).unwrap();
        assert_eq!(m.length, 64);
        assert_eq!(m.duration, Some(4096));
    }

    #[test]
    fn rejects_implausibly_short_frame() {
        let oracle = FixedProbeOracle(OracleProbe{consumed: 4, duration_samples: None, keyframe: None});
        assert!(recognize(&CodecStats::default(), &[0u8; 64], 64, &oracle).is_none());
    }
}
