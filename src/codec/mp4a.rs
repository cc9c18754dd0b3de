//! MP4A (AAC, or MP3 when framed). Three sub-paths, tried in order:
//! MPEG audio header parsing when the oracle reports MP3, the two
//! device-specific "horrible hack" prefix shortcuts, and finally a raw
//! oracle probe.

use crate::codec::{Match, Oracle};
use crate::codec_stats::CodecStats;
use crate::config::RepairConfig;

const MPEG_BITRATES_L3_V1: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];
const MPEG_SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];

/// Parses a 4-byte MPEG-1 Layer III frame header and returns the frame
/// size in bytes, or `None` if the sync word or any reserved field is
/// invalid.
fn mp3_frame_size(header: &[u8]) -> Option<u32> {
    if header.len() < 4 {
        return None;
    }
    if header[0] != 0xFF || header[1] & 0xE0 != 0xE0 {
        return None;
    }
    let version = (header[1] >> 3) & 0x3;
    let layer = (header[1] >> 1) & 0x3;
    if version != 0x3 || layer != 0x1 {
        // only MPEG-1 Layer III is handled; other variants fall through
        // to the oracle probe
        return None;
    }
    let bitrate_index = (header[2] >> 4) & 0xF;
    let sample_rate_index = (header[2] >> 2) & 0x3;
    let padding = (header[2] >> 1) & 0x1;

    let bitrate = *MPEG_BITRATES_L3_V1.get(bitrate_index as usize)?;
    let sample_rate = *MPEG_SAMPLE_RATES_V1.get(sample_rate_index as usize)?;
    if bitrate == 0 || sample_rate == 0 {
        return None;
    }

    Some(144 * bitrate * 1000 / sample_rate + padding as u32)
}

pub fn recognize(
    _stats: &CodecStats,
    start: &[u8],
    max_len: u32,
    oracle: &dyn Oracle,
    config: &RepairConfig,
) -> Option<Match> {
    if oracle.is_mp3("mp4a") {
        if let Some(length) = mp3_frame_size(start) {
            if length >= 4 && length <= max_len {
                return Some(Match{length, duration: None, keyframe: true, chances: 1.0});
            }
        }
    }

    if start.len() >= 2 {
        let prefix = [start[0], start[1]];
        if config.mp4a_hack_prefixes.contains(&prefix) {
            let probe = oracle.probe("mp4a", start, max_len as usize).ok()?;
            if probe.consumed > 0 {
                return Some(Match{
                    length: probe.consumed as u32,
                    duration: probe.duration_samples,
                    keyframe: true,
                    chances: 0.9,
                });
            }
        }
    }

    let probe = oracle.probe("mp4a", start, max_len as usize).ok()?;
    if probe.consumed <= 6 {
        if probe.consumed == 6 {
            return Some(Match{length: 6, duration: probe.duration_samples, keyframe: true, chances: 0.8});
        }
        return None;
    }

    let chances = if probe.consumed >= 400 { 1.0 } else { 0.5 };
    Some(Match{
        length: probe.consumed as u32,
        duration: probe.duration_samples,
        keyframe: true,
        chances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{OracleProbe, SpsParams};
    use crate::errors::SalvageError;

    struct StubOracle {
        is_mp3: bool,
        probe: OracleProbe,
    }
    impl Oracle for StubOracle {
        fn probe(&self, _: &str, _: &[u8], _: usize) -> Result<OracleProbe, SalvageError> {
            Ok(self.probe)
        }
        fn sps_params(&self, _: &str) -> Result<SpsParams, SalvageError> {
            Err(SalvageError::OracleUnavailable("unused".into()))
        }
        fn is_mp3(&self, _: &str) -> bool {
            self.is_mp3
        }
    }

    #[test]
    fn parses_mpeg1_layer3_header_directly() {
        // MPEG-1, Layer III, bitrate index 9 (128kbps), sample rate index 0 (44100Hz)
        let header = [0xFFu8, 0xF7, 0x90, 0x00];
        let oracle = StubOracle{is_mp3: true, probe: OracleProbe::default()};
        let config = RepairConfig::default();
        let m = recognize(&CodecStats::default(), &header, 1000, &oracle, &config).unwrap();
        assert_eq!(m.length, 418);
    }

    #[test]
    fn device_hack_prefix_takes_priority_over_raw_probe() {
        let mut bytes = vec![0xEE, 0x1B];
        bytes.extend_from_slice(&[0u8; 30]);
        let oracle = StubOracle{is_mp3: false, probe: OracleProbe{consumed: 32, duration_samples: Some(1024), keyframe: None}};
        let config = RepairConfig::default();
        let m = recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle, &config).unwrap();
        assert_eq!(m.length, 32);
        assert_eq!(m.chances, 0.9);
    }

    #[test]
    fn raw_probe_path_is_high_confidence_above_400_bytes() {
        let bytes = vec![0u8; 500];
        let oracle = StubOracle{is_mp3: false, probe: OracleProbe{consumed: 450, duration_samples: None, keyframe: None}};
        let config = RepairConfig::default();
        let m = recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle, &config).unwrap();
        assert_eq!(m.chances, 1.0);
    }

    #[test]
    fn raw_probe_of_exactly_six_bytes_is_lower_confidence() {
        let bytes = vec![0u8; 10];
        let oracle = StubOracle{is_mp3: false, probe: OracleProbe{consumed: 6, duration_samples: None, keyframe: None}};
        let config = RepairConfig::default();
        let m = recognize(&CodecStats::default(), &bytes, bytes.len() as u32, &oracle, &config).unwrap();
        assert_eq!(m.length, 6);
        assert_eq!(m.chances, 0.8);
    }
}
