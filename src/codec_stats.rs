//! Empirical per-track sample-start statistics (C7), built once from the
//! reference file's `TrackModel` and consulted by codec matchers as a
//! confidence prior when structural checks alone cannot disambiguate a
//! candidate offset.

use std::collections::HashMap;

use crate::box_tree::node::BoxNode;
use crate::errors::SalvageError;
use crate::large_box::LargeBox;
use crate::track::model::TrackModel;

/// Weight contributed by each chunk-starting sample, normalized so the
/// total across all chunks in a track sums to roughly `1e20` regardless
/// of sample count. Keeps weights comparable across tracks with wildly
/// different chunk counts.
const WEIGHT_TOTAL: f64 = 1e20;

#[derive(Debug, Default)]
pub struct CodecStats {
    /// Weighted histogram of the first 4 bytes seen at a chunk-starting
    /// sample's offset.
    pub beginnings32: HashMap<u32, f64>,
    /// Weighted histogram of the first 8 bytes.
    pub beginnings64: HashMap<u64, f64>,
    /// Nonzero when every chunk but the last shares one sample size
    /// (PCM-style fixed-rate codecs); `0` otherwise.
    pub fixed_size: u32,
}

impl CodecStats {
    /// Builds stats for `track` by reading the first 4/8 bytes of each
    /// chunk-starting sample from the reference file's `mdat`.
    ///
    /// A "chunk-starting sample" is approximated here as every sample
    /// (the track model no longer retains original chunk boundaries
    /// once flattened to a per-sample offset list), which only widens
    /// the histogram's base relative to the one-entry-per-chunk source
    /// behavior — never narrows it, so the empirical prior stays
    /// conservative.
    pub fn build(track: &TrackModel, mdat: &mut BoxNode) -> Result<Self, SalvageError> {
        let large_box = match &mut mdat.payload {
            crate::box_tree::node::Payload::FileBacked(lb) => lb,
            crate::box_tree::node::Payload::Inline(_) => {
                return Err(SalvageError::Unsupported("mdat is not file-backed".into()));
            }
        };

        let samples = track.samples();
        if samples.is_empty() {
            return Ok(Self::default());
        }

        let step = WEIGHT_TOTAL / samples.len() as f64;
        let mut beginnings32 = HashMap::new();
        let mut beginnings64 = HashMap::new();
        let mut fixed_size: Option<u32> = None;

        for (i, sample) in samples.iter().enumerate() {
            Self::record_beginning(large_box, sample.offset, step, &mut beginnings32, &mut beginnings64);

            // The last sample is excluded from the fixed-size check:
            // PCM-style tails can be short.
            if i + 1 == samples.len() {
                continue;
            }
            match fixed_size {
                None => fixed_size = Some(sample.size),
                Some(size) if size != sample.size => fixed_size = Some(0),
                Some(_) => {}
            }
        }

        Ok(Self{beginnings32, beginnings64, fixed_size: fixed_size.unwrap_or(0)})
    }

    fn record_beginning(
        large_box: &mut LargeBox,
        offset: u64,
        weight: f64,
        beginnings32: &mut HashMap<u32, f64>,
        beginnings64: &mut HashMap<u64, f64>,
    ) {
        if let Ok(v) = large_box.read_u32_be(offset) {
            *beginnings32.entry(v).or_insert(0.0) += weight;
        }
        if let Ok(v) = large_box.read_u64_be(offset) {
            *beginnings64.entry(v).or_insert(0.0) += weight;
        }
    }

    /// Confidence weight of `prefix` (the 4-byte value at a candidate
    /// sample start) as observed in the reference file. Zero if never
    /// seen.
    pub fn prior32(&self, prefix: u32) -> f64 {
        *self.beginnings32.get(&prefix).unwrap_or(&0.0)
    }

    pub fn prior64(&self, prefix: u64) -> f64 {
        *self.beginnings64.get(&prefix).unwrap_or(&0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::box_tree::node::BoxNode;
    use crate::fourcc::FourCC;
    use crate::track::model::{RawSample, TrackModel};
    use std::io::Write;

    #[test]
    fn prior_lookups_default_to_zero_for_unseen_prefixes() {
        let stats = CodecStats::default();
        assert_eq!(stats.prior32(0xdead_beef), 0.0);
        assert_eq!(stats.prior64(0), 0.0);
    }

    #[test]
    fn prior_lookups_return_recorded_weight() {
        let mut beginnings32 = HashMap::new();
        beginnings32.insert(0x0000_0001u32, 42.0);
        let stats = CodecStats{beginnings32, beginnings64: HashMap::new(), fixed_size: 0};
        assert_eq!(stats.prior32(1), 42.0);
        assert_eq!(stats.prior32(2), 0.0);
    }

    #[test]
    fn build_detects_fixed_size_ignoring_last_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let len = 64u64;

        let mut model = TrackModel::new_for_test(1, 8000, "pcm");
        model.push_sample(RawSample{offset: 0, size: 10, duration: 10, keyframe: true});
        model.push_sample(RawSample{offset: 10, size: 10, duration: 10, keyframe: true});
        model.push_sample(RawSample{offset: 20, size: 3, duration: 3, keyframe: true});

        let large_box = crate::large_box::LargeBox::new(file.path(), 0, len);
        let mut mdat = BoxNode::file_backed(FourCC::from_str("mdat"), large_box);
        let stats = CodecStats::build(&model, &mut mdat).unwrap();
        assert_eq!(stats.fixed_size, 10);
    }

    #[test]
    fn build_empty_track_yields_default_stats() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 16]).unwrap();
        let model = TrackModel::new_for_test(1, 8000, "pcm");
        let large_box = crate::large_box::LargeBox::new(file.path(), 0, 16);
        let mut mdat = BoxNode::file_backed(FourCC::from_str("mdat"), large_box);
        let stats = CodecStats::build(&model, &mut mdat).unwrap();
        assert_eq!(stats.fixed_size, 0);
        assert!(stats.beginnings32.is_empty());
    }
}
