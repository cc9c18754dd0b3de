//! Track model (C5): a codec-agnostic view of a single `trak`'s sample
//! table, built once from the reference file's box tree and able to grow
//! with newly recovered samples during repair, then serialize itself
//! back into `stsz`/`stco`-or-`co64`/`stsc`/`stts` box payloads.
//!
//! Generalizes `track::offset::SampleOffsets::new`, which already zips
//! `stts` + `stsz` + chunk offsets derived from `stsc`/`stco`/`co64` via
//! `rayon::into_par_iter()`. The difference: that function produces a
//! read-only `Vec<SampleOffset>` for an already-healthy file, while
//! `TrackModel` also accepts appended samples and re-encodes the sample
//! tables for a repaired file.

use std::io::Cursor;

use binrw::BinReaderExt;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::atom_types::{Co64, Hdlr, Mdhd, Stco, Stsc, Stsd, Stsz, Stts, Tkhd};
use crate::box_tree::node::BoxNode;
use crate::errors::SalvageError;
use crate::fourcc::FourCC;

/// One sample's position, size, duration (in the track's own timescale)
/// and whether it is a sync/keyframe.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub offset: u64,
    pub size: u32,
    pub duration: u32,
    pub keyframe: bool,
}

/// Codec-agnostic sample table for a single track, built from `trak` and
/// mutable afterwards (repair appends reconstructed samples).
#[derive(Debug, Clone)]
pub struct TrackModel {
    track_id: u32,
    timescale: u32,
    /// The track's handler sub-type (`vide`, `soun`, `hint`, `tmcd`, ...),
    /// as declared in `hdlr`.
    pub handler_type: String,
    /// Four-character code of the track's single sample description entry
    /// (`avc1`, `mp4a`, `samr`, ...). Multiplexed (multi-entry) `stsd` is
    /// rejected at build time; see `MultiplexedUnsupported`.
    pub codec: String,
    /// Raw `stsd` payload bytes (version/flags/entry-count/description),
    /// handed to the codec recognizer so it can read codec-specific
    /// configuration boxes (`avcC`, `hvcC`, `esds`, ...) without this
    /// module needing to understand every codec's private atoms.
    stsd_bytes: Vec<u8>,
    samples: Vec<RawSample>,
}

/// Raw `stss` entry is a single big-endian `u32` sample number, 1-based.
/// `atom_types::Stss` guesses a `[u16; 2]` layout instead (an unresolved
/// question in that module); this reads the atom fresh rather than
/// reusing that guess.
fn parse_keyframes(bytes: &[u8]) -> Result<Vec<u32>, SalvageError> {
    if bytes.len() < 8 {
        return Err(SalvageError::BadBox{offset: 0, reason: "stss shorter than header".into()});
    }
    let count = u32::from_be_bytes(bytes[4..8].try_into().unwrap()) as usize;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let start = 8 + i * 4;
        let entry = bytes.get(start..start + 4)
            .ok_or_else(|| SalvageError::BadBox{offset: start as u64, reason: "stss table truncated".into()})?;
        // convert 1-based sample numbers to 0-based indices
        out.push(u32::from_be_bytes(entry.try_into().unwrap()).saturating_sub(1));
    }
    Ok(out)
}

fn parse_atom<T>(bytes: &[u8]) -> Result<T, SalvageError>
where
    T: binrw::BinRead,
    for<'a> T::Args<'a>: Default,
{
    let mut cursor = Cursor::new(bytes);
    Ok(cursor.read_be::<T>()?)
}

impl TrackModel {
    /// Builds a `TrackModel` from a `trak` box node, per the nine-step
    /// process: tkhd (track id), mdhd (timescale), stsd (single-entry
    /// codec), stts (expand to per-sample durations), stss (zero-based
    /// keyframes), stsz (default size or per-sample sizes), stco/co64
    /// (chunk offsets), stsc (expand to per-chunk sample counts), then
    /// reassemble into per-sample offsets.
    pub fn build(trak: &BoxNode) -> Result<Self, SalvageError> {
        let tkhd_node = trak.find_first("tkhd")
            .ok_or_else(|| SalvageError::MissingHeader("tkhd".into()))?;
        let tkhd: Tkhd = parse_atom(tkhd_node.inline_bytes()?)?;

        let mdhd_node = trak.find_first("mdhd")
            .ok_or_else(|| SalvageError::MissingHeader("mdhd".into()))?;
        let mdhd: Mdhd = parse_atom(mdhd_node.inline_bytes()?)?;

        let hdlr_node = trak.find_first("hdlr")
            .ok_or_else(|| SalvageError::MissingHeader("hdlr".into()))?;
        let hdlr: Hdlr = parse_atom(hdlr_node.inline_bytes()?)?;
        let handler_type = hdlr.component_sub_type();

        let stsd_node = trak.find_first("stsd")
            .ok_or_else(|| SalvageError::MissingHeader("stsd".into()))?;
        let stsd_bytes = stsd_node.inline_bytes()?.to_vec();
        let stsd: Stsd = parse_atom(&stsd_bytes)?;
        if stsd.descriptions().len() != 1 {
            return Err(SalvageError::MultiplexedUnsupported{
                track_id: tkhd.track_id(),
                entries: stsd.descriptions().len() as u32,
            });
        }
        let codec = stsd.descriptions()[0].data_format_string();

        let stts_node = trak.find_first("stts")
            .ok_or_else(|| SalvageError::MissingHeader("stts".into()))?;
        let stts: Stts = parse_atom(stts_node.inline_bytes()?)?;
        let durations = stts.durations();

        let keyframes: Vec<u32> = match trak.find_first("stss") {
            Some(n) => parse_keyframes(n.inline_bytes()?)?,
            None => Vec::new(), // absent stss means every sample is a sync sample
        };

        let stsz_node = trak.find_first("stsz")
            .ok_or_else(|| SalvageError::MissingHeader("stsz".into()))?;
        let stsz: Stsz = parse_atom(stsz_node.inline_bytes()?)?;
        let sizes: Vec<u32> = if stsz.sample_size() != 0 {
            vec![stsz.sample_size(); durations.len()]
        } else {
            stsz.sizes().to_vec()
        };

        let chunk_offsets: Vec<u64> = if let Some(co64_node) = trak.find_first("co64") {
            let co64: Co64 = parse_atom(co64_node.inline_bytes()?)?;
            co64.offsets().to_vec()
        } else if let Some(stco_node) = trak.find_first("stco") {
            let stco: Stco = parse_atom(stco_node.inline_bytes()?)?;
            Co64::from_stco(stco).offsets().to_vec()
        } else {
            return Err(SalvageError::MissingHeader("stco/co64".into()));
        };

        let stsc_node = trak.find_first("stsc")
            .ok_or_else(|| SalvageError::MissingHeader("stsc".into()))?;
        let stsc: Stsc = parse_atom(stsc_node.inline_bytes()?)?;

        let samples_per_chunk: Vec<u32> = (1..=chunk_offsets.len())
            .into_par_iter()
            .map(|chunk_index| stsc.no_of_samples(chunk_index)
                .ok_or(SalvageError::BadBox{offset: 0, reason: format!("stsc has no entry covering chunk {chunk_index}")}))
            .collect::<Result<Vec<u32>, SalvageError>>()?;

        let offsets: Vec<u64> = chunk_offsets.iter()
            .zip(samples_per_chunk.iter())
            .scan(0usize, |sample_cursor, (chunk_offset, n)| {
                let start = *sample_cursor;
                *sample_cursor += *n as usize;
                let chunk_sizes = sizes.get(start..*sample_cursor).unwrap_or(&[]);
                let mut delta = 0u64;
                let mut chunk_sample_offsets = Vec::with_capacity(chunk_sizes.len());
                for size in chunk_sizes {
                    chunk_sample_offsets.push(*chunk_offset + delta);
                    delta += *size as u64;
                }
                Some(chunk_sample_offsets)
            })
            .flatten()
            .collect();

        if offsets.len() != durations.len() || offsets.len() != sizes.len() {
            return Err(SalvageError::BadBox{
                offset: 0,
                reason: format!(
                    "sample table length mismatch: {} offsets, {} durations, {} sizes",
                    offsets.len(), durations.len(), sizes.len(),
                ),
            });
        }

        let samples = offsets.into_iter()
            .zip(sizes)
            .zip(durations)
            .enumerate()
            .map(|(i, ((offset, size), duration))| RawSample{
                offset,
                size,
                duration,
                keyframe: keyframes.is_empty() || keyframes.contains(&(i as u32)),
            })
            .collect();

        Ok(Self{track_id: tkhd.track_id(), timescale: mdhd.time_scale(), handler_type, codec, stsd_bytes, samples})
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    pub fn timescale(&self) -> u32 {
        self.timescale
    }

    pub fn stsd_bytes(&self) -> &[u8] {
        &self.stsd_bytes
    }

    pub fn samples(&self) -> &[RawSample] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [RawSample] {
        &mut self.samples
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Discards every sample beyond `n` (repair stage 2: only samples
    /// whose byte range is fully recoverable from the truncated `mdat`
    /// survive).
    pub fn truncate_to(&mut self, n: usize) {
        self.samples.truncate(n);
    }

    /// Appends a sample recovered during repair.
    pub fn push_sample(&mut self, sample: RawSample) {
        self.samples.push(sample);
    }

    /// A copy of this model with its sample table cleared, keeping
    /// `track_id`/`timescale`/`codec`/`stsd_bytes` (repair stage 2: start
    /// from the reference's track shape, rebuild its samples from scratch).
    pub fn emptied(&self) -> Self {
        let mut clone = self.clone();
        clone.samples.clear();
        clone
    }

    /// Unscaled track duration given the current sample list. AMR
    /// (`samr`) is a fixed-rate codec whose frames are always 160 time
    /// units regardless of what `stts` or a recognizer measured, so it
    /// gets its own case; everything else sums each sample's own
    /// duration (falling back to a uniform default when every sample so
    /// far shares one duration, which is the common case).
    pub fn fix_times(&self) -> u32 {
        if self.codec == "samr" {
            return 160 * self.samples.len() as u32;
        }
        let uniform = self.samples.first().map(|s| s.duration);
        if uniform.is_some() && self.samples.iter().all(|s| Some(s.duration) == uniform) {
            uniform.unwrap_or(0) * self.samples.len() as u32
        } else {
            self.samples.iter().map(|s| s.duration).sum()
        }
    }

    /// Serializes the current sample list back into `stsz`, `co64`
    /// (chunk offsets always migrate to 64-bit on write-back, since a
    /// repaired file's `mdat` size is whatever survived and may no
    /// longer fit the 32-bit `stco` range), `stsc`, and `stts` box
    /// payloads (`BoxNode::leaf`, one sample per chunk for simplicity:
    /// the reconstructed file does not need to preserve the reference's
    /// original chunking, only valid, tiling offsets).
    ///
    /// `mdat_offset_base` is the absolute file offset of the first byte
    /// of `mdat`'s payload; each sample's window-relative `offset` is
    /// added to it so `co64` stores absolute file positions (§6).
    pub fn to_stbl_boxes(&self, mdat_offset_base: u64) -> (BoxNode, BoxNode, BoxNode, BoxNode) {
        let stsz = {
            let mut bytes = vec![0u8; 12];
            bytes[4..8].copy_from_slice(&0u32.to_be_bytes()); // sample_size == 0: explicit sizes follow
            bytes[8..12].copy_from_slice(&(self.samples.len() as u32).to_be_bytes());
            for sample in &self.samples {
                bytes.extend_from_slice(&sample.size.to_be_bytes());
            }
            BoxNode::leaf(FourCC::from_str("stsz"), bytes)
        };

        let co64 = {
            let mut bytes = vec![0u8; 8];
            bytes[4..8].copy_from_slice(&(self.samples.len() as u32).to_be_bytes());
            for sample in &self.samples {
                bytes.extend_from_slice(&(mdat_offset_base + sample.offset).to_be_bytes());
            }
            BoxNode::leaf(FourCC::from_str("co64"), bytes)
        };

        // One sample per chunk: a single sample-to-chunk entry covers
        // the whole track (`first_chunk = 1, samples_per_chunk = 1`).
        let stsc = {
            let mut bytes = vec![0u8; 8];
            bytes[4..8].copy_from_slice(&1u32.to_be_bytes());
            bytes.extend_from_slice(&1u32.to_be_bytes()); // first_chunk
            bytes.extend_from_slice(&1u32.to_be_bytes()); // samples_per_chunk
            bytes.extend_from_slice(&1u32.to_be_bytes()); // sample_description_id
            BoxNode::leaf(FourCC::from_str("stsc"), bytes)
        };

        // Run-length encode consecutive identical durations.
        let stts = {
            let mut runs: Vec<(u32, u32)> = Vec::new();
            for sample in &self.samples {
                match runs.last_mut() {
                    Some((count, duration)) if *duration == sample.duration => *count += 1,
                    _ => runs.push((1, sample.duration)),
                }
            }
            let mut bytes = vec![0u8; 8];
            bytes[4..8].copy_from_slice(&(runs.len() as u32).to_be_bytes());
            for (count, duration) in runs {
                bytes.extend_from_slice(&count.to_be_bytes());
                bytes.extend_from_slice(&duration.to_be_bytes());
            }
            BoxNode::leaf(FourCC::from_str("stts"), bytes)
        };

        (stsz, co64, stsc, stts)
    }

    /// Builds a bare `TrackModel` for tests that exercise sample-table
    /// logic (`fix_times`, `to_stbl_boxes`, `CodecStats`/`Repairer`
    /// scanning) without a full `trak` box tree to parse.
    #[cfg(test)]
    pub(crate) fn new_for_test(track_id: u32, timescale: u32, codec: &str) -> Self {
        Self {
            track_id,
            timescale,
            handler_type: "soun".into(),
            codec: codec.into(),
            stsd_bytes: Vec::new(),
            samples: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(offset: u64, size: u32, duration: u32, keyframe: bool) -> RawSample {
        RawSample{offset, size, duration, keyframe}
    }

    #[test]
    fn fix_times_samr_forces_fixed_rate() {
        let mut model = TrackModel::new_for_test(1, 8000, "samr");
        model.push_sample(sample(0, 13, 999, true));
        model.push_sample(sample(13, 13, 12, true));
        assert_eq!(model.fix_times(), 160 * 2);
    }

    #[test]
    fn fix_times_collapses_to_uniform_default() {
        let mut model = TrackModel::new_for_test(1, 90_000, "avc1");
        for i in 0..5 {
            model.push_sample(sample(i * 100, 100, 3000, true));
        }
        assert_eq!(model.fix_times(), 3000 * 5);
    }

    #[test]
    fn fix_times_sums_varying_durations() {
        let mut model = TrackModel::new_for_test(1, 90_000, "avc1");
        model.push_sample(sample(0, 100, 3000, true));
        model.push_sample(sample(100, 100, 1500, false));
        model.push_sample(sample(200, 100, 4500, false));
        assert_eq!(model.fix_times(), 3000 + 1500 + 4500);
    }

    #[test]
    fn to_stbl_boxes_run_length_encodes_stts() {
        let mut model = TrackModel::new_for_test(1, 90_000, "avc1");
        model.push_sample(sample(0, 50, 100, true));
        model.push_sample(sample(50, 60, 100, false));
        model.push_sample(sample(110, 70, 200, false));

        let (stsz, co64, stsc, stts) = model.to_stbl_boxes(0);
        assert_eq!(stsz.inline_bytes().unwrap()[8..12], 3u32.to_be_bytes());
        assert_eq!(co64.inline_bytes().unwrap().len(), 8 + 3 * 8);
        assert_eq!(stsc.inline_bytes().unwrap()[4..8], 1u32.to_be_bytes());
        // two runs: (2, 100) then (1, 200)
        assert_eq!(stts.inline_bytes().unwrap()[4..8], 2u32.to_be_bytes());
    }

    #[test]
    fn to_stbl_boxes_adds_mdat_offset_base_to_each_sample() {
        let mut model = TrackModel::new_for_test(1, 90_000, "avc1");
        model.push_sample(sample(0, 50, 100, true));
        model.push_sample(sample(50, 60, 100, false));

        let (_, co64, _, _) = model.to_stbl_boxes(1000);
        let bytes = co64.inline_bytes().unwrap();
        let first = u64::from_be_bytes(bytes[8..16].try_into().unwrap());
        let second = u64::from_be_bytes(bytes[16..24].try_into().unwrap());
        assert_eq!(first, 1000);
        assert_eq!(second, 1050);
    }

    #[test]
    fn parse_keyframes_converts_one_based_to_zero_based() {
        let mut bytes = vec![0u8; 8];
        bytes[4..8].copy_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&4u32.to_be_bytes());
        let keyframes = parse_keyframes(&bytes).unwrap();
        assert_eq!(keyframes, vec![0, 3]);
    }
}
