//! The orchestrator (C8): locates the damaged file's `mdat` payload,
//! walks it offset by offset consulting every track's codec recognizer,
//! and finally rewrites the reference container around the reconstructed
//! sample tables.
//!
//! Grounded in `mp4iter::Mp4`/`mp4iter::offset` for the overall shape of
//! "read a reference file's tree, derive per-track sample tables, write a
//! new container" — generalized here from a read-only reporting tool
//! into one that also scans an unindexed `mdat` and appends recovered
//! samples before writing.

use std::path::Path;

use log::{debug, info, warn};

use crate::box_tree::node::BoxNode;
use crate::box_tree::BoxTree;
use crate::codec::{self, Oracle};
use crate::codec_stats::CodecStats;
use crate::config::RepairConfig;
use crate::consts::{MAX_FRAME, PRUNE_ON_REPAIR};
use crate::errors::SalvageError;
use crate::fourcc::FourCC;
use crate::large_box::LargeBox;
use crate::track::model::{RawSample, TrackModel};

/// Converts `duration` (in `from_scale` units) into `to_scale` units,
/// rounding up. Grounded in the reference implementation's
/// `ceil(track.duration * movie_timescale / track.timescale)`.
fn scale_duration(duration: u32, from_scale: u32, to_scale: u32) -> u32 {
    if from_scale == 0 {
        return 0;
    }
    let scaled = (duration as u64 * to_scale as u64 + from_scale as u64 - 1) / from_scale as u64;
    scaled.min(u32::MAX as u64) as u32
}

/// Per-track working state during stage 2: the sample table being rebuilt,
/// its empirical stats, and an accumulator for oracle-reported audio
/// sample durations (installed as `times` only if every sample got one).
struct TrackState {
    model: TrackModel,
    stats: CodecStats,
    audio_durations: Vec<u32>,
}

/// Drives repair of `damaged_path` against the already-parsed `reference`
/// tree, writing the reconstructed container to `output_path`.
pub struct Repairer<'a> {
    reference: BoxTree,
    config: RepairConfig,
    oracle: &'a dyn Oracle,
}

impl<'a> Repairer<'a> {
    pub fn new(reference: BoxTree, oracle: &'a dyn Oracle, config: RepairConfig) -> Self {
        Self{reference, config, oracle}
    }

    pub fn repair(mut self, damaged_path: &Path, output_path: &Path) -> Result<(), SalvageError> {
        let mut states = self.build_track_states()?;

        let damaged_mdat = Self::locate_mdat(damaged_path)?;
        let recovered = self.scan(damaged_mdat, &mut states)?;

        self.commit(states, recovered, output_path)?;
        Ok(())
    }

    /// Builds one `TrackState` per `trak` in the reference tree: an
    /// emptied `TrackModel` (shape kept, samples discarded) plus
    /// `CodecStats` gathered from the reference's own `mdat`.
    fn build_track_states(&mut self) -> Result<Vec<TrackState>, SalvageError> {
        let trak_models: Vec<TrackModel> = self.reference.find_all("trak")
            .into_iter()
            .map(TrackModel::build)
            .collect::<Result<Vec<_>, _>>()?;

        let mdat = self.reference.find_first_mut("mdat")
            .ok_or_else(|| SalvageError::MissingHeader("mdat".into()))?;

        let mut states = Vec::with_capacity(trak_models.len());
        for reference_model in &trak_models {
            let stats = CodecStats::build(reference_model, mdat)?;
            states.push(TrackState{
                model: reference_model.emptied(),
                stats,
                audio_durations: Vec::new(),
            });
        }

        // §4.7 stage 2 pre-swap: MP4A is probed first when present as the
        // second track, since its framing is more reliable than whatever
        // shares the file with it.
        if states.len() >= 2 && states[0].model.codec != "mp4a" && states[1].model.codec == "mp4a" {
            states.swap(0, 1);
        }

        Ok(states)
    }

    /// Stage 1: scans from byte 0 of the damaged file for a well-formed
    /// `mdat` header, skipping other top-level boxes by their declared
    /// length. Falls back to treating the whole file as `mdat` payload
    /// (zero-length synthetic header) if none is found before EOF.
    fn locate_mdat(damaged_path: &Path) -> Result<LargeBox, SalvageError> {
        let mut stream = crate::byte_stream::ByteStream::open(damaged_path)?;
        let file_len = stream.size();
        let mut pos = 0u64;

        while pos < file_len {
            stream.seek(pos)?;
            let header = match crate::box_tree::header::parse_header(&mut stream) {
                Ok(h) => h,
                Err(_) => break,
            };
            if header.name.to_str() == "mdat" {
                info!("located mdat at offset {} in damaged file", header.start);
                return Ok(LargeBox::new(damaged_path, header.payload_start(), file_len));
            }
            pos = header.end();
        }

        warn!("no well-formed mdat header found in damaged file; treating whole file as payload");
        Ok(LargeBox::new(damaged_path, 0, file_len))
    }

    /// Stage 2: walks `mdat` offset by offset, trying each track's
    /// recognizer in priority order. Returns the final, possibly
    /// truncated, `mdat` window.
    fn scan(&self, mut mdat: LargeBox, states: &mut [TrackState]) -> Result<LargeBox, SalvageError> {
        let size = mdat.len();
        let mut offset = 0u64;

        'offsets: while offset < size {
            let remaining = size - offset;

            let base = mdat.file_begin();

            if remaining >= 4 {
                let word = mdat.read_u32_be(base + offset)?;
                if word == 0 {
                    offset += self.config.zero_skip_stride as u64;
                    continue;
                }
            }

            if remaining >= 8 {
                let maybe_type = mdat.read_u32_be(base + offset + 4)?;
                if maybe_type == u32::from_be_bytes(*b"moov") {
                    let stray_len = mdat.read_u32_be(base + offset)? as u64;
                    if stray_len >= 8 && stray_len <= remaining {
                        debug!("skipping stray moov in mdat at offset {offset}");
                        offset += stray_len;
                        continue;
                    }
                }
            }

            let window_len = remaining.min(MAX_FRAME as u64) as usize;
            let window = mdat.read_at(base + offset, window_len as u64)?;

            let max_len = window_len as u32;
            for state in states.iter_mut() {
                let matched = codec::recognize(
                    &state.model.codec,
                    &state.stats,
                    &window,
                    max_len,
                    self.oracle,
                    &self.config,
                );
                let Some(m) = matched else { continue };
                if m.length == 0 || m.length > max_len || m.chances <= 0.0 {
                    continue;
                }

                state.model.push_sample(RawSample{
                    offset,
                    size: m.length,
                    duration: m.duration.unwrap_or(0),
                    keyframe: m.keyframe,
                });
                if let Some(d) = m.duration {
                    state.audio_durations.push(d);
                }

                offset += m.length as u64;
                continue 'offsets;
            }

            debug!("no track claimed offset {offset}; truncating mdat here");
            mdat.content_resize(offset)?;
            break;
        }

        Ok(mdat)
    }

    /// Stage 3: installs recovered audio durations, swaps the reference
    /// `mdat` for the reconstructed one, prunes boxes that cannot be
    /// safely repaired, then writes the sample tables in two passes
    /// (§6): once with a placeholder offset base to settle `moov`'s
    /// final byte length, then again with the true absolute `mdat`
    /// offset base once that length is known. Each track's duration is
    /// rescaled into movie timescale (§4.7 stage 3) before being written
    /// to `tkhd` and maxed into `mvhd.duration`.
    fn commit(mut self, states: Vec<TrackState>, mdat: LargeBox, output_path: &Path) -> Result<(), SalvageError> {
        let mdat_node = BoxNode::file_backed(FourCC::from_str("mdat"), mdat);
        self.reference.replace_mdat(mdat_node)?;

        let mut states = states;
        for state in states.iter_mut() {
            if state.audio_durations.len() == state.model.sample_count() {
                for (sample, duration) in state.model.samples_mut().iter_mut().zip(state.audio_durations.drain(..)) {
                    sample.duration = duration;
                }
            }
        }

        for name in PRUNE_ON_REPAIR {
            self.reference.prune(name);
        }

        // First pass: settle box sizes. co64's byte length depends only
        // on sample count, not on the offset values it holds, so a
        // placeholder base of 0 yields the final moov length.
        for state in &states {
            Self::write_track(&mut self.reference, &state.model, 0)?;
        }
        self.reference.update_length();

        let mdat_offset_base = Self::mdat_offset_base(&self.reference)?;
        let mdat_len = Self::mdat_len(&self.reference)?;

        let movie_timescale = self.reference.find_first("mvhd")
            .ok_or_else(|| SalvageError::MissingHeader("mvhd".into()))?
            .read_u32_be(12)?;

        let mut movie_duration = 0u32;
        for state in &states {
            for sample in state.model.samples() {
                if sample.offset + sample.size as u64 > mdat_len {
                    return Err(SalvageError::OffsetOutOfRange{
                        offset: mdat_offset_base + sample.offset,
                        mdat_start: mdat_offset_base,
                        mdat_end: mdat_offset_base + mdat_len,
                    });
                }
            }

            let track_duration = scale_duration(state.model.fix_times(), state.model.timescale(), movie_timescale);
            movie_duration = movie_duration.max(track_duration);

            // Second pass: real offset base, correct tkhd.duration.
            Self::write_track(&mut self.reference, &state.model, mdat_offset_base)?;
            Self::set_track_duration(&mut self.reference, state.model.track_id(), track_duration)?;
        }

        if let Some(mvhd) = self.reference.find_first_mut("mvhd") {
            mvhd.set_u32_be(16, movie_duration)?;
        }

        Ok(self.reference.write_file(output_path)?)
    }

    /// Sum of the declared lengths of every root preceding `mdat`, plus
    /// the 8-byte header `BoxNode::write` always emits for it, i.e. the
    /// absolute file offset of the first byte of `mdat`'s payload.
    fn mdat_offset_base(tree: &BoxTree) -> Result<u64, SalvageError> {
        let mut base = 0u64;
        for root in &tree.roots {
            if root.name.to_str() == "mdat" {
                return Ok(base + 8);
            }
            base += root.length();
        }
        Err(SalvageError::MissingHeader("mdat".into()))
    }

    fn mdat_len(tree: &BoxTree) -> Result<u64, SalvageError> {
        let node = tree.find_first("mdat").ok_or_else(|| SalvageError::MissingHeader("mdat".into()))?;
        match &node.payload {
            crate::box_tree::node::Payload::FileBacked(lb) => Ok(lb.len()),
            crate::box_tree::node::Payload::Inline(bytes) => Ok(bytes.len() as u64),
        }
    }

    /// Replaces the `stsz`/`stco`-or-`co64`/`stsc`/`stts` leaves under the
    /// `trak` matching `model.track_id()` with freshly serialized ones,
    /// computing `co64` offsets against `mdat_offset_base` (§6).
    fn write_track(tree: &mut BoxTree, model: &TrackModel, mdat_offset_base: u64) -> Result<(), SalvageError> {
        let trak = tree.roots.iter_mut()
            .find_map(|r| Self::find_trak_mut(r, model.track_id()))
            .ok_or_else(|| SalvageError::MissingHeader("trak".into()))?;

        let stbl = trak.find_first_mut("stbl")
            .ok_or_else(|| SalvageError::MissingHeader("stbl".into()))?;
        let (stsz, co64, stsc, stts) = model.to_stbl_boxes(mdat_offset_base);

        stbl.children.retain(|c| !matches!(c.name.to_str(), "stsz" | "stco" | "co64" | "stsc" | "stts"));
        stbl.children.push(stsz);
        stbl.children.push(co64);
        stbl.children.push(stsc);
        stbl.children.push(stts);

        Ok(())
    }

    /// Patches `tkhd.duration` (already in movie timescale) for the
    /// track matching `track_id`.
    fn set_track_duration(tree: &mut BoxTree, track_id: u32, movie_timescale_duration: u32) -> Result<(), SalvageError> {
        let trak = tree.roots.iter_mut()
            .find_map(|r| Self::find_trak_mut(r, track_id))
            .ok_or_else(|| SalvageError::MissingHeader("trak".into()))?;
        if let Some(tkhd) = trak.find_first_mut("tkhd") {
            tkhd.set_u32_be(20, movie_timescale_duration)?;
        }
        Ok(())
    }

    fn find_trak_mut(node: &mut BoxNode, track_id: u32) -> Option<&mut BoxNode> {
        if node.name.to_str() == "trak" {
            let matches = node.find_first("tkhd")
                .and_then(|tkhd| tkhd.read_u32_be(12).ok())
                .map(|id| id == track_id)
                .unwrap_or(false);
            if matches {
                return Some(node);
            }
        }
        for child in node.children.iter_mut() {
            if let Some(found) = Self::find_trak_mut(child, track_id) {
                return Some(found);
            }
        }
        None
    }
}
