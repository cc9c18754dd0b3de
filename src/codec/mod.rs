//! Per-codec sample boundary recognition (C6). One entry point,
//! `recognize`, dispatches on the four-byte codec identifier found in a
//! track's `stsd` to the matcher in the corresponding submodule.
//!
//! Each matcher combines two confidence sources: structural checks
//! (zero on any violation) and an empirical prior drawn from
//! `CodecStats::beginnings32`/`beginnings64` — so that ambiguous codecs
//! still rank by prevalence of the observed sample-start fingerprint,
//! rather than failing outright whenever the structural check alone is
//! inconclusive.

pub mod alac;
pub mod amr;
pub mod avc1;
pub mod camm;
pub mod fdsc;
pub mod gpmd;
pub mod hevc;
pub mod mbex;
pub mod mijd;
pub mod mp4a;
pub mod mp4v;
pub mod pcm;
pub mod prores;
pub mod rtp_hint;
pub mod text;
pub mod tmcd;
pub mod unknown;

use crate::codec_stats::CodecStats;
use crate::config::RepairConfig;

/// A confirmed H.264 Sequence Parameter Set, as much of it as the slice
/// header walker needs. Supplied by the oracle, never guessed.
#[derive(Debug, Clone, Copy)]
pub struct SpsParams {
    pub log2_max_frame_num: u8,
    pub frame_mbs_only_flag: bool,
    pub poc_type: u8,
    pub log2_max_poc_lsb: u8,
}

/// Result of a single oracle probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleProbe {
    /// Bytes the oracle actually consumed decoding one sample.
    pub consumed: usize,
    /// Duration in the track's own sample-rate units, when the oracle
    /// can report one (audio codecs).
    pub duration_samples: Option<u32>,
    pub keyframe: Option<bool>,
}

/// The external decoder collaborator. Consulted only for AVC1, MP4V,
/// MP4A, and ALAC (§6) — every other codec is self-describing enough to
/// recognize structurally.
pub trait Oracle {
    fn probe(&self, codec_id: &str, start: &[u8], max_bytes: usize) -> Result<OracleProbe, crate::errors::SalvageError>;
    /// The stream's first Sequence Parameter Set, required before AVC1
    /// slice headers can be parsed.
    fn sps_params(&self, codec_id: &str) -> Result<SpsParams, crate::errors::SalvageError>;
    /// True when this MP4A stream is actually framed MP3, not AAC.
    fn is_mp3(&self, codec_id: &str) -> bool;
}

/// A recognized sample boundary.
#[derive(Debug, Clone, Copy)]
pub struct Match {
    /// Number of bytes this sample consumes, header(s) included.
    pub length: u32,
    /// Duration in the track's sample-rate units, when the matcher (or
    /// its oracle) can report one.
    pub duration: Option<u32>,
    pub keyframe: bool,
    /// Confidence weight. Zero means "does not start a sample here";
    /// comparable in magnitude to `CodecStats::beginnings32/64`'s
    /// `1e20`-normalized weights so a recognizer can combine a
    /// structural pass with the empirical prior on equal footing.
    pub chances: f64,
}

impl Match {
    pub fn rejected() -> Option<Self> {
        None
    }
}

/// Dispatches to the matcher registered for `codec` (a four-character
/// `stsd` format code, e.g. `"avc1"`, `"mp4a"`). `start` is the window of
/// `mdat` bytes beginning at the candidate sample's first byte, already
/// clamped to `min(remaining, MAX_FRAME)`.
pub fn recognize(
    codec: &str,
    stats: &CodecStats,
    start: &[u8],
    max_len: u32,
    oracle: &dyn Oracle,
    config: &RepairConfig,
) -> Option<Match> {
    match codec {
        "avc1" => avc1::recognize(stats, start, max_len, oracle, config),
        "hev1" | "hvc1" => hevc::recognize(stats, start, max_len, oracle),
        "mp4a" => mp4a::recognize(stats, start, max_len, oracle, config),
        "mp4v" => mp4v::recognize(stats, start, max_len, oracle),
        "alac" => alac::recognize(stats, start, max_len, oracle),
        "apcn" | "apch" => prores::recognize(stats, start, max_len),
        "samr" => amr::recognize(stats, start, max_len),
        "lpcm" | "in24" | "sowt" | "twos" => pcm::recognize(stats, start, max_len),
        "tmcd" => tmcd::recognize(stats, start, max_len),
        "text" => text::recognize(stats, start, max_len),
        "gpmd" => gpmd::recognize(stats, start, max_len),
        "fdsc" => fdsc::recognize(stats, start, max_len),
        "camm" => camm::recognize(stats, start, max_len),
        "mijd" => mijd::recognize(stats, start, max_len),
        "mbex" => mbex::recognize(stats, start, max_len),
        "rtp " => rtp_hint::recognize(stats, start, max_len),
        _ => unknown::recognize(stats, start, max_len),
    }
}
