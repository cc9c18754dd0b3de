//! Main "container" box types, i.e. boxes that contain more boxes, and
//! other constants shared across the box tree, track model, and repairer.

use time::{self, PrimitiveDateTime, Month};

/// FourCC:s for known container boxes. If a box is a container, its
/// payload is a sequence of child boxes filling its declared length.
///
/// - `moov`: offset tables, timing, metadata, telemetry
/// - `trak`: moov.trak
/// - `tref`: moov.trak.tref
/// - `edts`: moov.trak.edts
/// - `mdia`: moov.trak.mdia
/// - `minf`: moov.trak.mdia.minf
/// - `dinf`: moov.trak.mdia.minf.dinf
/// - `stbl`: moov.trak.mdia.minf.stbl, contains timing (stts), offsets (stco)
pub const CONTAINER: [&str; 8] = [
    "moov",
    "trak",
    "tref",
    "edts",
    "mdia",
    "minf",
    "dinf",
    "stbl",
];

/// Boxes that are structurally container-like by FourCC but are always
/// treated as opaque leaves, because some encoders write non-standard
/// contents under them.
pub const DUAL_AS_LEAF: [&str; 1] = [
    "udta",
];

/// Boxes pruned from the reconstructed `moov` because they cannot be
/// safely repaired from a damaged `mdat` scan (stage 3, §4.7).
pub const PRUNE_ON_REPAIR: [&str; 3] = [
    "ctts",
    "cslg",
    "stps",
];

/// Upper bound on a single recognized sample's length in bytes. A match
/// reporting a length at or above this is rejected outright.
pub const MAX_FRAME: u32 = 1_600_000;

/// Default size of `LargeBox`'s sliding in-memory read buffer.
pub const DEFAULT_SLIDING_BUFFER: usize = 64 * 1024;

/// Default chunk size used when streaming a `LargeBox`'s payload on write.
pub const DEFAULT_WRITE_WINDOW: usize = 1024 * 1024;

/// Default cap on box-tree recursion depth (§9 design notes).
pub const DEFAULT_MAX_RECURSE_DEPTH: usize = 32;

/// Time zero for MP4 containers: January 1, 1904.
pub fn mp4_time_zero() -> PrimitiveDateTime {
    time::Date::from_calendar_date(1904, Month::January, 1).unwrap()
        .with_hms_milli(0, 0, 0, 0).unwrap()
}