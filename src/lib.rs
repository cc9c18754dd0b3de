//! Reconstructs a playable ISO Base Media File Format container
//! (MP4/MOV/M4V/3GP) from a truncated or otherwise damaged file by
//! cross-referencing its structure against a healthy reference file
//! produced by the same recording device.
//!
//! ```no_run
//! use mp4salvage::{BoxTree, RepairConfig, Repairer};
//! use mp4salvage::codec::{Oracle, OracleProbe, SpsParams};
//! use mp4salvage::errors::SalvageError;
//! use std::path::Path;
//!
//! struct NullOracle;
//! impl Oracle for NullOracle {
//!     fn probe(&self, _codec_id: &str, _start: &[u8], _max_bytes: usize) -> Result<OracleProbe, SalvageError> {
//!         Err(SalvageError::OracleUnavailable("no oracle configured".into()))
//!     }
//!     fn sps_params(&self, _codec_id: &str) -> Result<SpsParams, SalvageError> {
//!         Err(SalvageError::OracleUnavailable("no oracle configured".into()))
//!     }
//!     fn is_mp3(&self, _codec_id: &str) -> bool { false }
//! }
//!
//! fn main() -> Result<(), SalvageError> {
//!     let reference = BoxTree::parse_file(Path::new("REFERENCE.MP4"))?;
//!     let oracle = NullOracle;
//!     let repairer = Repairer::new(reference, &oracle, RepairConfig::default());
//!     repairer.repair(Path::new("DAMAGED.MP4"), Path::new("DAMAGED_fixed.mp4"))?;
//!     Ok(())
//! }
//! ```

pub mod atom_types;
pub mod box_tree;
pub mod byte_stream;
pub mod codec;
pub mod codec_stats;
pub mod config;
pub mod consts;
pub mod errors;
pub mod fourcc;
pub mod large_box;
pub mod repairer;
pub mod support;
pub mod track;

pub use box_tree::{BoxCatalog, BoxNode, BoxTree, Payload};
pub use byte_stream::ByteStream;
pub use codec::{recognize, Match, Oracle};
pub use codec_stats::CodecStats;
pub use config::{RepairConfig, StrictChecks};
pub use consts::mp4_time_zero;
pub use errors::SalvageError;
pub use fourcc::FourCC;
pub use large_box::LargeBox;
pub use repairer::Repairer;
pub use track::{RawSample, TrackModel};

mod tests;
