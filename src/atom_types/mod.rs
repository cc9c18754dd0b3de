//! Concrete `binrw` structs for individual atom/box payloads, plus the
//! sample description (`stsd`) sub-tree.

mod co64;
mod hdlr;
mod mdhd;
mod mvhd;
mod stco;
mod stsc;
pub mod stsd;
mod stss;
mod stsz;
mod stts;
mod tkhd;
mod tmcd;

pub use co64::Co64;
pub use hdlr::Hdlr;
pub use mdhd::Mdhd;
pub use mvhd::Mvhd;
pub use stco::Stco;
pub use stsc::Stsc;
pub use stsd::{AudioFormat, SampleDescription, Stsd, VideoFormat};
pub use stss::Stss;
pub use stsz::Stsz;
pub use stts::Stts;
pub use tkhd::Tkhd;
pub use tmcd::Tmcd;
