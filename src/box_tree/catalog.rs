//! Static table mapping four-byte box types to their structural
//! classification (C4).
//!
//! Generalizes `mp4iter::consts::CONTAINER`/`SUB_CONTAINER` into the
//! three-way classification this crate's box-tree parser needs: a
//! container's payload is child boxes, a leaf's payload is opaque, and a
//! dual box is structurally container-shaped in some files but is always
//! forced to `Leaf` for the one type (`udta`) known to carry non-standard
//! contents in the wild (`mp4iter`'s own doc comment on `SUB_CONTAINER`
//! notes the same `udta` caveat).

use crate::consts::{CONTAINER, DUAL_AS_LEAF};

/// Structural classification of a box type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    /// Payload is a sequence of child boxes tiling the declared length.
    Parent,
    /// Payload is opaque bytes of known semantic.
    Leaf,
    /// Structurally container-shaped but always treated as a leaf.
    Dual,
}

/// Whether a box's payload begins with a 1-byte version and 3-byte flags
/// field (the "full box" shape most sample-table atoms use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxVersioning {
    Versioned,
    Plain,
}

/// Compile-time lookup from FourCC to `{kind, versioning}`.
pub struct BoxCatalog;

impl BoxCatalog {
    pub fn kind(fourcc: &str) -> BoxKind {
        if DUAL_AS_LEAF.contains(&fourcc) {
            return BoxKind::Dual;
        }
        if CONTAINER.contains(&fourcc) {
            return BoxKind::Parent;
        }
        BoxKind::Leaf
    }

    pub fn is_container(fourcc: &str) -> bool {
        matches!(Self::kind(fourcc), BoxKind::Parent)
    }

    pub fn versioning(fourcc: &str) -> BoxVersioning {
        match fourcc {
            "stts" | "stss" | "stsz" | "stsc" | "stco" | "co64" | "ctts" | "cslg" | "stps"
            | "mdhd" | "mvhd" | "tkhd" | "hdlr" | "elst" | "dref" | "smhd" | "vmhd" | "sdtp"
            | "stsd" => BoxVersioning::Versioned,
            _ => BoxVersioning::Plain,
        }
    }
}
