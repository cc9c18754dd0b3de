//! Parses and writes the box forest; owns parent-child ownership and
//! payload ownership; supports prune/replace/search-by-type (C2), backed by
//! the static classification table (C4, `catalog`).
//!
//! Grounded in `mp4iter::reader::Mp4Reader::header()` for header parsing
//! (including the 64-bit extended-length branch) and in the current,
//! `binrw`-based `mp4iter::atom_types` path (rather than the legacy
//! `binread`-based `atom/` module) for the convention of buffering small
//! boxes fully in memory.

pub mod catalog;
pub mod header;
pub mod node;

use std::path::Path;

use crate::byte_stream::ByteStream;
use crate::consts::DEFAULT_MAX_RECURSE_DEPTH;
use crate::errors::SalvageError;
use crate::large_box::LargeBox;

pub use catalog::{BoxCatalog, BoxKind};
pub use header::{parse_header, BoxHeader};
pub use node::{parse_node, BoxNode, Payload};

/// An ordered forest of top-level boxes (`ftyp?`, `moov`, `mdat`, ...).
pub struct BoxTree {
    pub roots: Vec<BoxNode>,
}

impl BoxTree {
    /// Parses every top-level box in `path`. `mdat` is anchored as a
    /// file-backed `LargeBox` rather than read into memory; everything
    /// else (expected to be small, as in `mp4iter`) is fully buffered.
    pub fn parse_file(path: &Path) -> Result<Self, SalvageError> {
        Self::parse_file_with_depth(path, DEFAULT_MAX_RECURSE_DEPTH)
    }

    pub fn parse_file_with_depth(path: &Path, max_depth: usize) -> Result<Self, SalvageError> {
        let mut stream = ByteStream::open(path)?;
        let total = stream.size();
        let mut roots = Vec::new();
        let mut pos = 0u64;

        while pos < total {
            stream.seek(pos)?;
            let header = parse_header(&mut stream)?;
            let node = if header.name.to_str() == "mdat" {
                let large_box = LargeBox::new(path, header.payload_start(), header.end());
                BoxNode::file_backed(header.name.clone(), large_box)
            } else {
                parse_node(&mut stream, &header, 1, max_depth)?
            };
            pos = header.end();
            roots.push(node);
        }

        Self::validate_top_level(&roots)?;
        Ok(Self{roots})
    }

    /// The tree holds exactly one `moov`, exactly one `mdat`, and at most
    /// one leading `ftyp` (§3 BoxTree invariants).
    fn validate_top_level(roots: &[BoxNode]) -> Result<(), SalvageError> {
        let moov_count = roots.iter().filter(|n| n.name.to_str() == "moov").count();
        let mdat_count = roots.iter().filter(|n| n.name.to_str() == "mdat").count();
        let ftyp_count = roots.iter().filter(|n| n.name.to_str() == "ftyp").count();

        if moov_count != 1 {
            return Err(SalvageError::MissingHeader("moov".into()));
        }
        if mdat_count != 1 {
            return Err(SalvageError::MissingHeader("mdat".into()));
        }
        if ftyp_count > 1 {
            return Err(SalvageError::BadBox{offset: 0, reason: format!("expected at most one ftyp, found {ftyp_count}")});
        }
        if ftyp_count == 1 && roots.first().map(|n| n.name.to_str()) != Some("ftyp") {
            return Err(SalvageError::BadBox{offset: 0, reason: "ftyp present but not leading".into()});
        }
        Ok(())
    }

    pub fn find_first(&self, name: &str) -> Option<&BoxNode> {
        self.roots.iter().find_map(|r| r.find_first(name))
    }

    pub fn find_first_mut(&mut self, name: &str) -> Option<&mut BoxNode> {
        self.roots.iter_mut().find_map(|r| r.find_first_mut(name))
    }

    pub fn find_all(&self, name: &str) -> Vec<&BoxNode> {
        let mut out = Vec::new();
        for root in &self.roots {
            root.find_all(name, &mut out);
        }
        out
    }

    /// Removes all descendants of the given type anywhere in the forest
    /// (used for `ctts`/`cslg`/`stps`, which can never be top-level boxes).
    pub fn prune(&mut self, name: &str) {
        for root in self.roots.iter_mut() {
            root.prune(name);
        }
    }

    /// Recomputes every node's declared length, bottom-up.
    pub fn update_length(&mut self) {
        for root in self.roots.iter_mut() {
            root.update_length();
        }
    }

    /// Replaces the top-level `mdat` node (used to swap in the damaged
    /// file's reconstructed, truncated `LargeBox` during repair stage 3).
    pub fn replace_mdat(&mut self, new_mdat: BoxNode) -> Result<(), SalvageError> {
        for root in self.roots.iter_mut() {
            if root.name.to_str() == "mdat" {
                *root = new_mdat;
                return Ok(());
            }
        }
        Err(SalvageError::MissingHeader("mdat".into()))
    }

    /// Emits header then payload then each child, for every top-level box
    /// in order, to `path`. Order is whatever `self.roots` holds; callers
    /// are expected to have arranged `ftyp?`, `moov`, `mdat` beforehand.
    pub fn write_file(&self, path: &Path) -> Result<(), SalvageError> {
        let mut stream = ByteStream::create(path)?;
        for root in &self.roots {
            root.write(&mut stream)?;
        }
        stream.flush()
    }
}
