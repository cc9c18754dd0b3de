//! Box tree nodes: the `{Inline(bytes), FileBacked{begin,end,sliding_buffer}}`
//! tagged variant from §9's design notes, with a shared read/write/
//! update-length capability set dispatched at compile time via a `match`.

use crate::box_tree::catalog::BoxCatalog;
use crate::box_tree::header::{parse_header, BoxHeader};
use crate::byte_stream::ByteStream;
use crate::errors::SalvageError;
use crate::fourcc::FourCC;
use crate::large_box::LargeBox;

/// Where a box's payload lives.
pub enum Payload {
    /// Small boxes (everything but `mdat`) are fully buffered, mirroring
    /// `mp4iter::Mp4Reader`'s `moov_reader: Cursor<Vec<u8>>`.
    Inline(Vec<u8>),
    /// `mdat` keeps its payload on disk behind a sliding window (C3).
    FileBacked(LargeBox),
}

/// A node in the box forest. Exclusively owns its children and its payload.
pub struct BoxNode {
    pub name: FourCC,
    pub payload: Payload,
    pub children: Vec<BoxNode>,
    length: u64,
}

impl BoxNode {
    pub fn leaf(name: FourCC, bytes: Vec<u8>) -> Self {
        let length = 8 + bytes.len() as u64;
        Self{name, payload: Payload::Inline(bytes), children: Vec::new(), length}
    }

    pub fn parent(name: FourCC, children: Vec<BoxNode>) -> Self {
        let mut node = Self{name, payload: Payload::Inline(Vec::new()), children, length: 0};
        node.update_length();
        node
    }

    pub fn file_backed(name: FourCC, large_box: LargeBox) -> Self {
        let length = 8 + large_box.len();
        Self{name, payload: Payload::FileBacked(large_box), children: Vec::new(), length}
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn is_container(&self) -> bool {
        BoxCatalog::is_container(self.name.to_str())
    }

    /// Recomputes this node's (and its descendants') declared length
    /// bottom-up: `length == header_size + own_payload_len + Σ children.length`.
    pub fn update_length(&mut self) -> u64 {
        for child in self.children.iter_mut() {
            child.update_length();
        }
        let own_payload_len = match &self.payload {
            Payload::Inline(bytes) => bytes.len() as u64,
            Payload::FileBacked(lb) => lb.len(),
        };
        let children_len: u64 = self.children.iter().map(|c| c.length).sum();
        self.length = 8 + own_payload_len + children_len;
        self.length
    }

    /// Pre-order search for the first descendant (including self) whose
    /// FourCC matches `name`.
    pub fn find_first<'a>(&'a self, name: &str) -> Option<&'a BoxNode> {
        if self.name.to_str() == name {
            return Some(self);
        }
        for child in &self.children {
            if let Some(found) = child.find_first(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_first_mut<'a>(&'a mut self, name: &str) -> Option<&'a mut BoxNode> {
        if self.name.to_str() == name {
            return Some(self);
        }
        for child in self.children.iter_mut() {
            if let Some(found) = child.find_first_mut(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_all<'a>(&'a self, name: &str, out: &mut Vec<&'a BoxNode>) {
        if self.name.to_str() == name {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(name, out);
        }
    }

    /// Removes all descendants (at any depth) whose FourCC matches `name`.
    pub fn prune(&mut self, name: &str) {
        self.children.retain(|c| c.name.to_str() != name);
        for child in self.children.iter_mut() {
            child.prune(name);
        }
    }

    /// Replaces the first direct child matching `old_name` with `new_node`.
    /// Returns `true` if a replacement occurred.
    pub fn replace_child(&mut self, old_name: &str, new_node: BoxNode) -> bool {
        if let Some(slot) = self.children.iter_mut().find(|c| c.name.to_str() == old_name) {
            *slot = new_node;
            true
        } else {
            false
        }
    }

    /// Returns this box's in-memory payload bytes, or `Unsupported` for a
    /// file-backed (`mdat`) node.
    pub fn inline_bytes(&self) -> Result<&[u8], SalvageError> {
        match &self.payload {
            Payload::Inline(bytes) => Ok(bytes),
            Payload::FileBacked(_) => Err(SalvageError::Unsupported("cannot read in-memory offset of a file-backed box".into())),
        }
    }

    pub fn read_u32_be(&self, offset: usize) -> Result<u32, SalvageError> {
        let bytes = self.inline_bytes()?;
        bytes.get(offset..offset + 4)
            .map(|b| u32::from_be_bytes(b.try_into().unwrap()))
            .ok_or_else(|| SalvageError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "read_u32_be out of bounds")))
    }

    pub fn read_u64_be(&self, offset: usize) -> Result<u64, SalvageError> {
        let bytes = self.inline_bytes()?;
        bytes.get(offset..offset + 8)
            .map(|b| u64::from_be_bytes(b.try_into().unwrap()))
            .ok_or_else(|| SalvageError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "read_u64_be out of bounds")))
    }

    /// Overwrites 4 bytes of an in-memory payload in place (used to patch
    /// `tkhd.duration`/`mvhd.duration` after repair without re-deriving the
    /// whole box). `Unsupported` for a file-backed node.
    pub fn set_u32_be(&mut self, offset: usize, value: u32) -> Result<(), SalvageError> {
        match &mut self.payload {
            Payload::Inline(bytes) => {
                let slot = bytes.get_mut(offset..offset + 4)
                    .ok_or_else(|| SalvageError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "set_u32_be out of bounds")))?;
                slot.copy_from_slice(&value.to_be_bytes());
                Ok(())
            }
            Payload::FileBacked(_) => Err(SalvageError::Unsupported("cannot patch a file-backed box".into())),
        }
    }

    pub fn read_chars(&self, offset: usize, n: usize) -> Result<String, SalvageError> {
        let bytes = self.inline_bytes()?;
        let slice = bytes.get(offset..offset + n)
            .ok_or_else(|| SalvageError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "read_chars out of bounds")))?;
        Ok(slice.iter().map(|b| *b as char).collect())
    }

    /// Writes header, then payload, then each child in order. Always emits
    /// a 32-bit header (the §8 invariant 2 exception: `co64` absorbs large
    /// media offsets so a 64-bit box header is not expected in practice).
    pub fn write(&self, stream: &mut ByteStream) -> Result<(), SalvageError> {
        let length_u32: u32 = self.length.try_into()
            .map_err(|_| SalvageError::Unsupported(format!("box '{}' length {} exceeds 32-bit header", self.name, self.length)))?;
        stream.write_u32_be(length_u32)?;
        stream.write_all(self.name.to_str().as_bytes())?;
        match &self.payload {
            Payload::Inline(bytes) => stream.write_all(bytes)?,
            Payload::FileBacked(lb) => lb.write_to(stream)?,
        }
        for child in &self.children {
            child.write(stream)?;
        }
        Ok(())
    }
}


/// Recursively parses a non-`mdat` box (container or leaf) starting at the
/// stream's current position, given its already-parsed header.
pub fn parse_node(stream: &mut ByteStream, header: &BoxHeader, depth: usize, max_depth: usize) -> Result<BoxNode, SalvageError> {
    if depth > max_depth {
        return Err(SalvageError::RecurseDepthExceeded{depth, max: max_depth});
    }

    let payload_len = header.payload_len();
    let is_container = BoxCatalog::is_container(header.name.to_str());

    if is_container {
        let end = header.end();
        let mut children = Vec::new();
        let mut consumed = 0u64;
        while consumed < payload_len {
            let child_header = parse_header(stream)?;
            let child = if child_header.name.to_str() == "mdat" {
                return Err(SalvageError::BadBox{offset: child_header.start, reason: "unexpected nested mdat".into()});
            } else {
                parse_node(stream, &child_header, depth + 1, max_depth)?
            };
            consumed += child_header.length;
            children.push(child);
        }
        if stream.position()? != end {
            return Err(SalvageError::BadBox{offset: header.start, reason: format!("container '{}' children do not tile declared length", header.name)});
        }
        Ok(BoxNode::parent(header.name.clone(), children))
    } else {
        let bytes = stream.read_exact_n(payload_len as usize)?;
        Ok(BoxNode::leaf(header.name.clone(), bytes))
    }
}
