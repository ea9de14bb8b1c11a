//! DAG nodes, links and their encodings.
//!
//! A node is either a file or a directory. Directories carry an
//! insertion-ordered list of named links; files carry inline data plus the
//! sizes of any child blocks they link to.
//!
//! Two encodings are supported. `dag-bin` (little-endian):
//!
//! ```text
//! 1   kind: 1=file, 2=directory
//! 8   data_len (u64)
//! N   data
//! 4   block_count (u32)
//! 8*n block sizes (u64 each)
//! 4   link_count (u32)
//! per link:
//!   32  hash
//!   8   size (u64)
//!   1   name_len
//!   N   name (UTF-8)
//! ```
//!
//! `dag-json` is the serde_json rendering of [`Node`].

use crate::error::{Error, Result};
use crate::hash::{Algorithm, HASH_SIZE, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Cursor, Read};

/// Maximum length of a link name in bytes.
pub const MAX_NAME_LEN: usize = 255;

/// Node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// File content (inline data and/or child blocks).
    File = 1,
    /// Directory of named links.
    Directory = 2,
}

impl NodeKind {
    /// Convert to byte representation.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse from byte representation.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(NodeKind::File),
            2 => Ok(NodeKind::Directory),
            _ => Err(Error::encoding(format!("Invalid node kind: {}", value))),
        }
    }

    /// Get the string name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
        }
    }
}

/// Node encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Compact binary encoding.
    #[default]
    DagBin,
    /// JSON encoding.
    DagJson,
}

impl Format {
    /// Returns the string representation of the format (for config files).
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::DagBin => "dag-bin",
            Format::DagJson => "dag-json",
        }
    }

    /// Parse format from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "dag-bin" => Ok(Format::DagBin),
            "dag-json" => Ok(Format::DagJson),
            _ => Err(Error::encoding(format!("Unsupported format: {}", s))),
        }
    }

    /// Returns the format ID byte (for object headers).
    pub fn id(&self) -> u8 {
        match self {
            Format::DagBin => 1,
            Format::DagJson => 2,
        }
    }

    /// Parse format from ID byte.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Format::DagBin),
            2 => Ok(Format::DagJson),
            _ => Err(Error::encoding(format!("Unsupported format ID {}", id))),
        }
    }
}

/// The format and hash algorithm a node is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Encoding {
    pub format: Format,
    pub algorithm: Algorithm,
}

impl Encoding {
    pub fn new(format: Format, algorithm: Algorithm) -> Self {
        Self { format, algorithm }
    }

    /// Encode a node and hash the encoded bytes.
    pub fn encode_and_hash(&self, node: &Node) -> Result<(Hash, Vec<u8>)> {
        let bytes = node.encode(self.format)?;
        Ok((self.algorithm.digest(&bytes), bytes))
    }
}

/// A named, sized reference to a child node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Name of the entry (UTF-8).
    pub name: String,
    /// Hash of the target node.
    pub hash: Hash,
    /// Size reported for the target.
    pub size: u64,
}

impl Link {
    /// Create a new link, validating the name.
    pub fn new(name: impl Into<String>, hash: Hash, size: u64) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, hash, size })
    }
}

/// Validate a link name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_link("Name cannot be empty"));
    }

    if name.len() > MAX_NAME_LEN {
        return Err(Error::invalid_link(format!(
            "Name too long: {} bytes (max {})",
            name.len(),
            MAX_NAME_LEN
        )));
    }

    if name.contains('\0') {
        return Err(Error::invalid_link("Name cannot contain null bytes"));
    }

    if name.contains('/') {
        return Err(Error::invalid_link("Name cannot contain '/'"));
    }

    Ok(())
}

/// An immutable DAG node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    #[serde(default)]
    data: Vec<u8>,
    #[serde(default)]
    block_sizes: Vec<u64>,
    #[serde(default)]
    links: Vec<Link>,
}

impl Node {
    /// An empty directory.
    pub fn directory() -> Self {
        Self {
            kind: NodeKind::Directory,
            data: Vec::new(),
            block_sizes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// A directory with the given links, in the given order.
    pub fn directory_with_links(links: Vec<Link>) -> Result<Self> {
        check_unique(&links)?;
        Ok(Self {
            kind: NodeKind::Directory,
            data: Vec::new(),
            block_sizes: Vec::new(),
            links,
        })
    }

    /// A single-block file holding its content inline.
    pub fn file(data: Vec<u8>) -> Self {
        Self {
            kind: NodeKind::File,
            data,
            block_sizes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// A file made of child blocks. `block_sizes[i]` is the logical size of `links[i]`.
    pub fn chunked_file(links: Vec<Link>, block_sizes: Vec<u64>) -> Result<Self> {
        if links.len() != block_sizes.len() {
            return Err(Error::encoding(format!(
                "File has {} links but {} block sizes",
                links.len(),
                block_sizes.len()
            )));
        }
        Ok(Self {
            kind: NodeKind::File,
            data: Vec::new(),
            block_sizes,
            links,
        })
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn block_sizes(&self) -> &[u64] {
        &self.block_sizes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Find a link by name.
    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }

    /// Application-visible byte length. Directories have none.
    pub fn logical_size(&self) -> u64 {
        match self.kind {
            NodeKind::File => self.data.len() as u64 + self.block_sizes.iter().sum::<u64>(),
            NodeKind::Directory => 0,
        }
    }

    /// Sum of the sizes recorded on this node's links.
    pub fn linked_size(&self) -> u64 {
        self.links.iter().map(|link| link.size).sum()
    }

    /// Append a link to a copy of this node's link set.
    pub(crate) fn with_link_appended(&self, link: Link) -> Self {
        let mut links = self.links.clone();
        links.push(link);
        Self {
            links,
            ..self.clone()
        }
    }

    /// Replace the link named `link.name` in place, or append it if absent.
    pub(crate) fn with_link_set(&self, link: Link) -> Self {
        let mut links = self.links.clone();
        match links.iter_mut().find(|existing| existing.name == link.name) {
            Some(existing) => *existing = link,
            None => links.push(link),
        }
        Self {
            links,
            ..self.clone()
        }
    }

    /// Encode the node in the given format.
    pub fn encode(&self, format: Format) -> Result<Vec<u8>> {
        match format {
            Format::DagBin => Ok(self.encode_bin()),
            Format::DagJson => Ok(serde_json::to_vec(self)?),
        }
    }

    /// Decode a node from bytes in the given format.
    pub fn decode(format: Format, bytes: &[u8]) -> Result<Self> {
        let node = match format {
            Format::DagBin => Self::decode_bin(bytes)?,
            Format::DagJson => serde_json::from_slice::<Node>(bytes)?,
        };
        node.validate()?;
        Ok(node)
    }

    fn encode_bin(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(17 + self.data.len() + self.links.len() * 48);

        buf.push(self.kind.to_u8());

        buf.extend_from_slice(&(self.data.len() as u64).to_le_bytes());
        buf.extend_from_slice(&self.data);

        buf.extend_from_slice(&(self.block_sizes.len() as u32).to_le_bytes());
        for size in &self.block_sizes {
            buf.extend_from_slice(&size.to_le_bytes());
        }

        buf.extend_from_slice(&(self.links.len() as u32).to_le_bytes());
        for link in &self.links {
            buf.extend_from_slice(link.hash.as_bytes());
            buf.extend_from_slice(&link.size.to_le_bytes());
            buf.push(link.name.len() as u8);
            buf.extend_from_slice(link.name.as_bytes());
        }

        buf
    }

    fn decode_bin(bytes: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(bytes);

        let kind = NodeKind::from_u8(read_array::<1>(&mut reader)?[0])?;

        let data_len = u64::from_le_bytes(read_array(&mut reader)?) as usize;
        if data_len > bytes.len() {
            return Err(Error::encoding(format!(
                "Data length {} exceeds node size {}",
                data_len,
                bytes.len()
            )));
        }
        let mut data = vec![0u8; data_len];
        read_exact(&mut reader, &mut data)?;

        let block_count = u32::from_le_bytes(read_array(&mut reader)?) as usize;
        let mut block_sizes = Vec::new();
        for _ in 0..block_count {
            block_sizes.push(u64::from_le_bytes(read_array(&mut reader)?));
        }

        let link_count = u32::from_le_bytes(read_array(&mut reader)?) as usize;
        let mut links = Vec::new();
        for _ in 0..link_count {
            let hash = Hash::from_bytes(read_array::<HASH_SIZE>(&mut reader)?);
            let size = u64::from_le_bytes(read_array(&mut reader)?);
            let name_len = read_array::<1>(&mut reader)?[0] as usize;
            let mut name_buf = vec![0u8; name_len];
            read_exact(&mut reader, &mut name_buf)?;
            let name = String::from_utf8(name_buf)
                .map_err(|e| Error::encoding(format!("Invalid UTF-8 in link name: {}", e)))?;
            links.push(Link::new(name, hash, size)?);
        }

        if reader.position() != bytes.len() as u64 {
            return Err(Error::encoding(format!(
                "Trailing bytes after node: {}",
                bytes.len() as u64 - reader.position()
            )));
        }

        Ok(Self {
            kind,
            data,
            block_sizes,
            links,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.kind == NodeKind::Directory && !(self.data.is_empty() && self.block_sizes.is_empty())
        {
            return Err(Error::encoding("Directory node carries file data"));
        }
        if self.kind == NodeKind::File && self.links.len() != self.block_sizes.len() {
            return Err(Error::encoding("File links and block sizes disagree"));
        }
        for link in &self.links {
            validate_name(&link.name)?;
        }
        check_unique(&self.links)
    }
}

fn check_unique(links: &[Link]) -> Result<()> {
    let mut seen = HashSet::new();
    for link in links {
        if !seen.insert(link.name.as_str()) {
            return Err(Error::collision(link.name.clone()));
        }
    }
    Ok(())
}

fn read_exact(reader: &mut Cursor<&[u8]>, buf: &mut [u8]) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|_| Error::encoding("Truncated node"))
}

fn read_array<const N: usize>(reader: &mut Cursor<&[u8]>) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    read_exact(reader, &mut buf)?;
    Ok(buf)
}
