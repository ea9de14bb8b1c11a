//! MFS path parsing and the source/destination descriptors built from it.
//!
//! Paths are absolute and slash-delimited. A path of the form
//! `/dag/<hex>[/segment...]` is a content reference: it resolves from the
//! given hash instead of the MFS root.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::{MAX_NAME_LEN, NodeKind};
use std::fmt;

/// First segment that marks a content reference.
pub const DAG_PREFIX: &str = "dag";

/// Where resolution of a path starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot {
    /// The current MFS root.
    Mfs,
    /// An arbitrary node in the store.
    Dag(Hash),
}

/// A validated absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfsPath {
    root: PathRoot,
    segments: Vec<String>,
}

impl MfsPath {
    /// The MFS root, `/`.
    pub fn root() -> Self {
        Self {
            root: PathRoot::Mfs,
            segments: Vec::new(),
        }
    }

    /// Parse and validate a path.
    ///
    /// Surrounding whitespace and a trailing `/` are ignored. Empty segments,
    /// `.`, `..`, NUL bytes and names longer than 255 bytes are rejected.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(Error::invalid_path(input, "path is empty"));
        }
        if !trimmed.starts_with('/') {
            return Err(Error::invalid_path(input, "path must start with '/'"));
        }

        let body = &trimmed[1..];
        if body.is_empty() {
            return Ok(Self::root());
        }
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut segments = Vec::new();
        for segment in body.split('/') {
            validate_segment(input, segment)?;
            segments.push(segment.to_string());
        }

        if segments.len() >= 2 && segments[0] == DAG_PREFIX {
            let hash = Hash::from_hex(&segments[1]).map_err(|e| {
                Error::invalid_path(input, format!("invalid content reference: {}", e))
            })?;
            return Ok(Self {
                root: PathRoot::Dag(hash),
                segments: segments.split_off(2),
            });
        }

        Ok(Self {
            root: PathRoot::Mfs,
            segments,
        })
    }

    pub fn path_root(&self) -> PathRoot {
        self.root
    }

    /// Segments below the path root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path names its root node itself.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether this path addresses the MFS tree (rather than a content reference).
    pub fn is_mfs(&self) -> bool {
        self.root == PathRoot::Mfs
    }

    /// The last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Name an entry gets when linked somewhere else.
    ///
    /// A bare content reference is named after its hash. The MFS root has no name.
    pub fn entry_name(&self) -> Option<String> {
        match (self.leaf(), self.root) {
            (Some(leaf), _) => Some(leaf.to_string()),
            (None, PathRoot::Dag(hash)) => Some(hash.to_hex()),
            (None, PathRoot::Mfs) => None,
        }
    }

    /// The containing path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            root: self.root,
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Render the path truncated to its first `depth` segments.
    pub(crate) fn display_prefix(&self, depth: usize) -> String {
        Self {
            root: self.root,
            segments: self.segments[..depth.min(self.segments.len())].to_vec(),
        }
        .to_string()
    }
}

impl fmt::Display for MfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PathRoot::Dag(hash) = self.root {
            write!(f, "/{}/{}", DAG_PREFIX, hash)?;
        } else if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

fn validate_segment(path: &str, segment: &str) -> Result<()> {
    if segment.is_empty() {
        return Err(Error::invalid_path(path, "empty path segment"));
    }
    if segment == "." || segment == ".." {
        return Err(Error::invalid_path(path, "relative segments are not allowed"));
    }
    if segment.contains('\0') {
        return Err(Error::invalid_path(path, "path contains a null byte"));
    }
    if segment.contains('/') {
        return Err(Error::invalid_path(path, "name contains '/'"));
    }
    if segment.len() > MAX_NAME_LEN {
        return Err(Error::invalid_path(
            path,
            format!("segment longer than {} bytes", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

/// A copy source: where it lives and the name it is linked under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub path: MfsPath,
    pub name: String,
}

impl SourceDescriptor {
    pub fn parse(input: &str) -> Result<Self> {
        let path = MfsPath::parse(input)?;
        let name = path
            .entry_name()
            .ok_or_else(|| Error::invalid_path(input, "the root cannot be copied"))?;
        Ok(Self { path, name })
    }
}

/// A copy destination inside the MFS tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationDescriptor {
    pub path: MfsPath,
    /// Containing directory; `None` when the destination is `/`.
    pub parent: Option<MfsPath>,
    /// Leaf name; `None` when the destination is `/`.
    pub name: Option<String>,
    /// What the path resolves to, or `None` if it does not exist.
    ///
    /// Parsing leaves this unset. The copy fills it in against the root
    /// snapshot it holds the writer lock for.
    pub kind: Option<NodeKind>,
}

impl DestinationDescriptor {
    pub fn parse(input: &str) -> Result<Self> {
        let path = MfsPath::parse(input)?;
        if !path.is_mfs() {
            return Err(Error::invalid_path(
                input,
                "content references cannot be modified",
            ));
        }
        Ok(Self {
            parent: path.parent(),
            name: path.leaf().map(str::to_string),
            kind: None,
            path,
        })
    }

    /// This destination, recorded as resolving to `kind`.
    pub fn classified(&self, kind: Option<NodeKind>) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}
