//! Importing local files and directories as DAG nodes.

use crate::block::Block;
use crate::chunking::{ChunkerConfig, chunk_ranges};
use crate::error::{Error, Result};
use crate::node::{Link, Node};
use crate::store::Store;
use std::fs;
use std::path::Path;

/// Chunking threshold: files >= 1MB are split into child blocks.
const CHUNKING_THRESHOLD: usize = 1024 * 1024;

impl Store {
    /// Add a file or directory to the store.
    ///
    /// Files become file nodes, directories become directory nodes linking
    /// their entries by name. Returns the top-level block.
    pub fn add_path(&self, path: &Path) -> Result<Block> {
        if !path.exists() {
            return Err(Error::Io {
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Path does not exist: {}", path.display()),
                ),
            });
        }

        let metadata = fs::metadata(path)?;

        let block = if metadata.is_file() {
            self.add_file(path)?
        } else if metadata.is_dir() {
            self.add_directory(path)?
        } else {
            return Err(Error::argument(format!(
                "Unsupported file type: {}",
                path.display()
            )));
        };

        tracing::debug!(path = %path.display(), hash = %block.hash, "Added path");
        Ok(block)
    }

    /// Store in-memory content as a file node.
    ///
    /// Content below the chunking threshold is stored inline in a single node.
    /// Larger content is split with FastCDC; each chunk becomes a leaf file
    /// node and the returned node links them in order.
    pub fn add_bytes(&self, data: &[u8]) -> Result<Block> {
        if data.len() < CHUNKING_THRESHOLD {
            return self.write_node(Node::file(data.to_vec()), self.encoding());
        }

        let mut links = Vec::new();
        let mut block_sizes = Vec::new();
        for (index, range) in chunk_ranges(data, &ChunkerConfig::default())
            .into_iter()
            .enumerate()
        {
            let chunk = self.write_node(Node::file(data[range].to_vec()), self.encoding())?;
            block_sizes.push(chunk.node.logical_size());
            links.push(Link::new(index.to_string(), chunk.hash, chunk.cumulative_size())?);
        }

        self.write_node(Node::chunked_file(links, block_sizes)?, self.encoding())
    }

    fn add_file(&self, path: &Path) -> Result<Block> {
        let data = fs::read(path)?;
        self.add_bytes(&data)
    }

    /// Add a directory recursively. Links are sorted by name so that the
    /// same directory contents always import to the same hash.
    fn add_directory(&self, path: &Path) -> Result<Block> {
        let mut links = Vec::new();

        // Use ignore crate to respect .gitignore
        let walker = ignore::WalkBuilder::new(path)
            .max_depth(Some(1)) // Only immediate children
            .hidden(false) // Include hidden files
            .git_ignore(true) // Respect .gitignore
            .build();

        for entry in walker {
            let entry = entry?;
            let entry_path = entry.path();

            // Skip the directory itself
            if entry_path == path {
                continue;
            }

            let metadata = fs::symlink_metadata(entry_path)?;
            let file_name = entry_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    Error::argument(format!("Invalid filename: {}", entry_path.display()))
                })?
                .to_string();

            let child = if metadata.is_symlink() {
                return Err(Error::argument(format!(
                    "Symlinks not supported: {}",
                    entry_path.display()
                )));
            } else if metadata.is_file() {
                self.add_file(entry_path)?
            } else if metadata.is_dir() {
                self.add_directory(entry_path)?
            } else {
                continue;
            };

            links.push(Link::new(file_name, child.hash, child.cumulative_size())?);
        }

        links.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        self.write_node(Node::directory_with_links(links)?, self.encoding())
    }
}
