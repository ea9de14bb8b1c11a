//! Filesystem block store and object I/O.

use crate::block::{Block, BlockStore};
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Hash};
use crate::node::{Encoding, Format, Node};
use crate::object::{CompressionType, HEADER_SIZE, ObjectHeader};
use crate::refs::{RefManager, ROOT_REF};
use async_trait::async_trait;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Compression threshold: encoded nodes >= 4KB are compressed.
const COMPRESSION_THRESHOLD: usize = 4096;

/// A content-addressed node store on the local filesystem.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
    encoding: Encoding,
}

impl Store {
    /// Initialize a new store at the given path.
    ///
    /// Creates the directory structure:
    /// - `objects/` for storing encoded nodes
    /// - `refs/` for named references (including the MFS root)
    /// - `config` file with version, algorithm and format
    pub fn init<P: AsRef<Path>>(root: P, encoding: Encoding) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        fs::create_dir_all(root.join("objects"))?;
        fs::create_dir_all(root.join("refs"))?;

        let config_content = format!(
            "version=1\nalgo={}\nformat={}\n",
            encoding.algorithm.as_str(),
            encoding.format.as_str()
        );
        fs::write(root.join("config"), config_content)?;

        tracing::debug!(root = %root.display(), algo = encoding.algorithm.as_str(), "Initialized store");

        Ok(Self { root, encoding })
    }

    /// Open an existing store at the given path.
    ///
    /// Validates the store structure and reads the configuration.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            return Err(Error::invalid_store(&root, "directory does not exist"));
        }

        let config_path = root.join("config");
        if !config_path.exists() {
            return Err(Error::invalid_store(&root, "config file not found"));
        }

        let config_content = fs::read_to_string(&config_path)?;
        let encoding = Self::parse_config(&config_content)
            .map_err(|e| Error::invalid_store(&root, e.to_string()))?;

        if !root.join("objects").exists() {
            return Err(Error::invalid_store(&root, "objects directory missing"));
        }

        if !root.join("refs").exists() {
            return Err(Error::invalid_store(&root, "refs directory missing"));
        }

        Ok(Self { root, encoding })
    }

    /// Parse the config file to extract the default encoding.
    fn parse_config(content: &str) -> Result<Encoding> {
        let mut version = None;
        let mut algo = None;
        let mut format = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "version" => version = Some(value.trim()),
                    "algo" => algo = Some(value.trim()),
                    "format" => format = Some(value.trim()),
                    _ => {}
                }
            }
        }

        if version != Some("1") {
            return Err(Error::encoding(format!(
                "Unsupported config version: {:?}",
                version
            )));
        }

        let algo_str = algo.ok_or_else(|| Error::encoding("Missing algo in config"))?;
        let algorithm = Algorithm::parse(algo_str)?;
        let format = match format {
            Some(name) => Format::parse(name)?,
            None => Format::default(),
        };

        Ok(Encoding::new(format, algorithm))
    }

    /// Get the path to an object file given its hash.
    ///
    /// Returns: `objects/{prefix}/{suffix}`
    pub fn object_path(&self, hash: &Hash) -> PathBuf {
        self.root
            .join("objects")
            .join(hash.prefix())
            .join(hash.suffix())
    }

    /// Get the root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the default encoding of this store.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Get the reference manager for this store.
    pub fn refs(&self) -> RefManager<'_> {
        RefManager::new(self)
    }

    /// Read an object header from a file.
    pub(crate) fn read_object_header(&self, path: &Path) -> Result<ObjectHeader> {
        let mut file = fs::File::open(path)?;
        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)
            .map_err(|e| Error::corrupted_object(path, format!("Unreadable header: {}", e)))?;
        ObjectHeader::decode(&header_buf)
    }

    /// Read the full payload of an object.
    pub(crate) fn read_object_payload(&self, path: &Path, expected_len: u64) -> Result<Vec<u8>> {
        let mut file = fs::File::open(path)?;

        // Skip header
        let mut header_buf = [0u8; HEADER_SIZE];
        file.read_exact(&mut header_buf)?;

        let mut payload = Vec::new();
        file.read_to_end(&mut payload)?;

        if payload.len() != expected_len as usize {
            return Err(Error::corrupted_object(
                path,
                format!(
                    "Payload length mismatch: expected {}, got {}",
                    expected_len,
                    payload.len()
                ),
            ));
        }

        Ok(payload)
    }

    /// Write an object atomically using tempfile.
    fn write_object_atomic(
        &self,
        hash: &Hash,
        header: &ObjectHeader,
        payload: &[u8],
    ) -> Result<()> {
        let obj_path = self.object_path(hash);
        let shard_dir = self.root.join("objects").join(hash.prefix());
        fs::create_dir_all(&shard_dir)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(&shard_dir)?;

        temp_file.write_all(&header.encode())?;
        temp_file.write_all(payload)?;
        temp_file.flush()?;

        temp_file.persist(&obj_path)?;

        Ok(())
    }

    /// Encode, hash and write a node.
    ///
    /// Nodes whose encoding is >= 4KB are stored zstd-compressed.
    pub fn write_node(&self, node: Node, encoding: Encoding) -> Result<Block> {
        let (hash, encoded) = encoding.encode_and_hash(&node)?;
        let encoded_size = encoded.len() as u64;

        // Deduplication
        if !self.object_path(&hash).exists() {
            let (payload, compression) = if encoded.len() >= COMPRESSION_THRESHOLD {
                (compress_zstd(&encoded)?, CompressionType::Zstd)
            } else {
                (encoded, CompressionType::None)
            };

            let header = ObjectHeader::new(encoding, compression, payload.len() as u64);
            self.write_object_atomic(&hash, &header, &payload)?;
        }

        Ok(Block {
            hash,
            node,
            encoded_size,
        })
    }

    /// Read, verify and decode a node.
    pub fn read_node(&self, hash: &Hash) -> Result<Block> {
        let obj_path = self.object_path(hash);

        if !obj_path.exists() {
            return Err(Error::object_not_found(hash.to_hex()));
        }

        let header = self.read_object_header(&obj_path)?;
        let stored = self.read_object_payload(&obj_path, header.payload_len)?;

        let encoded = match header.compression {
            CompressionType::None => stored,
            CompressionType::Zstd => decompress_zstd(&stored)?,
        };

        // Corruption detection
        let computed_hash = header.encoding.algorithm.digest(&encoded);
        if computed_hash != *hash {
            return Err(Error::corrupted_object(
                &obj_path,
                format!(
                    "Hash mismatch: expected {}, got {}",
                    hash.to_hex(),
                    computed_hash.to_hex()
                ),
            ));
        }

        let node = Node::decode(header.encoding.format, &encoded)?;
        Ok(Block {
            hash: *hash,
            node,
            encoded_size: encoded.len() as u64,
        })
    }
}

#[async_trait]
impl BlockStore for Store {
    async fn fetch_node(&self, hash: &Hash) -> Result<Block> {
        let store = self.clone();
        let hash = *hash;
        tokio::task::spawn_blocking(move || store.read_node(&hash)).await?
    }

    async fn put_node(&self, node: Node, encoding: Encoding) -> Result<Block> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.write_node(node, encoding)).await?
    }

    async fn load_root(&self) -> Result<Option<Hash>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.refs().get(ROOT_REF)).await?
    }

    async fn store_root(&self, hash: &Hash) -> Result<()> {
        let store = self.clone();
        let hash = *hash;
        tokio::task::spawn_blocking(move || store.refs().add(ROOT_REF, &hash)).await?
    }

    fn default_encoding(&self) -> Encoding {
        self.encoding
    }
}

/// Compress data using zstd.
fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, 3) // Level 3 = fast compression
        .map_err(|e| Error::compression(format!("zstd compression failed: {}", e)))
}

/// Decompress data using zstd.
fn decompress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::decode_all(data)
        .map_err(|e| Error::compression(format!("zstd decompression failed: {}", e)))
}
