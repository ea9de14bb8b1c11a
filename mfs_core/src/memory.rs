//! In-memory block store.

use crate::block::{Block, BlockStore};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::{Encoding, Node};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct StoredBlock {
    encoding: Encoding,
    bytes: Vec<u8>,
}

/// A block store that keeps encoded nodes in a hash-keyed map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: RwLock<HashMap<Hash, StoredBlock>>,
    root: RwLock<Option<Hash>>,
    encoding: Encoding,
}

impl MemoryStore {
    /// Create an empty store using the default encoding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with a specific default encoding.
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    /// Whether a node with this hash is stored.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.blocks.read().contains_key(hash)
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

#[async_trait]
impl BlockStore for MemoryStore {
    async fn fetch_node(&self, hash: &Hash) -> Result<Block> {
        let stored = self
            .blocks
            .read()
            .get(hash)
            .cloned()
            .ok_or_else(|| Error::object_not_found(hash.to_hex()))?;

        let node = Node::decode(stored.encoding.format, &stored.bytes)?;
        Ok(Block {
            hash: *hash,
            node,
            encoded_size: stored.bytes.len() as u64,
        })
    }

    async fn put_node(&self, node: Node, encoding: Encoding) -> Result<Block> {
        let (hash, bytes) = encoding.encode_and_hash(&node)?;
        let encoded_size = bytes.len() as u64;

        self.blocks
            .write()
            .entry(hash)
            .or_insert(StoredBlock { encoding, bytes });

        Ok(Block {
            hash,
            node,
            encoded_size,
        })
    }

    async fn load_root(&self) -> Result<Option<Hash>> {
        Ok(*self.root.read())
    }

    async fn store_root(&self, hash: &Hash) -> Result<()> {
        *self.root.write() = Some(*hash);
        Ok(())
    }

    fn default_encoding(&self) -> Encoding {
        self.encoding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Link;

    #[tokio::test]
    async fn test_put_fetch_node() {
        let store = MemoryStore::new();
        let put = store
            .put_node(Node::file(b"hello".to_vec()), store.default_encoding())
            .await
            .unwrap();

        let fetched = store.fetch_node(&put.hash).await.unwrap();
        assert_eq!(fetched, put);
        assert_eq!(fetched.node.data(), b"hello");
    }

    #[tokio::test]
    async fn test_put_deduplicates() {
        let store = MemoryStore::new();
        let a = store
            .put_node(Node::directory(), store.default_encoding())
            .await
            .unwrap();
        let b = store
            .put_node(Node::directory(), store.default_encoding())
            .await
            .unwrap();

        assert_eq!(a.hash, b.hash);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let store = MemoryStore::new();
        let missing = crate::hash::Algorithm::Blake3.digest(b"nothing");
        assert!(matches!(
            store.fetch_node(&missing).await,
            Err(Error::ObjectNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_cumulative_size_includes_links() {
        let store = MemoryStore::new();
        let child = store
            .put_node(Node::file(b"abc".to_vec()), store.default_encoding())
            .await
            .unwrap();
        let link = Link::new("child", child.hash, child.cumulative_size()).unwrap();
        let parent = store
            .put_node(
                Node::directory_with_links(vec![link]).unwrap(),
                store.default_encoding(),
            )
            .await
            .unwrap();

        assert_eq!(
            parent.cumulative_size(),
            parent.encoded_size + child.cumulative_size()
        );
    }

    #[tokio::test]
    async fn test_root_pointer() {
        let store = MemoryStore::new();
        assert_eq!(store.load_root().await.unwrap(), None);

        let hash = crate::hash::Algorithm::Blake3.digest(b"root");
        store.store_root(&hash).await.unwrap();
        assert_eq!(store.load_root().await.unwrap(), Some(hash));
    }
}
