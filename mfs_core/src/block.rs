//! The block store interface the MFS layer is built on.

use crate::error::Result;
use crate::hash::Hash;
use crate::node::{Encoding, Node};
use async_trait::async_trait;

/// A node together with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Hash of the encoded node.
    pub hash: Hash,
    /// The decoded node.
    pub node: Node,
    /// Length of the encoded (uncompressed) node in bytes.
    pub encoded_size: u64,
}

impl Block {
    /// Total stored size of the subtree: this node's encoding plus the sizes
    /// recorded on its links.
    pub fn cumulative_size(&self) -> u64 {
        self.encoded_size + self.node.linked_size()
    }
}

/// Content-addressed node storage plus the persisted MFS root pointer.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Fetch and decode a node by hash.
    async fn fetch_node(&self, hash: &Hash) -> Result<Block>;

    /// Encode, hash and store a node.
    async fn put_node(&self, node: Node, encoding: Encoding) -> Result<Block>;

    /// The last persisted MFS root, if any.
    async fn load_root(&self) -> Result<Option<Hash>>;

    /// Persist a new MFS root.
    async fn store_root(&self, hash: &Hash) -> Result<()>;

    /// Encoding used when the caller does not pick one.
    fn default_encoding(&self) -> Encoding;
}
