//! The mutable file system handle.

use crate::block::BlockStore;
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::Node;
use crate::root::MfsRoot;
use tracing::instrument;

/// A mutable file tree over a [`BlockStore`].
///
/// Reads (`stat`) work from a snapshot of the published root. Mutations
/// (`cp`, `mkdir`, `flush`) hold the root's writer lock from the first
/// resolution until the new root is published.
#[derive(Debug)]
pub struct Mfs<S> {
    store: S,
    root: MfsRoot,
}

impl<S: BlockStore> Mfs<S> {
    /// Open the MFS persisted in `store`, or start from an empty directory.
    ///
    /// A fresh root is persisted immediately.
    #[instrument(skip_all)]
    pub async fn open(store: S) -> Result<Self> {
        let hash = match store.load_root().await? {
            Some(hash) => {
                let block = store.fetch_node(&hash).await?;
                if !block.node.is_directory() {
                    return Err(Error::not_a_directory("/"));
                }
                tracing::debug!(root = %hash, "Loaded MFS root");
                hash
            }
            None => {
                let empty = store
                    .put_node(Node::directory(), store.default_encoding())
                    .await?;
                store.store_root(&empty.hash).await?;
                tracing::info!(root = %empty.hash, "Initialized empty MFS root");
                empty.hash
            }
        };

        Ok(Self {
            store,
            root: MfsRoot::new(hash),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Hash of the published root.
    pub fn root(&self) -> Hash {
        self.root.current()
    }

    pub(crate) fn mfs_root(&self) -> &MfsRoot {
        &self.root
    }

    /// Persist the in-memory root. Returns the persisted hash.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> Result<Hash> {
        let writer = self.root.lock().await;
        writer.flush(&self.store).await
    }
}
