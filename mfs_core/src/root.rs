//! The published MFS root and its single-writer lock.

use crate::block::BlockStore;
use crate::error::Result;
use crate::hash::Hash;
use parking_lot::RwLock;
use tokio::sync::{Mutex, MutexGuard};

/// Hash of the node currently representing `/`.
///
/// Readers take a snapshot with [`MfsRoot::current`]. Writers serialize
/// through [`MfsRoot::lock`] and are the only ones able to publish.
#[derive(Debug)]
pub struct MfsRoot {
    current: RwLock<Hash>,
    writer: Mutex<()>,
}

impl MfsRoot {
    pub fn new(hash: Hash) -> Self {
        Self {
            current: RwLock::new(hash),
            writer: Mutex::new(()),
        }
    }

    /// Snapshot of the published root.
    pub fn current(&self) -> Hash {
        *self.current.read()
    }

    /// Wait for exclusive write access.
    pub async fn lock(&self) -> RootWriter<'_> {
        RootWriter {
            root: self,
            _guard: self.writer.lock().await,
        }
    }
}

/// Exclusive write access to an [`MfsRoot`].
pub struct RootWriter<'a> {
    root: &'a MfsRoot,
    _guard: MutexGuard<'a, ()>,
}

impl RootWriter<'_> {
    /// The root as of acquiring the lock. Stable until this writer publishes.
    pub fn current(&self) -> Hash {
        self.root.current()
    }

    /// Make `hash` the new root.
    ///
    /// With `flush`, the root is persisted first and the in-memory root only
    /// changes once that succeeded. Without it, only the in-memory root moves.
    pub async fn publish<S>(&self, store: &S, hash: Hash, flush: bool) -> Result<()>
    where
        S: BlockStore + ?Sized,
    {
        if flush {
            store.store_root(&hash).await?;
        }

        let previous = std::mem::replace(&mut *self.root.current.write(), hash);
        tracing::info!(previous = %previous, root = %hash, flushed = flush, "Published MFS root");
        Ok(())
    }

    /// Persist the in-memory root without changing it.
    pub async fn flush<S>(&self, store: &S) -> Result<Hash>
    where
        S: BlockStore + ?Sized,
    {
        let hash = self.current();
        store.store_root(&hash).await?;
        tracing::debug!(root = %hash, "Flushed MFS root");
        Ok(hash)
    }
}
