//! Creating empty directories.

use crate::block::BlockStore;
use crate::error::{Error, Result};
use crate::mfs::Mfs;
use crate::node::Node;
use crate::path::MfsPath;
use crate::rebuild::rebuild;
use crate::resolve::{ResolveOptions, resolve};
use tracing::instrument;

/// Options for [`Mfs::mkdir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Create missing parents, and accept an existing directory.
    pub parents: bool,
    /// Persist the new root before returning.
    pub flush: bool,
}

impl Default for MkdirOptions {
    fn default() -> Self {
        Self {
            parents: false,
            flush: true,
        }
    }
}

impl<S: BlockStore> Mfs<S> {
    /// Create an empty directory at `path`.
    #[instrument(skip(self), level = "debug")]
    pub async fn mkdir(&self, path: &str, options: MkdirOptions) -> Result<()> {
        let path = MfsPath::parse(path)?;
        if !path.is_mfs() {
            return Err(Error::invalid_path(
                path.to_string(),
                "content references cannot be modified",
            ));
        }

        let writer = self.mfs_root().lock().await;
        let root = writer.current();
        let resolve_options = ResolveOptions {
            create_intermediate: options.parents,
            create_last_component: true,
        };
        let resolution = resolve(self.store(), &root, &path, resolve_options).await?;

        if resolution.exists() {
            if options.parents && resolution.target.node().is_directory() {
                return Ok(());
            }
            return Err(Error::collision(path.to_string()));
        }

        let new_root = rebuild(
            self.store(),
            self.store().default_encoding(),
            &resolution.ancestors,
            &resolution.target.name,
            Node::directory(),
        )
        .await?;

        writer
            .publish(self.store(), new_root.hash, options.flush)
            .await
    }
}
