//! Copying existing nodes to new places in the tree.
//!
//! A copy never reads file content. It links the source's hash into the
//! destination directory, rebuilds the ancestors and publishes the new root.

use crate::block::{Block, BlockStore};
use crate::error::{Error, Result};
use crate::hash::{Algorithm, Hash};
use crate::link::add_link;
use crate::mfs::Mfs;
use crate::node::{Encoding, Format, NodeKind};
use crate::path::{DestinationDescriptor, MfsPath, SourceDescriptor};
use crate::rebuild::rebuild;
use crate::resolve::{ResolveOptions, resolve};
use crate::stat::stat_block;
use futures::future::try_join_all;
use tracing::instrument;

/// Options for [`Mfs::cp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Create missing directories on the destination side.
    pub parents: bool,
    /// Persist the new root before returning.
    pub flush: bool,
    /// Format for rebuilt nodes. Defaults to the store's.
    pub format: Option<Format>,
    /// Hash algorithm for rebuilt nodes. Defaults to the store's.
    pub hash_alg: Option<Algorithm>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            parents: false,
            flush: true,
            format: None,
            hash_alg: None,
        }
    }
}

impl CopyOptions {
    fn encoding(&self, default: Encoding) -> Encoding {
        Encoding::new(
            self.format.unwrap_or(default.format),
            self.hash_alg.unwrap_or(default.algorithm),
        )
    }
}

/// A validated copy: at least one source and exactly one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub sources: Vec<SourceDescriptor>,
    pub destination: DestinationDescriptor,
}

impl CopyRequest {
    pub fn new<I, T>(sources: I, destination: &str) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let sources = sources
            .into_iter()
            .map(|source| SourceDescriptor::parse(source.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if sources.is_empty() {
            return Err(Error::argument("Please supply at least one source"));
        }
        if destination.trim().is_empty() {
            return Err(Error::argument("Please supply a destination"));
        }

        Ok(Self {
            sources,
            destination: DestinationDescriptor::parse(destination)?,
        })
    }
}

/// What gets linked for one source.
#[derive(Debug)]
struct SourceEntry<'a> {
    name: &'a str,
    hash: Hash,
    size: u64,
}

impl<'a> SourceEntry<'a> {
    fn new(source: &'a SourceDescriptor, block: &Block) -> Self {
        Self {
            name: &source.name,
            hash: block.hash,
            // Logical size, not cumulative: directories link with size zero.
            size: block.node.logical_size(),
        }
    }
}

impl<S: BlockStore> Mfs<S> {
    /// Copy `sources` to `destination`.
    ///
    /// An existing directory destination receives every source under its own
    /// name. A missing destination with a single source becomes a copy of it.
    /// A missing destination with several sources is created as a directory.
    /// Either the whole copy is published or nothing is.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn cp<I, T>(&self, sources: I, destination: &str, options: CopyOptions) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let request = CopyRequest::new(sources, destination)?;
        self.copy(&request, options).await
    }

    /// Run a validated copy.
    pub async fn copy(&self, request: &CopyRequest, options: CopyOptions) -> Result<()> {
        let encoding = options.encoding(self.store().default_encoding());
        let writer = self.mfs_root().lock().await;
        let root = writer.current();
        let destination = self.classify(&root, &request.destination).await?;
        tracing::debug!(
            destination = %destination.path,
            kind = ?destination.kind,
            "Classified destination"
        );

        let new_root = match destination.kind {
            Some(NodeKind::Directory) => {
                self.copy_into_directory(&root, request, options, encoding)
                    .await?
            }
            Some(NodeKind::File) => return Err(Error::collision(destination.path.to_string())),
            None if request.sources.len() == 1 => {
                self.copy_to_new_name(&root, request, options, encoding)
                    .await?
            }
            None => {
                self.copy_into_directory(&root, request, options, encoding)
                    .await?
            }
        };

        writer
            .publish(self.store(), new_root.hash, options.flush)
            .await
    }

    async fn copy_to_new_name(
        &self,
        root: &Hash,
        request: &CopyRequest,
        options: CopyOptions,
        encoding: Encoding,
    ) -> Result<Block> {
        let source = &request.sources[0];
        let destination = &request.destination;
        let name = destination.name.as_deref().ok_or_else(|| {
            Error::invalid_path(destination.path.to_string(), "destination has no name")
        })?;
        let parent_path = destination.parent.clone().unwrap_or_else(MfsPath::root);

        let (block, (), parent) = futures::try_join!(
            stat_block(self.store(), root, &source.path),
            self.ensure_absent(root, &destination.path),
            resolve(
                self.store(),
                root,
                &parent_path,
                ResolveOptions::creating(options.parents)
            ),
        )?;

        if !parent.target.node().is_directory() {
            return Err(Error::not_a_directory(parent.path.to_string()));
        }

        let entry = SourceEntry::new(source, &block);
        tracing::debug!(source = %source.path, name, hash = %entry.hash, "Linking copy");
        let node = add_link(
            parent.target.node(),
            &parent.path,
            name,
            entry.hash,
            entry.size,
        )?;

        rebuild(
            self.store(),
            encoding,
            &parent.ancestors,
            &parent.target.name,
            node,
        )
        .await
    }

    async fn copy_into_directory(
        &self,
        root: &Hash,
        request: &CopyRequest,
        options: CopyOptions,
        encoding: Encoding,
    ) -> Result<Block> {
        let resolve_options = ResolveOptions {
            create_intermediate: options.parents,
            create_last_component: true,
        };

        let stats = try_join_all(
            request
                .sources
                .iter()
                .map(|source| stat_block(self.store(), root, &source.path)),
        );
        let (blocks, target) = futures::try_join!(
            stats,
            resolve(
                self.store(),
                root,
                &request.destination.path,
                resolve_options
            ),
        )?;

        if !target.target.node().is_directory() {
            return Err(Error::not_a_directory(target.path.to_string()));
        }

        // Fold in source order, whatever order the stats finished in.
        let mut node = target.target.node().clone();
        for (source, block) in request.sources.iter().zip(&blocks) {
            let entry = SourceEntry::new(source, block);
            tracing::debug!(source = %source.path, name = entry.name, hash = %entry.hash, "Linking copy");
            node = add_link(&node, &target.path, entry.name, entry.hash, entry.size)?;
        }

        rebuild(
            self.store(),
            encoding,
            &target.ancestors,
            &target.target.name,
            node,
        )
        .await
    }

    /// Record what `destination` resolves to in the `root` snapshot.
    ///
    /// Only `PathNotFound` means the destination is missing; any other
    /// resolution error aborts the copy.
    async fn classify(
        &self,
        root: &Hash,
        destination: &DestinationDescriptor,
    ) -> Result<DestinationDescriptor> {
        let kind = match resolve(self.store(), root, &destination.path, ResolveOptions::default())
            .await
        {
            Ok(resolution) => Some(resolution.target.node().kind()),
            Err(Error::PathNotFound { .. }) => None,
            Err(err) => return Err(err),
        };
        Ok(destination.classified(kind))
    }

    /// Fail with a collision if `path` already resolves.
    async fn ensure_absent(&self, root: &Hash, path: &MfsPath) -> Result<()> {
        match resolve(self.store(), root, path, ResolveOptions::default()).await {
            Ok(_) => Err(Error::collision(path.to_string())),
            Err(Error::PathNotFound { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
