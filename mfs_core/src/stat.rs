//! Read-only metadata for a resolved path.

use crate::block::{Block, BlockStore};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::mfs::Mfs;
use crate::node::NodeKind;
use crate::path::MfsPath;
use crate::resolve::{ResolveOptions, resolve};
use serde::Serialize;
use tracing::instrument;

/// Which fields `stat` reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatOptions {
    /// Report only the hash.
    pub hash_only: bool,
    /// Report only the cumulative size.
    pub size_only: bool,
}

/// Full metadata of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeStat {
    pub hash: Hash,
    /// Logical byte length. Zero for directories.
    pub size: u64,
    /// Encoded size of the node plus the sizes recorded on its links.
    pub cumulative_size: u64,
    /// Number of child blocks.
    pub blocks: usize,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl NodeStat {
    pub fn from_block(block: &Block) -> Self {
        Self {
            hash: block.hash,
            size: block.node.logical_size(),
            cumulative_size: block.cumulative_size(),
            blocks: block.node.block_sizes().len(),
            kind: block.node.kind(),
        }
    }
}

/// Result of `stat`, shaped by [`StatOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatOutput {
    Hash { hash: Hash },
    Size { size: u64 },
    Full(NodeStat),
}

impl StatOutput {
    pub fn project(block: &Block, options: StatOptions) -> Result<Self> {
        match (options.hash_only, options.size_only) {
            (true, true) => Err(Error::argument("hash-only and size-only are exclusive")),
            (true, false) => Ok(StatOutput::Hash { hash: block.hash }),
            (false, true) => Ok(StatOutput::Size {
                size: block.cumulative_size(),
            }),
            (false, false) => Ok(StatOutput::Full(NodeStat::from_block(block))),
        }
    }
}

/// Resolve an existing path to its stored block.
pub(crate) async fn stat_block<S>(store: &S, mfs_root: &Hash, path: &MfsPath) -> Result<Block>
where
    S: BlockStore + ?Sized,
{
    let resolution = resolve(store, mfs_root, path, ResolveOptions::default()).await?;
    resolution
        .block()
        .cloned()
        .ok_or_else(|| Error::path_not_found(path.to_string()))
}

impl<S: BlockStore> Mfs<S> {
    /// Report metadata for `path`. Does not wait for writers.
    #[instrument(skip(self), level = "debug")]
    pub async fn stat(&self, path: &str, options: StatOptions) -> Result<StatOutput> {
        if options.hash_only && options.size_only {
            return Err(Error::argument("hash-only and size-only are exclusive"));
        }
        let path = MfsPath::parse(path)?;
        let block = stat_block(self.store(), &self.root(), &path).await?;
        StatOutput::project(&block, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::node::{Link, Node};

    async fn mfs_with_file(content: &[u8]) -> (Mfs<MemoryStore>, Block) {
        let store = MemoryStore::new();
        let encoding = store.default_encoding();
        let file = store
            .put_node(Node::file(content.to_vec()), encoding)
            .await
            .unwrap();
        let root = store
            .put_node(
                Node::directory_with_links(vec![
                    Link::new("f", file.hash, file.node.logical_size()).unwrap(),
                ])
                .unwrap(),
                encoding,
            )
            .await
            .unwrap();
        store.store_root(&root.hash).await.unwrap();
        (Mfs::open(store).await.unwrap(), file)
    }

    #[tokio::test]
    async fn test_stat_default_has_all_fields() {
        let (mfs, file) = mfs_with_file(b"hello world").await;

        let output = mfs.stat("/f", StatOptions::default()).await.unwrap();
        let StatOutput::Full(stat) = output else {
            panic!("expected full stat, got {:?}", output);
        };
        assert_eq!(stat.hash, file.hash);
        assert_eq!(stat.size, 11);
        assert_eq!(stat.cumulative_size, file.encoded_size);
        assert_eq!(stat.blocks, 0);
        assert_eq!(stat.kind, NodeKind::File);
        assert!(stat.size <= stat.cumulative_size);
    }

    #[tokio::test]
    async fn test_stat_hash_only() {
        let (mfs, file) = mfs_with_file(b"hello").await;

        let output = mfs
            .stat(
                "/f",
                StatOptions {
                    hash_only: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(output, StatOutput::Hash { hash: file.hash });
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            serde_json::json!({ "hash": file.hash.to_hex() })
        );
    }

    #[tokio::test]
    async fn test_stat_size_only_is_cumulative() {
        let (mfs, _) = mfs_with_file(b"hello").await;

        let output = mfs
            .stat(
                "/",
                StatOptions {
                    size_only: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let root = mfs.store().fetch_node(&mfs.root()).await.unwrap();
        assert_eq!(
            output,
            StatOutput::Size {
                size: root.cumulative_size()
            }
        );
    }

    #[tokio::test]
    async fn test_stat_directory() {
        let (mfs, _) = mfs_with_file(b"hello").await;

        let StatOutput::Full(stat) = mfs.stat("/", StatOptions::default()).await.unwrap() else {
            panic!("expected full stat");
        };
        assert_eq!(stat.kind, NodeKind::Directory);
        assert_eq!(stat.size, 0);
        assert!(stat.cumulative_size > 0);
    }

    #[tokio::test]
    async fn test_stat_errors() {
        let (mfs, _) = mfs_with_file(b"hello").await;

        assert!(matches!(
            mfs.stat("/missing", StatOptions::default()).await,
            Err(Error::PathNotFound { .. })
        ));
        assert!(matches!(
            mfs.stat("relative", StatOptions::default()).await,
            Err(Error::InvalidPath { .. })
        ));
        assert!(matches!(
            mfs.stat("/f/x", StatOptions::default()).await,
            Err(Error::NotADirectory { .. })
        ));
        assert!(matches!(
            mfs.stat(
                "/f",
                StatOptions {
                    hash_only: true,
                    size_only: true
                }
            )
            .await,
            Err(Error::Argument { .. })
        ));
    }

    #[tokio::test]
    async fn test_stat_content_reference() {
        let (mfs, file) = mfs_with_file(b"hello").await;

        let output = mfs
            .stat(&format!("/dag/{}", file.hash), StatOptions::default())
            .await
            .unwrap();
        assert_eq!(output, StatOutput::Full(NodeStat::from_block(&file)));
    }
}
