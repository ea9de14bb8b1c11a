//! Walking a path from a root node down to its target.

use crate::block::{Block, BlockStore};
use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::Node;
use crate::path::{MfsPath, PathRoot};

/// Whether missing segments may be synthesized as empty directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Synthesize missing segments before the last one.
    pub create_intermediate: bool,
    /// Synthesize a missing last segment.
    pub create_last_component: bool,
}

impl ResolveOptions {
    /// Creation of both intermediate and last components, or neither.
    pub fn creating(create: bool) -> Self {
        Self {
            create_intermediate: create,
            create_last_component: create,
        }
    }
}

/// A node reached during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// The node exists in the store.
    Stored(Block),
    /// An empty directory standing in for a missing segment. It is not
    /// stored or linked until the tree is rebuilt.
    Synthesized(Node),
}

impl Entry {
    pub fn node(&self) -> &Node {
        match self {
            Entry::Stored(block) => &block.node,
            Entry::Synthesized(node) => node,
        }
    }

    pub fn block(&self) -> Option<&Block> {
        match self {
            Entry::Stored(block) => Some(block),
            Entry::Synthesized(_) => None,
        }
    }

    pub fn exists(&self) -> bool {
        matches!(self, Entry::Stored(_))
    }
}

/// One step of an ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Name of the link leading here from the previous entry. Empty for the root.
    pub name: String,
    pub entry: Entry,
}

impl ChainEntry {
    pub fn node(&self) -> &Node {
        self.entry.node()
    }
}

/// The outcome of resolving a path.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub path: MfsPath,
    /// Root first, immediate parent last. Empty when the path is a root.
    pub ancestors: Vec<ChainEntry>,
    pub target: ChainEntry,
}

impl Resolution {
    /// The resolved block, unless the target was synthesized.
    pub fn block(&self) -> Option<&Block> {
        self.target.entry.block()
    }

    pub fn exists(&self) -> bool {
        self.target.entry.exists()
    }
}

/// Resolve `path` against a snapshot of the MFS root.
///
/// Content references start from their own hash and ignore `mfs_root`.
pub async fn resolve<S>(
    store: &S,
    mfs_root: &Hash,
    path: &MfsPath,
    options: ResolveOptions,
) -> Result<Resolution>
where
    S: BlockStore + ?Sized,
{
    let start = match path.path_root() {
        PathRoot::Mfs => *mfs_root,
        PathRoot::Dag(hash) => hash,
    };

    let mut current = ChainEntry {
        name: String::new(),
        entry: Entry::Stored(store.fetch_node(&start).await?),
    };
    let mut ancestors = Vec::with_capacity(path.segments().len());
    let last = path.segments().len().saturating_sub(1);

    for (depth, segment) in path.segments().iter().enumerate() {
        if !current.node().is_directory() {
            return Err(Error::not_a_directory(path.display_prefix(depth)));
        }

        let entry = match current.node().link(segment) {
            Some(link) => Entry::Stored(store.fetch_node(&link.hash).await?),
            None => {
                let create = if depth == last {
                    options.create_last_component
                } else {
                    options.create_intermediate
                };
                if !create {
                    return Err(Error::path_not_found(path.display_prefix(depth + 1)));
                }
                Entry::Synthesized(Node::directory())
            }
        };

        let next = ChainEntry {
            name: segment.clone(),
            entry,
        };
        ancestors.push(std::mem::replace(&mut current, next));
    }

    tracing::debug!(
        path = %path,
        depth = ancestors.len(),
        exists = current.entry.exists(),
        "Resolved path"
    );

    Ok(Resolution {
        path: path.clone(),
        ancestors,
        target: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::node::{Link, NodeKind};

    /// Builds `/docs/readme.md` and `/empty/` and returns the root hash.
    async fn fixture(store: &MemoryStore) -> Hash {
        let encoding = store.default_encoding();
        let readme = store
            .put_node(Node::file(b"read me".to_vec()), encoding)
            .await
            .unwrap();
        let docs = store
            .put_node(
                Node::directory_with_links(vec![
                    Link::new("readme.md", readme.hash, readme.node.logical_size()).unwrap(),
                ])
                .unwrap(),
                encoding,
            )
            .await
            .unwrap();
        let empty = store.put_node(Node::directory(), encoding).await.unwrap();
        let root = store
            .put_node(
                Node::directory_with_links(vec![
                    Link::new("docs", docs.hash, docs.cumulative_size()).unwrap(),
                    Link::new("empty", empty.hash, empty.cumulative_size()).unwrap(),
                ])
                .unwrap(),
                encoding,
            )
            .await
            .unwrap();
        root.hash
    }

    fn path(input: &str) -> MfsPath {
        MfsPath::parse(input).unwrap()
    }

    #[tokio::test]
    async fn test_resolve_root() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;

        let resolution = resolve(&store, &root, &MfsPath::root(), ResolveOptions::default())
            .await
            .unwrap();
        assert!(resolution.ancestors.is_empty());
        assert_eq!(resolution.block().unwrap().hash, root);
    }

    #[tokio::test]
    async fn test_resolve_nested_file() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;

        let resolution = resolve(
            &store,
            &root,
            &path("/docs/readme.md"),
            ResolveOptions::default(),
        )
        .await
        .unwrap();

        let names: Vec<_> = resolution.ancestors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["", "docs"]);
        assert_eq!(resolution.target.name, "readme.md");
        assert_eq!(resolution.target.node().kind(), NodeKind::File);
        assert_eq!(resolution.target.node().data(), b"read me");
    }

    #[tokio::test]
    async fn test_resolve_missing() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;

        let err = resolve(&store, &root, &path("/docs/nope/x"), ResolveOptions::default())
            .await
            .unwrap_err();
        match err {
            Error::PathNotFound { path } => assert_eq!(path, "/docs/nope"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_through_file() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;

        let err = resolve(
            &store,
            &root,
            &path("/docs/readme.md/x"),
            ResolveOptions::creating(true),
        )
        .await
        .unwrap_err();
        match err {
            Error::NotADirectory { path } => assert_eq!(path, "/docs/readme.md"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_last_component_only() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;
        let options = ResolveOptions {
            create_intermediate: false,
            create_last_component: true,
        };

        let resolution = resolve(&store, &root, &path("/docs/new"), options)
            .await
            .unwrap();
        assert!(!resolution.exists());
        assert!(resolution.target.node().is_directory());
        assert!(resolution.ancestors.iter().all(|a| a.entry.exists()));

        // Intermediate segments still have to exist
        assert!(matches!(
            resolve(&store, &root, &path("/a/b"), options).await,
            Err(Error::PathNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_intermediate() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;
        let len_before = store.len();

        let resolution = resolve(&store, &root, &path("/a/b/c"), ResolveOptions::creating(true))
            .await
            .unwrap();
        assert_eq!(resolution.ancestors.len(), 3);
        assert!(resolution.ancestors[0].entry.exists());
        assert!(!resolution.ancestors[1].entry.exists());
        assert!(!resolution.ancestors[2].entry.exists());
        assert!(!resolution.exists());

        // Nothing is written while resolving
        assert_eq!(store.len(), len_before);
    }

    #[tokio::test]
    async fn test_resolve_content_reference() {
        let store = MemoryStore::new();
        let root = fixture(&store).await;
        let docs = resolve(&store, &root, &path("/docs"), ResolveOptions::default())
            .await
            .unwrap();
        let docs_hash = docs.block().unwrap().hash;

        // The MFS root argument is ignored for content references
        let other_root = store
            .put_node(Node::directory(), store.default_encoding())
            .await
            .unwrap()
            .hash;
        let resolution = resolve(
            &store,
            &other_root,
            &path(&format!("/dag/{}/readme.md", docs_hash)),
            ResolveOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(resolution.target.node().data(), b"read me");
    }
}
