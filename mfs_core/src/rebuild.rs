//! Propagating a changed node up to a new root.

use crate::block::{Block, BlockStore};
use crate::error::Result;
use crate::node::{Encoding, Link, Node};
use crate::resolve::ChainEntry;

/// Store `node` and rewrite every ancestor to point at its new version.
///
/// `ancestors` runs root first. `name` is the link under which `node` hangs
/// off the last ancestor. Each ancestor keeps the link's position when it
/// already had one; ancestors that were synthesized during resolution gain
/// the link at the end. Returns the new root block.
pub async fn rebuild<S>(
    store: &S,
    encoding: Encoding,
    ancestors: &[ChainEntry],
    name: &str,
    node: Node,
) -> Result<Block>
where
    S: BlockStore + ?Sized,
{
    let mut child = store.put_node(node, encoding).await?;
    let mut child_name = name;

    for ancestor in ancestors.iter().rev() {
        let link = Link::new(child_name, child.hash, child.cumulative_size())?;
        let parent = ancestor.node().with_link_set(link);

        tracing::debug!(
            name = %child_name,
            child = %child.hash,
            "Relinking rebuilt child"
        );

        child = store.put_node(parent, encoding).await?;
        child_name = &ancestor.name;
    }

    Ok(child)
}
