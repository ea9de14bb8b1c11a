//! Inserting a link into a directory node.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::node::{Link, Node};
use crate::path::MfsPath;

/// Return a copy of `parent` with a link to `hash` appended under `name`.
///
/// `parent_path` names `parent` in errors. `size` is recorded as given.
/// Copies pass the child's logical size, so a copied directory is linked
/// with size zero.
pub fn add_link(
    parent: &Node,
    parent_path: &MfsPath,
    name: &str,
    hash: Hash,
    size: u64,
) -> Result<Node> {
    if !parent.is_directory() {
        return Err(Error::not_a_directory(parent_path.to_string()));
    }
    if parent.link(name).is_some() {
        return Err(Error::collision(name));
    }

    Ok(parent.with_link_appended(Link::new(name, hash, size)?))
}
