//! # MFS Core
//!
//! A mutable file tree over a content-addressed Merkle DAG.
//!
//! Every node is immutable and identified by the hash of its encoding. A
//! single mutable pointer, the MFS root, names the directory node that
//! currently represents `/`. Copying a path links an existing hash into a
//! directory, rebuilds every ancestor up to a new root and publishes it in
//! one step, so a failed operation never leaves a partial tree behind.
//!
//! ## Features
//!
//! - `cp` and `stat` over absolute paths, plus `mkdir` and `flush`
//! - Copy-by-reference: file content is never read or duplicated
//! - Pluggable block stores: on-disk [`Store`] and in-memory [`MemoryStore`]
//! - `dag-bin` and `dag-json` node formats, BLAKE3 and SHA-256 hashes
//! - Import of local files and directories with content-defined chunking
//!
//! ## Example
//!
//! ```no_run
//! use mfs_core::{CopyOptions, Encoding, Mfs, StatOptions, Store};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize a new store and import a local file
//! let store = Store::init("./my-store", Encoding::default())?;
//! let block = store.add_path(Path::new("./notes.txt"))?;
//!
//! // Open the mutable tree and link the file into it
//! let mfs = Mfs::open(store).await?;
//! mfs.cp([format!("/dag/{}", block.hash)], "/notes.txt", CopyOptions::default())
//!     .await?;
//!
//! let stat = mfs.stat("/notes.txt", StatOptions::default()).await?;
//! println!("{:?}", stat);
//! # Ok(())
//! # }
//! ```

mod block;
mod chunking;
mod copy;
mod error;
mod hash;
mod link;
mod memory;
mod mfs;
mod mkdir;
mod node;
mod object;
mod path;
mod rebuild;
mod refs;
mod resolve;
mod root;
mod stat;
mod store;
mod walk;

pub use block::{Block, BlockStore};
pub use copy::{CopyOptions, CopyRequest};
pub use error::{Error, Result};
pub use hash::{Algorithm, Hash};
pub use link::add_link;
pub use memory::MemoryStore;
pub use mfs::Mfs;
pub use mkdir::MkdirOptions;
pub use node::{Encoding, Format, Link, Node, NodeKind};
pub use object::{CompressionType, ObjectHeader};
pub use path::{DestinationDescriptor, MfsPath, PathRoot, SourceDescriptor};
pub use rebuild::rebuild;
pub use refs::{ROOT_REF, RefManager};
pub use resolve::{ChainEntry, Entry, Resolution, ResolveOptions, resolve};
pub use root::{MfsRoot, RootWriter};
pub use stat::{NodeStat, StatOptions, StatOutput};
pub use store::Store;
