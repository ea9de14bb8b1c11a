//! Named references, including the persisted MFS root.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::store::Store;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

/// Name of the reference holding the published MFS root.
pub const ROOT_REF: &str = "mfs-root";

/// Manages named references in the store.
pub struct RefManager<'a> {
    store: &'a Store,
}

impl<'a> RefManager<'a> {
    /// Create a new RefManager for the given store.
    pub(crate) fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Get the path to a reference file.
    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        // Validate name - no path traversal
        if name.contains("..") || name.contains('/') || name.contains('\\') {
            return Err(Error::invalid_ref(format!(
                "Invalid ref name: {} (must not contain .. or path separators)",
                name
            )));
        }

        if name.is_empty() {
            return Err(Error::invalid_ref("Ref name cannot be empty"));
        }

        Ok(self.store.root().join("refs").join(name))
    }

    /// Add or update a reference.
    ///
    /// Appends the hash to the ref file (one hash per line) in a single
    /// write. The last valid line is the current value, so a torn append
    /// leaves the previous value in effect. A torn tail is terminated before
    /// the new line goes in, so it cannot swallow the next value.
    pub fn add(&self, name: &str, hash: &Hash) -> Result<()> {
        let path = self.ref_path(name)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut line = String::new();
        if has_torn_tail(&mut file)? {
            tracing::warn!(reference = name, "Terminating torn ref line");
            line.push('\n');
        }
        line.push_str(&hash.to_hex());
        line.push('\n');

        file.write_all(line.as_bytes())?;
        file.sync_data()?;

        Ok(())
    }

    /// Get the current value of a reference.
    pub fn get(&self, name: &str) -> Result<Option<Hash>> {
        Ok(self.history(name)?.pop())
    }

    /// Every value the reference has held, oldest first.
    ///
    /// Empty lines, `#` comments and lines that do not parse as a hash are skipped.
    pub fn history(&self, name: &str) -> Result<Vec<Hash>> {
        let path = self.ref_path(name)?;

        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        let hashes = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| Hash::from_hex(line).ok())
            .collect();

        Ok(hashes)
    }
}

/// Whether a non-empty file ends without a newline.
fn has_torn_tail(file: &mut fs::File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Algorithm;
    use crate::node::Encoding;
    use tempfile::TempDir;

    fn init_store(temp_dir: &TempDir) -> Store {
        Store::init(temp_dir.path(), Encoding::default()).unwrap()
    }

    #[test]
    fn test_ref_add_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);
        let refs = store.refs();

        let hash = Algorithm::Blake3.digest(b"test");
        refs.add("myref", &hash).unwrap();

        assert_eq!(refs.get("myref").unwrap(), Some(hash));
    }

    #[test]
    fn test_ref_get_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);

        assert_eq!(store.refs().get("nonexistent").unwrap(), None);
    }

    #[test]
    fn test_ref_update_keeps_history() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);
        let refs = store.refs();

        let hash1 = Algorithm::Blake3.digest(b"test1");
        let hash2 = Algorithm::Blake3.digest(b"test2");

        refs.add(ROOT_REF, &hash1).unwrap();
        refs.add(ROOT_REF, &hash2).unwrap();

        assert_eq!(refs.get(ROOT_REF).unwrap(), Some(hash2));
        assert_eq!(refs.history(ROOT_REF).unwrap(), vec![hash1, hash2]);
    }

    #[test]
    fn test_ref_torn_line_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);
        let refs = store.refs();

        let hash = Algorithm::Blake3.digest(b"published");
        refs.add(ROOT_REF, &hash).unwrap();

        // Simulate a crash halfway through the next append
        let path = temp_dir.path().join("refs").join(ROOT_REF);
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"d74981efa70a0c88").unwrap();

        assert_eq!(refs.get(ROOT_REF).unwrap(), Some(hash));
    }

    #[test]
    fn test_ref_add_after_torn_line() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);
        let refs = store.refs();

        let first = Algorithm::Blake3.digest(b"first");
        let second = Algorithm::Blake3.digest(b"second");
        refs.add(ROOT_REF, &first).unwrap();

        let path = temp_dir.path().join("refs").join(ROOT_REF);
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"d74981efa70a0c88").unwrap();
        drop(file);

        refs.add(ROOT_REF, &second).unwrap();

        assert_eq!(refs.get(ROOT_REF).unwrap(), Some(second));
        assert_eq!(refs.history(ROOT_REF).unwrap(), vec![first, second]);

        // Later appends land on their own lines again
        let third = Algorithm::Blake3.digest(b"third");
        refs.add(ROOT_REF, &third).unwrap();
        assert_eq!(refs.history(ROOT_REF).unwrap(), vec![first, second, third]);
    }

    #[test]
    fn test_ref_invalid_name() {
        let temp_dir = TempDir::new().unwrap();
        let store = init_store(&temp_dir);
        let refs = store.refs();

        let hash = Algorithm::Blake3.digest(b"test");

        assert!(refs.add("../etc/passwd", &hash).is_err());
        assert!(refs.add("foo/bar", &hash).is_err());
        assert!(refs.add("", &hash).is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Valid ref names are accepted and read back
        #[test]
        fn prop_valid_ref_names_accepted(name in "[a-zA-Z0-9_-]{1,50}") {
            let temp_dir = TempDir::new().unwrap();
            let store = init_store(&temp_dir);
            let refs = store.refs();

            let hash = Algorithm::Blake3.digest(b"test data");

            prop_assert!(refs.add(&name, &hash).is_ok(), "Valid ref name '{}' should be accepted", name);
            prop_assert_eq!(refs.get(&name)?, Some(hash));
        }
    }
}
