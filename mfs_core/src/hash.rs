//! Content hashing with BLAKE3 or SHA2-256.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest;
use std::fmt;

/// Hash digest size in bytes (both algorithms produce 256-bit hashes).
pub const HASH_SIZE: usize = 32;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// BLAKE3 with 256-bit output.
    #[default]
    Blake3,
    /// SHA2 with 256-bit output.
    Sha2_256,
}

impl Algorithm {
    /// Returns the string representation of the algorithm (for config files).
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Blake3 => "blake3-256",
            Algorithm::Sha2_256 => "sha2-256",
        }
    }

    /// Parse algorithm from string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blake3-256" | "blake3" => Ok(Algorithm::Blake3),
            "sha2-256" => Ok(Algorithm::Sha2_256),
            _ => Err(Error::encoding(format!("Unsupported hash algorithm: {}", s))),
        }
    }

    /// Returns the algorithm ID byte (for object headers).
    pub fn id(&self) -> u8 {
        match self {
            Algorithm::Blake3 => 1,
            Algorithm::Sha2_256 => 2,
        }
    }

    /// Parse algorithm from ID byte.
    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            1 => Ok(Algorithm::Blake3),
            2 => Ok(Algorithm::Sha2_256),
            _ => Err(Error::encoding(format!("Unsupported hash algorithm ID {}", id))),
        }
    }

    /// Hash raw bytes with this algorithm.
    pub fn digest(&self, data: &[u8]) -> Hash {
        match self {
            Algorithm::Blake3 => Hash(*blake3::hash(data).as_bytes()),
            Algorithm::Sha2_256 => Hash(sha2::Sha256::digest(data).into()),
        }
    }
}

/// A 32-byte content hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a Hash from raw bytes.
    pub fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    /// Create a Hash from a hex string (64 hex characters).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        if hex_str.len() != HASH_SIZE * 2 {
            return Err(Error::invalid_hash(format!(
                "Expected {} hex characters, got {}",
                HASH_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes =
            hex::decode(hex_str).map_err(|e| Error::invalid_hash(format!("Invalid hex: {}", e)))?;

        let mut hash = [0u8; HASH_SIZE];
        hash.copy_from_slice(&bytes);
        Ok(Hash(hash))
    }

    /// Convert to hex string (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get the first 2 hex characters (for directory sharding).
    pub fn prefix(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// Get the remaining 62 hex characters (for filename).
    pub fn suffix(&self) -> String {
        hex::encode(&self.0[1..])
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_empty() {
        let hash = Algorithm::Blake3.digest(b"");
        assert_eq!(hash.to_hex().len(), 64);
    }

    #[test]
    fn test_hash_hello_world() {
        let hex = Algorithm::Blake3.digest(b"hello world").to_hex();

        // BLAKE3 of "hello world"
        assert_eq!(
            hex,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn test_sha2_hello_world() {
        let hex = Algorithm::Sha2_256.digest(b"hello world").to_hex();

        assert_eq!(
            hex,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_algorithms_disagree() {
        assert_ne!(
            Algorithm::Blake3.digest(b"data"),
            Algorithm::Sha2_256.digest(b"data")
        );
    }

    #[test]
    fn test_hash_from_hex_invalid_length() {
        assert!(Hash::from_hex("abcd").is_err());
        assert!(Hash::from_hex("").is_err());
    }

    #[test]
    fn test_hash_from_hex_invalid_chars() {
        let invalid = "z".repeat(64);
        assert!(Hash::from_hex(&invalid).is_err());
    }

    #[test]
    fn test_hash_serializes_as_hex() {
        let hash = Algorithm::Blake3.digest(b"test");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));

        let parsed: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_algorithm_conversions() {
        assert_eq!(Algorithm::Blake3.as_str(), "blake3-256");
        assert_eq!(Algorithm::Sha2_256.as_str(), "sha2-256");
        assert_eq!(Algorithm::Blake3.id(), 1);
        assert_eq!(Algorithm::Sha2_256.id(), 2);

        assert_eq!(Algorithm::parse("blake3-256").unwrap(), Algorithm::Blake3);
        assert_eq!(Algorithm::parse("sha2-256").unwrap(), Algorithm::Sha2_256);
        assert_eq!(Algorithm::from_id(2).unwrap(), Algorithm::Sha2_256);

        assert!(matches!(
            Algorithm::parse("md5"),
            Err(Error::Encoding { .. })
        ));
        assert!(Algorithm::from_id(99).is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    fn arb_algorithm() -> impl Strategy<Value = Algorithm> {
        prop::sample::select(vec![Algorithm::Blake3, Algorithm::Sha2_256])
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Hashing the same data always produces the same hash
        #[test]
        fn prop_hash_deterministic(data: Vec<u8>, algo in arb_algorithm()) {
            prop_assert_eq!(algo.digest(&data), algo.digest(&data));
        }

        /// Prefix + suffix reconstruction equals full hex
        #[test]
        fn prop_prefix_suffix_concat(bytes in prop::array::uniform32(any::<u8>())) {
            let hash = Hash::from_bytes(bytes);
            let reconstructed = format!("{}{}", hash.prefix(), hash.suffix());
            prop_assert_eq!(hash.to_hex(), reconstructed);
        }

        /// Invalid hex length always fails
        #[test]
        fn prop_invalid_hex_length_fails(
            s in "[0-9a-f]{0,63}|[0-9a-f]{65,128}"
        ) {
            prop_assert!(Hash::from_hex(&s).is_err());
        }

        /// Algorithm string and id conversions agree
        #[test]
        fn prop_algorithm_roundtrip(algo in arb_algorithm()) {
            prop_assert_eq!(Algorithm::parse(algo.as_str())?, algo);
            prop_assert_eq!(Algorithm::from_id(algo.id())?, algo);
        }
    }
}
