//! On-disk object format.
//!
//! Objects are stored with a 16-byte header followed by the payload:
//!
//! ```text
//! 0x00  4   "MFSB" magic
//! 0x04  1   version (u8) = 1
//! 0x05  1   format: 1=dag-bin, 2=dag-json
//! 0x06  1   algo: 1=blake3-256, 2=sha2-256
//! 0x07  1   compression: 0=none, 1=zstd
//! 0x08  8   payload_len (u64 LE) - stored (possibly compressed) size
//! 0x10  ... payload
//! ```
//!
//! The object hash is always computed over the uncompressed encoded node.

use crate::error::{Error, Result};
use crate::hash::Algorithm;
use crate::node::{Encoding, Format};

/// Magic bytes at the start of every object file.
pub const MAGIC: &[u8; 4] = b"MFSB";

/// Current object format version.
pub const VERSION: u8 = 1;

/// Size of the object header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Compression types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression.
    None = 0,
    /// Zstandard compression.
    Zstd = 1,
}

impl CompressionType {
    /// Convert to byte representation.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse from byte representation.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(CompressionType::None),
            1 => Ok(CompressionType::Zstd),
            _ => Err(Error::encoding(format!(
                "Invalid compression type: {}",
                value
            ))),
        }
    }
}

/// A 16-byte object header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeader {
    /// Object format version.
    pub version: u8,
    /// Node encoding and hash algorithm.
    pub encoding: Encoding,
    /// Compression type.
    pub compression: CompressionType,
    /// Length of the payload in bytes (compressed size if compressed).
    pub payload_len: u64,
}

impl ObjectHeader {
    /// Create a new object header.
    pub fn new(encoding: Encoding, compression: CompressionType, payload_len: u64) -> Self {
        Self {
            version: VERSION,
            encoding,
            compression,
            payload_len,
        }
    }

    /// Encode the header to a 16-byte array.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];

        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = self.version;
        buf[5] = self.encoding.format.id();
        buf[6] = self.encoding.algorithm.id();
        buf[7] = self.compression.to_u8();
        buf[8..16].copy_from_slice(&self.payload_len.to_le_bytes());

        buf
    }

    /// Decode a header from a 16-byte array.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::encoding(format!(
                "Header too short: {} bytes (expected {})",
                buf.len(),
                HEADER_SIZE
            )));
        }

        if &buf[0..4] != MAGIC {
            return Err(Error::encoding(format!(
                "Invalid magic: expected {:?}, got {:?}",
                MAGIC,
                &buf[0..4]
            )));
        }

        let version = buf[4];
        if version != VERSION {
            return Err(Error::encoding(format!(
                "Unsupported version: {} (expected {})",
                version, VERSION
            )));
        }

        let format = Format::from_id(buf[5])?;
        let algorithm = Algorithm::from_id(buf[6])?;
        let compression = CompressionType::from_u8(buf[7])?;

        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&buf[8..16]);
        let payload_len = u64::from_le_bytes(len_bytes);

        Ok(Self {
            version,
            encoding: Encoding::new(format, algorithm),
            compression,
            payload_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(version: u8, format: u8, algo: u8, compression: u8) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(MAGIC);
        buf[4] = version;
        buf[5] = format;
        buf[6] = algo;
        buf[7] = compression;
        buf
    }

    #[test]
    fn test_header_encode_decode() {
        let header = ObjectHeader::new(
            Encoding::new(Format::DagJson, Algorithm::Sha2_256),
            CompressionType::Zstd,
            1024,
        );
        let encoded = header.encode();

        assert_eq!(encoded.len(), HEADER_SIZE);
        assert_eq!(&encoded[0..4], MAGIC);

        let decoded = ObjectHeader::decode(&encoded).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_decode_invalid_magic() {
        let mut buf = header_bytes(VERSION, 1, 1, 0);
        buf[0..4].copy_from_slice(b"XXXX");
        assert!(ObjectHeader::decode(&buf).is_err());
    }

    #[test]
    fn test_header_decode_invalid_version() {
        assert!(ObjectHeader::decode(&header_bytes(99, 1, 1, 0)).is_err());
    }

    #[test]
    fn test_header_decode_invalid_format_and_algorithm() {
        assert!(ObjectHeader::decode(&header_bytes(VERSION, 9, 1, 0)).is_err());
        assert!(ObjectHeader::decode(&header_bytes(VERSION, 1, 9, 0)).is_err());
    }

    #[test]
    fn test_header_decode_invalid_compression() {
        assert!(ObjectHeader::decode(&header_bytes(VERSION, 1, 1, 99)).is_err());
    }

    #[test]
    fn test_header_payload_len() {
        let header = ObjectHeader::new(Encoding::default(), CompressionType::None, 0x123456789ABCDEF0);
        let decoded = ObjectHeader::decode(&header.encode()).unwrap();
        assert_eq!(decoded.payload_len, 0x123456789ABCDEF0);
    }

    #[test]
    fn test_header_too_short() {
        let buf = [0u8; 10];
        assert!(ObjectHeader::decode(&buf).is_err());
    }

    // Property-based tests
    use proptest::prelude::*;

    fn arb_object_header() -> impl Strategy<Value = ObjectHeader> {
        (
            prop::sample::select(vec![Format::DagBin, Format::DagJson]),
            prop::sample::select(vec![Algorithm::Blake3, Algorithm::Sha2_256]),
            prop::sample::select(vec![CompressionType::None, CompressionType::Zstd]),
            any::<u64>(),
        )
            .prop_map(|(format, algorithm, compression, payload_len)| {
                ObjectHeader::new(Encoding::new(format, algorithm), compression, payload_len)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        /// Header serialization round-trip
        #[test]
        fn prop_header_roundtrip(header in arb_object_header()) {
            let decoded = ObjectHeader::decode(&header.encode())?;
            prop_assert_eq!(decoded, header);
        }
    }
}
