//! Content-defined chunking using FastCDC.

use std::ops::Range;

/// Configuration for the chunker.
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Minimum chunk size in bytes.
    pub min_size: usize,
    /// Average (target) chunk size in bytes.
    pub avg_size: usize,
    /// Maximum chunk size in bytes.
    pub max_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_size: 256 * 1024,  // 256 KB
            avg_size: 512 * 1024,  // 512 KB
            max_size: 1024 * 1024, // 1 MB
        }
    }
}

/// Split data into content-defined chunks using FastCDC.
///
/// Returns the byte range of each chunk, in order.
pub fn chunk_ranges(data: &[u8], config: &ChunkerConfig) -> Vec<Range<usize>> {
    use fastcdc::ronomon::FastCDC;

    FastCDC::new(data, config.min_size, config.avg_size, config.max_size)
        .map(|chunk| chunk.offset..chunk.offset + chunk.length)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_ranges_basic() {
        let data = vec![0u8; 2 * 1024 * 1024];
        let config = ChunkerConfig::default();

        let ranges = chunk_ranges(&data, &config);

        assert!(
            ranges.len() >= 2,
            "Expected at least 2 chunks, got {}",
            ranges.len()
        );

        let total: usize = ranges.iter().map(|r| r.len()).sum();
        assert_eq!(total, data.len());

        for range in &ranges {
            assert!(range.len() >= config.min_size);
            assert!(range.len() <= config.max_size);
        }
    }

    #[test]
    fn test_chunk_ranges_contiguous() {
        let data = (0..3 * 1024 * 1024)
            .map(|i| (i % 251) as u8)
            .collect::<Vec<_>>();

        let ranges = chunk_ranges(&data, &ChunkerConfig::default());

        let mut expected_start = 0;
        for range in &ranges {
            assert_eq!(range.start, expected_start);
            expected_start = range.end;
        }
        assert_eq!(expected_start, data.len());
    }

    #[test]
    fn test_deterministic() {
        let data = vec![42u8; 2 * 1024 * 1024];
        let config = ChunkerConfig::default();

        assert_eq!(chunk_ranges(&data, &config), chunk_ranges(&data, &config));
    }

    #[test]
    fn test_small_input_single_chunk() {
        let data = vec![0u8; 100 * 1024];
        let ranges = chunk_ranges(&data, &ChunkerConfig::default());

        assert_eq!(ranges, vec![0..data.len()]);
    }

    #[test]
    fn test_empty_input() {
        assert!(chunk_ranges(&[], &ChunkerConfig::default()).is_empty());
    }
}
