//! Per-category nearest-neighbor index over fixed-length bit hashes.
//!
//! Built once from the full catalog, finalized, then immutable: the live
//! pipeline only queries. Entries are packed into one contiguous word matrix
//! so a query is a straight XOR/popcount scan, which at catalog scale (a few
//! thousand 64-bit vectors) always returns the true nearest neighbors.
//! Callers still request a margin of results and inspect only the head, so
//! the contract matches an approximate structure.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::hash::{HashError, ImageHash};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Accumulates hashes before the index is finalized. Ids are assigned in
/// insertion order.
#[derive(Debug)]
pub struct FeatureIndexBuilder {
    bit_len: usize,
    hashes: Vec<ImageHash>,
}

impl FeatureIndexBuilder {
    pub fn new(bit_len: usize) -> Self {
        Self {
            bit_len,
            hashes: Vec::new(),
        }
    }

    /// Insert one vector; returns its id.
    pub fn add(&mut self, hash: ImageHash) -> Result<usize, HashError> {
        if hash.bit_len() != self.bit_len {
            return Err(HashError::ShapeMismatch {
                left: self.bit_len,
                right: hash.bit_len(),
            });
        }
        self.hashes.push(hash);
        Ok(self.hashes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Finalize. The index is immutable from here on.
    pub fn build(self) -> FeatureIndex {
        let words_per_entry = self.bit_len.div_ceil(64);
        let mut words = Vec::with_capacity(self.hashes.len() * words_per_entry);
        for hash in &self.hashes {
            words.extend_from_slice(hash.words());
        }
        FeatureIndex {
            bit_len: self.bit_len,
            words_per_entry,
            len: self.hashes.len(),
            words,
        }
    }
}

/// Finalized, immutable nearest-neighbor index for one feature category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureIndex {
    bit_len: usize,
    words_per_entry: usize,
    len: usize,
    words: Vec<u64>,
}

impl FeatureIndex {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// The stored vector for `id`.
    pub fn entry(&self, id: usize) -> Option<ImageHash> {
        if id >= self.len {
            return None;
        }
        let start = id * self.words_per_entry;
        Some(ImageHash::from_words(
            self.bit_len,
            self.words[start..start + self.words_per_entry].to_vec(),
        ))
    }

    fn distance_to(&self, id: usize, query: &[u64]) -> u32 {
        let start = id * self.words_per_entry;
        self.words[start..start + self.words_per_entry]
            .iter()
            .zip(query)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// The `n` nearest ids and distances, in non-decreasing distance order
    /// (ties by ascending id).
    pub fn query(&self, hash: &ImageHash, n: usize) -> Result<Vec<(usize, u32)>, HashError> {
        if hash.bit_len() != self.bit_len {
            return Err(HashError::ShapeMismatch {
                left: self.bit_len,
                right: hash.bit_len(),
            });
        }
        let query = hash.words();

        #[cfg(feature = "parallel")]
        let mut results: Vec<(usize, u32)> = (0..self.len)
            .into_par_iter()
            .map(|id| (id, self.distance_to(id, query)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let mut results: Vec<(usize, u32)> = (0..self.len)
            .map(|id| (id, self.distance_to(id, query)))
            .collect();

        results.sort_unstable_by_key(|&(id, dist)| (dist, id));
        results.truncate(n);
        Ok(results)
    }

    /// Persist the finalized index; `load` restores it query-identical.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create index file: {:?}", path.as_ref()))?;
        bincode::serialize_into(BufWriter::new(file), self)
            .with_context(|| format!("Failed to serialize index: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open index file: {:?}", path.as_ref()))?;
        let index: FeatureIndex = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Failed to deserialize index: {:?}", path.as_ref()))?;
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Distinct values give provably distinct hashes: the bits are the binary
    // representation of the value itself.
    fn bits64(value: u64) -> ImageHash {
        let bits: Vec<bool> = (0..64).map(|i| value >> i & 1 == 1).collect();
        ImageHash::from_bits(&bits)
    }

    fn sample_index(n: usize) -> FeatureIndex {
        let mut builder = FeatureIndexBuilder::new(64);
        for i in 0..n {
            builder.add(bits64(i as u64 + 1)).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_exact_query_returns_id_at_distance_zero() {
        let index = sample_index(50);
        for id in [0usize, 17, 49] {
            let query = index.entry(id).unwrap();
            let results = index.query(&query, 20).unwrap();
            assert_eq!(results[0], (id, 0));
        }
    }

    #[test]
    fn test_results_sorted_non_decreasing() {
        let index = sample_index(30);
        let results = index.query(&bits64(1000), 30).unwrap();
        assert_eq!(results.len(), 30);
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn test_builder_rejects_wrong_shape() {
        let mut builder = FeatureIndexBuilder::new(64);
        let short = ImageHash::from_bits(&[true; 16]);
        assert!(builder.add(short).is_err());
    }

    #[test]
    fn test_query_rejects_wrong_shape() {
        let index = sample_index(4);
        let short = ImageHash::from_bits(&[true; 16]);
        assert!(matches!(
            index.query(&short, 5),
            Err(HashError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions_a.idx");
        let index = sample_index(25);
        let query = bits64(77);
        let before = index.query(&query, 20).unwrap();

        index.save(&path).unwrap();
        let reloaded = FeatureIndex::load(&path).unwrap();
        let after = reloaded.query(&query, 20).unwrap();

        assert_eq!(before, after);
        assert_eq!(index.entry(3), reloaded.entry(3));
    }

    #[test]
    fn test_entry_out_of_range() {
        let index = sample_index(3);
        assert!(index.entry(3).is_none());
    }
}
