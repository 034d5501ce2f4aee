//! Perceptual hash engine.
//!
//! Two independent hash families are computed from normalized grayscale
//! buffers and compared by Hamming distance: difference hashes (neighbor
//! thresholding on pixels) and DCT perceptual hashes (thresholding on the
//! low-frequency spectrum). The a-hash variant thresholds DCT coefficients
//! against their median; the d-hash variant difference-thresholds consecutive
//! DCT rows, the same scheme as `dhash` but applied to coefficients instead
//! of pixels.

pub mod dct;

pub use dct::dct2;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::{resize_area, resize_bilinear, GrayImageF32};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HashError {
    /// Comparing hashes of different bit lengths is a programming or
    /// configuration error and is never silently coerced.
    #[error("Hash shape mismatch: {left} bits vs {right} bits")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Invalid hex hash string: {0:?}")]
    InvalidHex(String),
}

/// Immutable fixed-length bit vector, packed into u64 words.
///
/// Equality is bitwise; distance is the Hamming distance over the flattened
/// bits. Typical lengths are 64 (8x8 grid) or 72 (8x9 grid).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHash {
    bit_len: usize,
    words: Vec<u64>,
}

impl ImageHash {
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut words = vec![0u64; bits.len().div_ceil(64)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                words[i / 64] |= 1u64 << (i % 64);
            }
        }
        Self {
            bit_len: bits.len(),
            words,
        }
    }

    /// Number of bits in the hash.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.bit_len);
        self.words[index / 64] >> (index % 64) & 1 == 1
    }

    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn from_words(bit_len: usize, words: Vec<u64>) -> Self {
        debug_assert_eq!(words.len(), bit_len.div_ceil(64));
        Self { bit_len, words }
    }

    /// Hamming distance to another hash of the same bit length.
    pub fn distance(&self, other: &ImageHash) -> Result<u32, HashError> {
        if self.bit_len != other.bit_len {
            return Err(HashError::ShapeMismatch {
                left: self.bit_len,
                right: other.bit_len,
            });
        }
        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Hex encoding, most significant bit first, zero-padded to whole nibbles.
    pub fn to_hex(&self) -> String {
        let nibbles = self.bit_len.div_ceil(4);
        let mut out = String::with_capacity(nibbles);
        for n in 0..nibbles {
            let mut value = 0u8;
            for b in 0..4 {
                let index = n * 4 + b;
                value <<= 1;
                if index < self.bit_len && self.bit(index) {
                    value |= 1;
                }
            }
            out.push(char::from_digit(u32::from(value), 16).unwrap());
        }
        out
    }

    /// Decode a hex string into a hash of `4 * len` bits.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        let mut bits = Vec::with_capacity(hex.len() * 4);
        for c in hex.chars() {
            let value = c
                .to_digit(16)
                .ok_or_else(|| HashError::InvalidHex(hex.to_string()))?;
            for b in (0..4).rev() {
                bits.push(value >> b & 1 == 1);
            }
        }
        Ok(Self::from_bits(&bits))
    }
}

/// Difference hash: resize to `(size+1) x size` and threshold each pixel
/// against its left neighbor. Produces `size * size` bits.
pub fn dhash(gray: &GrayImageF32, hash_size: usize) -> ImageHash {
    let resized = resize_area(gray, hash_size + 1, hash_size);
    let mut bits = Vec::with_capacity(hash_size * hash_size);
    for y in 0..hash_size {
        for x in 0..hash_size {
            bits.push(resized.get(x + 1, y) > resized.get(x, y));
        }
    }
    ImageHash::from_bits(&bits)
}

/// Vertical difference hash: resize to `size x (size+1)` and threshold each
/// pixel against the one above it.
pub fn dhash_vertical(gray: &GrayImageF32, hash_size: usize) -> ImageHash {
    let resized = resize_area(gray, hash_size, hash_size + 1);
    let mut bits = Vec::with_capacity(hash_size * hash_size);
    for y in 0..hash_size {
        for x in 0..hash_size {
            bits.push(resized.get(x, y + 1) > resized.get(x, y));
        }
    }
    ImageHash::from_bits(&bits)
}

/// DCT perceptual hash, median variant: resize to `size x size`, transform,
/// threshold the low-frequency block against its median.
pub fn phash_a(gray: &GrayImageF32, hash_size: usize) -> ImageHash {
    let resized = resize_area(gray, hash_size, hash_size);
    let spectrum = dct2(&resized);
    ahash_from_spectrum(&spectrum, hash_size)
}

/// DCT perceptual hash, difference variant: resize to `size x (size+1)`,
/// transform, difference-threshold consecutive rows of the low-frequency
/// `(size+1) x size` block. Produces `size * size` bits.
pub fn phash_d(gray: &GrayImageF32, hash_size: usize) -> ImageHash {
    let resized = resize_area(gray, hash_size, hash_size + 1);
    let spectrum = dct2(&resized);
    dhash_from_spectrum(&spectrum, hash_size)
}

/// Compute both perceptual-hash variants from a single resize and DCT.
///
/// `target_size` is the `(width, height)` of the DCT input; bilinear is used
/// when upscaling toward it, area averaging otherwise.
pub fn multi_phash(
    gray: &GrayImageF32,
    target_size: (usize, usize),
    hash_size: usize,
) -> (ImageHash, ImageHash) {
    let (w, h) = target_size;
    debug_assert!(w >= hash_size && h >= hash_size + 1);
    let resized = if gray.height() < h {
        resize_bilinear(gray, w, h)
    } else {
        resize_area(gray, w, h)
    };
    let spectrum = dct2(&resized);
    (
        ahash_from_spectrum(&spectrum, hash_size),
        dhash_from_spectrum(&spectrum, hash_size),
    )
}

fn ahash_from_spectrum(spectrum: &GrayImageF32, hash_size: usize) -> ImageHash {
    let mut block = Vec::with_capacity(hash_size * hash_size);
    for y in 0..hash_size {
        for x in 0..hash_size {
            block.push(spectrum.get(x, y));
        }
    }
    let median = median_of(&block);
    let bits: Vec<bool> = block.iter().map(|&v| v > median).collect();
    ImageHash::from_bits(&bits)
}

fn dhash_from_spectrum(spectrum: &GrayImageF32, hash_size: usize) -> ImageHash {
    let mut bits = Vec::with_capacity(hash_size * hash_size);
    for y in 0..hash_size {
        for x in 0..hash_size {
            bits.push(spectrum.get(x, y + 1) > spectrum.get(x, y));
        }
    }
    ImageHash::from_bits(&bits)
}

fn median_of(values: &[f32]) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
