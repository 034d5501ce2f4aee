//! Extraction configuration: hash geometry and the normalized crop layouts.

use serde::{Deserialize, Serialize};

/// Card art reference size the crop fractions were measured against.
pub const REFERENCE_WIDTH: u32 = 420;
pub const REFERENCE_HEIGHT: u32 = 720;

/// Action-card feature crops as fractions of the card region: (left, top,
/// width, height). Measured at 420x720; crop 2's width/height are forced from
/// crops 0 and 1 at resize time.
pub const ACTION_CROPS: [[f32; 4]; 3] = [
    [70.0 / 420.0, 320.0 / 720.0, 100.0 / 420.0, 300.0 / 720.0],
    [180.0 / 420.0, 220.0 / 720.0, 100.0 / 420.0, 200.0 / 720.0],
    [222.0 / 420.0, 508.0 / 720.0, 100.0 / 420.0, 100.0 / 720.0],
];

/// Character-card feature crops: same stitching scheme, sampled from the art
/// band instead of the text box.
pub const CHARACTER_CROPS: [[f32; 4]; 3] = [
    [40.0 / 420.0, 110.0 / 720.0, 120.0 / 420.0, 360.0 / 720.0],
    [200.0 / 420.0, 90.0 / 720.0, 120.0 / 420.0, 240.0 / 720.0],
    [190.0 / 420.0, 430.0 / 720.0, 120.0 / 420.0, 120.0 / 720.0],
];

/// Hash geometry shared by all extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Side of the hash grid; hashes carry `hash_size * hash_size` bits.
    pub hash_size: usize,
    /// `(width, height)` the stitched buffer is resampled to before the DCT.
    pub feature_size: (usize, usize),
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            hash_size: 8,
            feature_size: (32, 32),
        }
    }
}

impl ExtractorConfig {
    pub fn bit_len(&self) -> usize {
        self.hash_size * self.hash_size
    }
}
