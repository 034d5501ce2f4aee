//! Feature extraction: turning a cropped screen region into hash vectors.
//!
//! Cards (action and character) stitch three sub-crops into one buffer and
//! produce an a-hash/d-hash pair; controls and digits hash the raw region
//! with the single d-of-DCT variant.

pub mod card;
pub mod config;

pub use card::CardExtractor;
pub use config::{ExtractorConfig, ACTION_CROPS, CHARACTER_CROPS};

use image::RgbaImage;

use crate::hash::{phash_d, ImageHash};
use crate::utils::normalize;

/// Hash a control region (buttons, banners). Single d-hash-of-DCT, no
/// stitching.
pub fn extract_control(image: &RgbaImage, hash_size: usize) -> ImageHash {
    phash_d(&normalize(image), hash_size)
}

/// Hash a digit/banner region. Same scheme as controls; separate entry point
/// because the regions come from a different catalog category.
pub fn extract_digit(image: &RgbaImage, hash_size: usize) -> ImageHash {
    phash_d(&normalize(image), hash_size)
}
