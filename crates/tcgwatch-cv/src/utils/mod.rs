//! Image normalization and resampling helpers.

pub mod image;

pub use image::{crop_region, normalize, resize_area, resize_bilinear, GrayImageF32};
